//! Validation pass run before any hub is touched.

use crate::error::ConfigurationError;
use crate::hub::LegacyHub;
use crate::route_set::RouteSet;
use crate::routing::route_descriptor::{resolve_route_entry, RouteDirection};
use crate::routing::RouteDescriptor;
use std::sync::Arc;

/// A fully resolved route waiting to be registered.
pub(crate) struct PlannedRoute {
    pub(crate) route_set: usize,
    pub(crate) direction: RouteDirection,
    pub(crate) source: String,
    pub(crate) descriptor: RouteDescriptor,
    pub(crate) hub: Arc<dyn LegacyHub>,
}

/// Resolves every entry of every route set, in configured order: for each set
/// its publish entries, then its subscribe entries.
pub(crate) fn plan_routes(route_sets: &[RouteSet]) -> Result<Vec<PlannedRoute>, ConfigurationError> {
    let mut planned = Vec::new();

    for (index, route_set) in route_sets.iter().enumerate() {
        let Some(hub) = route_set.hub() else {
            return Err(ConfigurationError::new(format!(
                "'hub' is missing from route set #{index}"
            )));
        };

        let directions = [
            (RouteDirection::Publish, route_set.publish_entries()),
            (RouteDirection::Subscribe, route_set.subscribe_entries()),
        ];
        for (direction, entries) in directions {
            for (source, entry) in entries {
                planned.push(PlannedRoute {
                    route_set: index,
                    direction,
                    source: source.clone(),
                    descriptor: resolve_route_entry(source, entry, direction)?,
                    hub: hub.clone(),
                });
            }
        }
    }

    Ok(planned)
}
