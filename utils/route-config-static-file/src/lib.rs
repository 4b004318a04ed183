/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Route sets for a `pubsub-proxy` `HubProxy`, read from a static JSON file.
//!
//! The file holds an array of route sets. Legacy hubs are referenced by name
//! and bound to live hubs through a [`HubDirectory`]:
//!
//! ```json
//! [
//!   {
//!     "hub": "storefront",
//!     "publish": { "cart/add": "basket/add", "cart/total": { "topic": "basket/total", "defer": true } },
//!     "subscribe": { "user/login": { "topic": "session/user", "memory": true } }
//!   }
//! ]
//! ```

use pubsub_proxy::{ConfigurationError, LegacyHub, RouteEntry, RouteSet};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{self, canonicalize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Live legacy hubs by configured name.
pub type HubDirectory = HashMap<String, Arc<dyn LegacyHub>>;

/// Unknown keys are ignored; absent or `null` maps count as empty.
#[derive(Debug, Deserialize)]
struct RouteSetSpec {
    #[serde(default)]
    hub: Option<String>,
    #[serde(default)]
    publish: Option<Map<String, Value>>,
    #[serde(default)]
    subscribe: Option<Map<String, Value>>,
}

pub struct RouteConfigStaticFile {
    static_file: String,
}

impl RouteConfigStaticFile {
    pub fn new(static_file: String) -> Self {
        Self { static_file }
    }

    fn canonicalized_static_file_path(&self) -> Result<PathBuf, ConfigurationError> {
        let route_json_file = PathBuf::from(self.static_file.clone());
        debug!("route_json_file: {route_json_file:?}");

        canonicalize(route_json_file).map_err(|error| {
            ConfigurationError::new(format!("Static route file not found: {error:?}"))
        })
    }

    fn read_static_config_json(&self) -> Result<Value, ConfigurationError> {
        let route_json_file = self.canonicalized_static_file_path()?;
        let data = fs::read_to_string(route_json_file)
            .map_err(|error| ConfigurationError::new(format!("Unable to read file: {error:?}")))?;

        serde_json::from_str(&data)
            .map_err(|error| ConfigurationError::new(format!("Unable to parse JSON: {error:?}")))
    }

    /// Reads the file and binds every named hub through `hubs`.
    pub fn load(&self, hubs: &HubDirectory) -> Result<Vec<RouteSet>, ConfigurationError> {
        let value = self.read_static_config_json()?;
        parse_route_sets(value, hubs)
    }
}

/// Builds route sets from an already parsed JSON document.
///
/// A route set without `"hub"` is kept as is; activating a proxy with it fails.
/// Naming a hub that `hubs` does not know fails here.
pub fn parse_route_sets(
    value: Value,
    hubs: &HubDirectory,
) -> Result<Vec<RouteSet>, ConfigurationError> {
    let Value::Array(entries) = value else {
        return Err(ConfigurationError::new(
            "Static route file must be a JSON array of route set objects",
        ));
    };

    let mut route_sets = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let spec: RouteSetSpec = serde_json::from_value(entry).map_err(|error| {
            ConfigurationError::new(format!("Invalid route set #{index}: {error}"))
        })?;
        route_sets.push(build_route_set(index, spec, hubs)?);
    }

    debug!("Finished reading {} route sets", route_sets.len());
    Ok(route_sets)
}

fn build_route_set(
    index: usize,
    spec: RouteSetSpec,
    hubs: &HubDirectory,
) -> Result<RouteSet, ConfigurationError> {
    let mut route_set = match spec.hub.as_deref() {
        Some(name) => {
            let Some(hub) = hubs.get(name) else {
                return Err(ConfigurationError::new(format!(
                    "Route set #{index} names unknown hub '{name}'"
                )));
            };
            RouteSet::new(hub.clone())
        }
        None => {
            warn!("Route set #{index} has no 'hub'");
            RouteSet::without_hub()
        }
    };

    for (source, target) in spec.publish.unwrap_or_default() {
        route_set = route_set.publish(&source, route_entry(index, &source, target)?);
    }
    for (source, target) in spec.subscribe.unwrap_or_default() {
        route_set = route_set.subscribe(&source, route_entry(index, &source, target)?);
    }

    Ok(route_set)
}

fn route_entry(index: usize, source: &str, target: Value) -> Result<RouteEntry, ConfigurationError> {
    serde_json::from_value(target).map_err(|_| {
        ConfigurationError::new(format!(
            "Route set #{index}: target '{source}' must be a topic string or an object"
        ))
    })
}
