//! Normalisation of raw route entries into [`RouteDescriptor`]s.

use crate::error::ConfigurationError;
use crate::observability::events;
use crate::route_set::{DetailedTopic, RouteEntry};
use serde_json::Value;
use tracing::trace;

const COMPONENT: &str = "route_descriptor";

/// Canonical form of one route entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub remote_topic: String,
    /// Publish direction only.
    pub defer_completion: bool,
    /// Subscribe direction only.
    pub memory: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteDirection {
    Publish,
    Subscribe,
}

impl RouteDirection {
    fn label(self) -> &'static str {
        match self {
            RouteDirection::Publish => "publish",
            RouteDirection::Subscribe => "subscribe",
        }
    }
}

impl RouteDescriptor {
    pub fn for_publish(source: &str, entry: &RouteEntry) -> Result<Self, ConfigurationError> {
        resolve_route_entry(source, entry, RouteDirection::Publish)
    }

    pub fn for_subscribe(source: &str, entry: &RouteEntry) -> Result<Self, ConfigurationError> {
        resolve_route_entry(source, entry, RouteDirection::Subscribe)
    }
}

pub(crate) fn resolve_route_entry(
    source: &str,
    entry: &RouteEntry,
    direction: RouteDirection,
) -> Result<RouteDescriptor, ConfigurationError> {
    let (remote_topic, flag) = match entry {
        RouteEntry::Topic(topic) => (topic.as_str(), false),
        RouteEntry::Detailed(detailed) => {
            let Some(topic) = detailed.topic.as_deref() else {
                return Err(ConfigurationError::new(format!(
                    "'topic' is missing from target '{source}'"
                )));
            };
            (topic, option_flag(detailed, direction))
        }
    };

    if remote_topic.is_empty() {
        return Err(ConfigurationError::new(format!(
            "'topic' is empty for target '{source}'"
        )));
    }

    let descriptor = RouteDescriptor {
        remote_topic: remote_topic.to_string(),
        defer_completion: direction == RouteDirection::Publish && flag,
        memory: direction == RouteDirection::Subscribe && flag,
    };

    trace!(
        event = events::ROUTE_RESOLVED,
        component = COMPONENT,
        direction = direction.label(),
        source,
        remote_topic = %descriptor.remote_topic,
        defer_completion = descriptor.defer_completion,
        memory = descriptor.memory,
        "resolved route entry"
    );

    Ok(descriptor)
}

fn option_flag(detailed: &DetailedTopic, direction: RouteDirection) -> bool {
    let option = match direction {
        RouteDirection::Publish => detailed.defer.as_ref(),
        RouteDirection::Subscribe => detailed.memory.as_ref(),
    };
    option.is_some_and(is_truthy)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
