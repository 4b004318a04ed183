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

//! Declarative route configuration.

use crate::hub::LegacyHub;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A raw route entry: either just the remote topic, or an object with options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteEntry {
    Topic(String),
    Detailed(DetailedTopic),
}

impl From<&str> for RouteEntry {
    fn from(topic: &str) -> Self {
        RouteEntry::Topic(topic.to_string())
    }
}

impl From<String> for RouteEntry {
    fn from(topic: String) -> Self {
        RouteEntry::Topic(topic)
    }
}

impl From<DetailedTopic> for RouteEntry {
    fn from(detailed: DetailedTopic) -> Self {
        RouteEntry::Detailed(detailed)
    }
}

/// Object form of a route entry. Option values are loosely typed and read by truthiness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailedTopic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Value>,
}

impl DetailedTopic {
    pub fn topic(topic: &str) -> Self {
        Self {
            topic: Some(topic.to_string()),
            ..Default::default()
        }
    }

    pub fn with_defer(mut self, defer: bool) -> Self {
        self.defer = Some(Value::Bool(defer));
        self
    }

    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = Some(Value::Bool(memory));
        self
    }
}

/// One pairing between the local hub and a legacy hub.
///
/// Built once and never mutated afterwards. Entries keep the order in which
/// they were added.
#[derive(Clone, Default)]
pub struct RouteSet {
    hub: Option<Arc<dyn LegacyHub>>,
    publish: Vec<(String, RouteEntry)>,
    subscribe: Vec<(String, RouteEntry)>,
}

impl RouteSet {
    pub fn new(hub: Arc<dyn LegacyHub>) -> Self {
        Self {
            hub: Some(hub),
            ..Default::default()
        }
    }

    /// A route set lacking its hub. Activating a proxy with it fails.
    pub fn without_hub() -> Self {
        Self::default()
    }

    /// Forwards local publications on `source` to the legacy hub.
    pub fn publish(mut self, source: &str, entry: impl Into<RouteEntry>) -> Self {
        self.publish.push((source.to_string(), entry.into()));
        self
    }

    /// Forwards legacy publications on `source` to the local hub.
    pub fn subscribe(mut self, source: &str, entry: impl Into<RouteEntry>) -> Self {
        self.subscribe.push((source.to_string(), entry.into()));
        self
    }

    pub fn hub(&self) -> Option<&Arc<dyn LegacyHub>> {
        self.hub.as_ref()
    }

    pub fn publish_entries(&self) -> &[(String, RouteEntry)] {
        &self.publish
    }

    pub fn subscribe_entries(&self) -> &[(String, RouteEntry)] {
        &self.subscribe
    }
}

impl Debug for RouteSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteSet")
            .field("hub", &self.hub.is_some())
            .field("publish", &self.publish)
            .field("subscribe", &self.subscribe)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{DetailedTopic, RouteEntry};
    use serde_json::json;

    #[test]
    fn string_and_object_entries_deserialize_into_their_variants() {
        let plain: RouteEntry = serde_json::from_value(json!("foo")).expect("plain entry");
        let detailed: RouteEntry =
            serde_json::from_value(json!({ "topic": "foo", "defer": 1 })).expect("object entry");
        let topicless: RouteEntry =
            serde_json::from_value(json!({ "memory": true })).expect("object entry");

        assert_eq!(plain, RouteEntry::Topic("foo".to_string()));
        assert_eq!(
            detailed,
            RouteEntry::Detailed(DetailedTopic {
                topic: Some("foo".to_string()),
                defer: Some(json!(1)),
                memory: None,
            })
        );
        assert!(matches!(
            topicless,
            RouteEntry::Detailed(DetailedTopic { topic: None, .. })
        ));
    }
}
