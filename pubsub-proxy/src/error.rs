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

//! Error taxonomy shared by the proxy and the hubs it bridges.

use serde_json::Value;
use thiserror::Error;

/// Invalid route configuration. Raised while activating, never per message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("configuration error: {message}")]
pub struct ConfigurationError {
    message: String,
}

impl ConfigurationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A hub refused a `publish`, `subscribe` or `unsubscribe` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("forwarding failed on topic '{topic}': {reason}")]
pub struct ForwardingError {
    pub topic: String,
    pub reason: String,
}

impl ForwardingError {
    pub fn new(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            reason: reason.into(),
        }
    }
}

/// Rejection reason carried by a completion handle or promise.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("completion rejected: {reason}")]
pub struct CompletionError {
    pub reason: Value,
}

impl CompletionError {
    pub fn new(reason: impl Into<Value>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<ForwardingError> for CompletionError {
    fn from(err: ForwardingError) -> Self {
        Self::new(err.to_string())
    }
}

/// Failures surfaced by [`crate::HubProxy`] lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Forwarding(#[from] ForwardingError),
    #[error("proxy '{0}' is already active")]
    AlreadyActive(String),
}

#[cfg(test)]
mod tests {
    use super::{CompletionError, ConfigurationError, ForwardingError, ProxyError};
    use serde_json::json;

    #[test]
    fn forwarding_error_converts_into_completion_rejection() {
        let err = ForwardingError::new("b", "hub offline");
        let rejection = CompletionError::from(err);

        assert_eq!(
            rejection.reason,
            json!("forwarding failed on topic 'b': hub offline")
        );
    }

    #[test]
    fn proxy_error_is_transparent_over_configuration_error() {
        let err: ProxyError = ConfigurationError::new("'hub' is missing from routes").into();

        assert_eq!(
            err.to_string(),
            "configuration error: 'hub' is missing from routes"
        );
    }
}
