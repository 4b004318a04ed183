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

//! Contracts of the two hubs the proxy bridges.
//!
//! Both hubs are owned outside of this crate. The proxy only ever calls the
//! methods declared here and hands out [`TopicHandler`]s for them to invoke.

use crate::completion::{CompletionHandle, Promise, Reactions, Thenable};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::ForwardingError;

/// One positional argument of a published message.
#[derive(Clone)]
pub enum Arg {
    Value(Value),
    Completion(Arc<dyn CompletionHandle>),
}

impl Arg {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(value) => Some(value),
            Arg::Completion(_) => None,
        }
    }

    pub fn as_completion(&self) -> Option<&Arc<dyn CompletionHandle>> {
        match self {
            Arg::Value(_) => None,
            Arg::Completion(handle) => Some(handle),
        }
    }

    pub fn is_future_like(&self) -> bool {
        self.as_completion().is_some()
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<Arc<dyn CompletionHandle>> for Arg {
    fn from(handle: Arc<dyn CompletionHandle>) -> Self {
        Arg::Completion(handle)
    }
}

impl Debug for Arg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Value(value) => write!(f, "{value}"),
            Arg::Completion(_) => write!(f, "<completion>"),
        }
    }
}

/// Result of publishing a message or of one handler invocation.
#[derive(Clone, Default)]
pub enum Outcome {
    #[default]
    Empty,
    Ready(Value),
    Pending(Arc<dyn Thenable>),
}

impl Outcome {
    pub fn pending(thenable: impl Thenable + 'static) -> Self {
        Outcome::Pending(Arc::new(thenable))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    /// Attaches reactions. `Empty` fulfils with `null`, `Ready` with its value,
    /// both before this call returns.
    pub fn then(&self, reactions: Reactions) {
        match self {
            Outcome::Empty => reactions.fulfill(Value::Null),
            Outcome::Ready(value) => reactions.fulfill(value.clone()),
            Outcome::Pending(thenable) => thenable.then(reactions),
        }
    }

    pub fn into_promise(self) -> Promise {
        match self {
            Outcome::Empty => Promise::resolved(Value::Null),
            Outcome::Ready(value) => Promise::resolved(value),
            Outcome::Pending(thenable) => {
                let deferred = crate::completion::Deferred::new();
                let on_fulfilled = deferred.clone();
                let on_rejected = deferred.clone();
                let on_progress = deferred.clone();
                thenable.then(
                    Reactions::new(
                        move |value| {
                            on_fulfilled.resolve(value);
                        },
                        move |reason| {
                            on_rejected.reject(reason);
                        },
                    )
                    .with_progress(move |progress| {
                        on_progress.notify(progress);
                    }),
                );
                deferred.promise()
            }
        }
    }
}

impl Debug for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Empty => write!(f, "Empty"),
            Outcome::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Outcome::Pending(_) => write!(f, "Pending"),
        }
    }
}

/// Callback registered on a hub for one topic.
#[async_trait]
pub trait TopicHandler: Send + Sync {
    async fn on_publish(&self, args: Vec<Arg>) -> Result<Outcome, ForwardingError>;
}

/// The hub the proxy's owning component lives on.
#[async_trait]
pub trait LocalHub: Send + Sync {
    async fn subscribe(
        &self,
        topic: &str,
        context: &str,
        handler: Arc<dyn TopicHandler>,
    ) -> Result<(), ForwardingError>;

    async fn unsubscribe(
        &self,
        topic: &str,
        context: &str,
        handler: Arc<dyn TopicHandler>,
    ) -> Result<(), ForwardingError>;

    async fn publish(&self, topic: &str, args: Vec<Arg>) -> Result<Outcome, ForwardingError>;
}

/// An older hub generation.
///
/// Handlers registered here receive the subscribed topic name as their first
/// argument. With `memory` set, a hub replays its last publication on the topic
/// to the new handler during `subscribe`.
#[async_trait]
pub trait LegacyHub: Send + Sync {
    async fn publish(&self, topic: &str, args: Vec<Arg>) -> Result<(), ForwardingError>;

    async fn subscribe(
        &self,
        topic: &str,
        context: &str,
        memory: bool,
        handler: Arc<dyn TopicHandler>,
    ) -> Result<(), ForwardingError>;

    async fn unsubscribe(
        &self,
        topic: &str,
        context: &str,
        handler: Arc<dyn TopicHandler>,
    ) -> Result<(), ForwardingError>;
}

/// Pointer identity of a registered handler, for hubs that key on it.
#[derive(Clone)]
pub struct HandlerIdentity {
    handler: Arc<dyn TopicHandler>,
}

impl HandlerIdentity {
    pub fn new(handler: Arc<dyn TopicHandler>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> Arc<dyn TopicHandler> {
        self.handler.clone()
    }

    fn address(&self) -> *const () {
        Arc::as_ptr(&self.handler) as *const ()
    }
}

impl Hash for HandlerIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl PartialEq for HandlerIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for HandlerIdentity {}

impl Debug for HandlerIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerIdentity")
            .field("address", &self.address())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Arg, HandlerIdentity, Outcome, TopicHandler};
    use crate::completion::{CompletionHandle, Deferred, VariadicResolver};
    use crate::error::ForwardingError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct NoopHandler;

    #[async_trait]
    impl TopicHandler for NoopHandler {
        async fn on_publish(&self, _args: Vec<Arg>) -> Result<Outcome, ForwardingError> {
            Ok(Outcome::Empty)
        }
    }

    #[test]
    fn handler_identity_compares_by_pointer() {
        let shared: Arc<dyn TopicHandler> = Arc::new(NoopHandler);
        let other: Arc<dyn TopicHandler> = Arc::new(NoopHandler);

        assert_eq!(
            HandlerIdentity::new(shared.clone()),
            HandlerIdentity::new(shared)
        );
        assert_ne!(
            HandlerIdentity::new(other),
            HandlerIdentity::new(Arc::new(NoopHandler))
        );
    }

    #[test]
    fn any_completion_handle_is_future_like() {
        let (resolver, _promise) = VariadicResolver::pair();
        let handle: Arc<dyn CompletionHandle> = Arc::new(resolver);

        assert!(Arg::from(handle).is_future_like());
        assert!(!Arg::from(json!({ "then": true })).is_future_like());
    }

    #[tokio::test]
    async fn pending_outcome_becomes_promise() {
        let deferred = Deferred::new();
        let promise = Outcome::pending(deferred.promise()).into_promise();

        deferred.resolve(json!(7));

        assert_eq!(promise.await, Ok(json!(7)));
    }

    #[tokio::test]
    async fn immediate_outcomes_become_settled_promises() {
        assert_eq!(Outcome::Ready(json!("x")).into_promise().await, Ok(json!("x")));
        assert_eq!(Outcome::Empty.into_promise().await, Ok(json!(null)));
    }
}
