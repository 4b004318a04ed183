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

use async_trait::async_trait;
use parking_lot::Mutex;
use pubsub_proxy::completion::CompletionHandle;
use pubsub_proxy::{Arg, ForwardingError, HandlerIdentity, LegacyHub, LocalHub, Outcome, TopicHandler};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// One recorded `publish` call.
#[derive(Clone, Debug)]
pub struct Publication {
    pub topic: String,
    pub args: Vec<Arg>,
}

impl Publication {
    /// Plain values, completion handles skipped.
    pub fn values(&self) -> Vec<Value> {
        self.args.iter().filter_map(Arg::as_value).cloned().collect()
    }

    /// Trailing completion handle, if any.
    pub fn completion(&self) -> Option<Arc<dyn CompletionHandle>> {
        self.args.last().and_then(Arg::as_completion).cloned()
    }
}

#[derive(Clone)]
struct Subscriber {
    topic: String,
    context: String,
    handler: HandlerIdentity,
}

#[derive(Default)]
struct Subscribers {
    entries: Mutex<Vec<Subscriber>>,
    refused_unsubscribe: Mutex<HashSet<String>>,
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: AtomicUsize,
}

impl Subscribers {
    fn add(&self, topic: &str, context: &str, handler: Arc<dyn TopicHandler>) {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().push(Subscriber {
            topic: topic.to_string(),
            context: context.to_string(),
            handler: HandlerIdentity::new(handler),
        });
    }

    fn remove(
        &self,
        topic: &str,
        context: &str,
        handler: Arc<dyn TopicHandler>,
    ) -> Result<(), ForwardingError> {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        if self.refused_unsubscribe.lock().contains(topic) {
            return Err(ForwardingError::new(topic, "hub refused unsubscribe"));
        }
        let identity = HandlerIdentity::new(handler);
        let mut entries = self.entries.lock();
        let position = entries.iter().position(|subscriber| {
            subscriber.topic == topic
                && subscriber.context == context
                && subscriber.handler == identity
        });
        match position {
            Some(index) => {
                entries.remove(index);
                Ok(())
            }
            None => Err(ForwardingError::new(topic, "no matching subscription")),
        }
    }

    /// Handlers are copied out so delivery runs without holding the lock.
    fn handlers_for(&self, topic: &str) -> Vec<Arc<dyn TopicHandler>> {
        self.entries
            .lock()
            .iter()
            .filter(|subscriber| subscriber.topic == topic)
            .map(|subscriber| subscriber.handler.handler())
            .collect()
    }

    fn refuse_unsubscribe(&self, topic: &str) {
        self.refused_unsubscribe.lock().insert(topic.to_string());
    }

    fn count(&self, topic: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|subscriber| subscriber.topic == topic)
            .count()
    }

    fn total(&self) -> usize {
        self.entries.lock().len()
    }
}

/// In-memory local hub.
///
/// Handlers run in registration order; `publish` returns the last non-empty
/// handler outcome.
#[derive(Default)]
pub struct MemoryLocalHub {
    subscribers: Subscribers,
    published: Mutex<Vec<Publication>>,
}

impl MemoryLocalHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every later `unsubscribe` on `topic` fail. The subscription stays.
    pub fn refuse_unsubscribe(&self, topic: &str) {
        self.subscribers.refuse_unsubscribe(topic);
    }

    pub fn published(&self) -> Vec<Publication> {
        self.published.lock().clone()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers.count(topic)
    }

    pub fn total_subscribers(&self) -> usize {
        self.subscribers.total()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribers.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.subscribers.unsubscribe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalHub for MemoryLocalHub {
    async fn subscribe(
        &self,
        topic: &str,
        context: &str,
        handler: Arc<dyn TopicHandler>,
    ) -> Result<(), ForwardingError> {
        self.subscribers.add(topic, context, handler);
        Ok(())
    }

    async fn unsubscribe(
        &self,
        topic: &str,
        context: &str,
        handler: Arc<dyn TopicHandler>,
    ) -> Result<(), ForwardingError> {
        self.subscribers.remove(topic, context, handler)
    }

    async fn publish(&self, topic: &str, args: Vec<Arg>) -> Result<Outcome, ForwardingError> {
        debug!(topic, args = ?args, "local hub publish");
        self.published.lock().push(Publication {
            topic: topic.to_string(),
            args: args.clone(),
        });

        let mut outcome = Outcome::Empty;
        for handler in self.subscribers.handlers_for(topic) {
            let handled = handler.on_publish(args.clone()).await?;
            if !handled.is_empty() {
                outcome = handled;
            }
        }
        Ok(outcome)
    }
}

/// In-memory legacy hub.
///
/// Handlers receive the topic as first argument. The last publication per
/// topic is remembered and replayed to `memory` subscribers. Publishing and
/// subscribing can be made to fail for error-path tests.
#[derive(Default)]
pub struct MemoryLegacyHub {
    subscribers: Subscribers,
    published: Mutex<Vec<Publication>>,
    memory: Mutex<HashMap<String, Vec<Arg>>>,
    refused_topics: Mutex<HashSet<String>>,
    refuse_publish: AtomicBool,
}

impl MemoryLegacyHub {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every later `subscribe` on `topic` fail.
    pub fn refuse_subscribe(&self, topic: &str) {
        self.refused_topics.lock().insert(topic.to_string());
    }

    /// Makes every later `publish` fail.
    pub fn refuse_publish(&self) {
        self.refuse_publish.store(true, Ordering::SeqCst);
    }

    /// Makes every later `unsubscribe` on `topic` fail. The subscription stays.
    pub fn refuse_unsubscribe(&self, topic: &str) {
        self.subscribers.refuse_unsubscribe(topic);
    }

    pub fn published(&self) -> Vec<Publication> {
        self.published.lock().clone()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers.count(topic)
    }

    pub fn total_subscribers(&self) -> usize {
        self.subscribers.total()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribers.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.subscribers.unsubscribe_calls.load(Ordering::SeqCst)
    }

    fn with_topic(topic: &str, args: Vec<Arg>) -> Vec<Arg> {
        let mut delivered = Vec::with_capacity(args.len() + 1);
        delivered.push(Arg::Value(Value::String(topic.to_string())));
        delivered.extend(args);
        delivered
    }
}

#[async_trait]
impl LegacyHub for MemoryLegacyHub {
    async fn publish(&self, topic: &str, args: Vec<Arg>) -> Result<(), ForwardingError> {
        debug!(topic, args = ?args, "legacy hub publish");
        self.published.lock().push(Publication {
            topic: topic.to_string(),
            args: args.clone(),
        });
        if self.refuse_publish.load(Ordering::SeqCst) {
            return Err(ForwardingError::new(topic, "legacy hub refused publish"));
        }
        self.memory.lock().insert(topic.to_string(), args.clone());

        for handler in self.subscribers.handlers_for(topic) {
            handler.on_publish(Self::with_topic(topic, args.clone())).await?;
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
        context: &str,
        memory: bool,
        handler: Arc<dyn TopicHandler>,
    ) -> Result<(), ForwardingError> {
        if self.refused_topics.lock().contains(topic) {
            return Err(ForwardingError::new(topic, "legacy hub refused subscribe"));
        }
        self.subscribers.add(topic, context, handler.clone());

        if !memory {
            return Ok(());
        }
        let remembered = self.memory.lock().get(topic).cloned();
        if let Some(args) = remembered {
            debug!(topic, "legacy hub replaying remembered publication");
            if let Err(err) = handler.on_publish(Self::with_topic(topic, args)).await {
                warn!(topic, err = %err, "replay to new subscriber failed");
            }
        }
        Ok(())
    }

    async fn unsubscribe(
        &self,
        topic: &str,
        context: &str,
        handler: Arc<dyn TopicHandler>,
    ) -> Result<(), ForwardingError> {
        self.subscribers.remove(topic, context, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryLegacyHub, MemoryLocalHub};
    use crate::handler::RecordingHandler;
    use pubsub_proxy::{Arg, LegacyHub, LocalHub, Outcome, TopicHandler};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn legacy_hub_prepends_topic_and_replays_memory() {
        let hub = MemoryLegacyHub::new();
        hub.publish("news", vec![Arg::from(json!(1))])
            .await
            .expect("published");

        let handler = RecordingHandler::replying(Outcome::Empty);
        hub.subscribe("news", "test", true, handler.clone())
            .await
            .expect("subscribed");

        assert_eq!(handler.calls(), vec![vec![json!("news"), json!(1)]]);
    }

    #[tokio::test]
    async fn unsubscribe_requires_the_registered_handler() {
        let hub = MemoryLocalHub::new();
        let registered = RecordingHandler::replying(Outcome::Empty);
        let stranger: Arc<dyn TopicHandler> = RecordingHandler::replying(Outcome::Empty);

        hub.subscribe("a", "test", registered.clone())
            .await
            .expect("subscribed");

        assert!(hub.unsubscribe("a", "test", stranger).await.is_err());
        assert!(hub.unsubscribe("a", "other", registered.clone()).await.is_err());
        assert!(hub.unsubscribe("a", "test", registered.clone()).await.is_ok());
        assert!(hub.unsubscribe("a", "test", registered).await.is_err());
    }
}
