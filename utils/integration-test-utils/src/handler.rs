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
use pubsub_proxy::completion::{CompletionHandle, Deferred, Reactions, Thenable};
use pubsub_proxy::{Arg, CompletionError, ForwardingError, Outcome, TopicHandler};
use serde_json::Value;
use std::sync::Arc;

/// Handler that records the plain values of every call and answers with a
/// fixed outcome.
pub struct RecordingHandler {
    calls: Mutex<Vec<Vec<Value>>>,
    reply: Outcome,
}

impl RecordingHandler {
    pub fn replying(reply: Outcome) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply,
        })
    }

    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TopicHandler for RecordingHandler {
    async fn on_publish(&self, args: Vec<Arg>) -> Result<Outcome, ForwardingError> {
        self.calls
            .lock()
            .push(args.iter().filter_map(Arg::as_value).cloned().collect());
        Ok(self.reply.clone())
    }
}

/// Legacy-style completion handle that remembers how it was settled.
///
/// Resolutions are also observable through [`Thenable`], as a sequence.
#[derive(Default)]
pub struct RecordingCompletion {
    deferred: Deferred,
    resolved: Mutex<Option<Vec<Value>>>,
    rejected: Mutex<Option<CompletionError>>,
    progress: Mutex<Vec<Value>>,
}

impl RecordingCompletion {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn resolved(&self) -> Option<Vec<Value>> {
        self.resolved.lock().clone()
    }

    pub fn rejected(&self) -> Option<CompletionError> {
        self.rejected.lock().clone()
    }

    pub fn progress(&self) -> Vec<Value> {
        self.progress.lock().clone()
    }
}

impl Thenable for RecordingCompletion {
    fn then(&self, reactions: Reactions) {
        self.deferred.promise().then(reactions)
    }
}

impl CompletionHandle for RecordingCompletion {
    fn resolve(&self, values: Vec<Value>) {
        self.resolved.lock().get_or_insert_with(|| values.clone());
        self.deferred.resolve(Value::Array(values));
    }

    fn reject(&self, reason: CompletionError) {
        self.rejected.lock().get_or_insert_with(|| reason.clone());
        self.deferred.reject(reason);
    }

    fn notify(&self, progress: Value) {
        self.progress.lock().push(progress.clone());
        self.deferred.notify(progress);
    }
}
