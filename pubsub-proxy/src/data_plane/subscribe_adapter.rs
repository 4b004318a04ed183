//! Legacy-to-local forwarding handler.

use crate::completion::{spread, CompletionHandle, Reactions};
use crate::error::{CompletionError, ForwardingError};
use crate::hub::{Arg, LocalHub, Outcome, TopicHandler};
use crate::observability::{events, fields};
use crate::routing::RouteDescriptor;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "subscribe_adapter";

/// Registered on a legacy hub under `source`; republishes on the local hub
/// under the descriptor's remote topic.
///
/// With `memory` routes the legacy hub may call this handler from inside
/// `subscribe`, before the owning proxy has finished activating. Nothing here
/// depends on activation state, so such early deliveries forward normally.
pub(crate) struct SubscribeAdapter {
    source: String,
    descriptor: RouteDescriptor,
    local: Arc<dyn LocalHub>,
}

impl SubscribeAdapter {
    pub(crate) fn new(source: &str, descriptor: RouteDescriptor, local: Arc<dyn LocalHub>) -> Self {
        Self {
            source: source.to_string(),
            descriptor,
            local,
        }
    }

    fn chain(outcome: &Outcome, pending: Arc<dyn CompletionHandle>) {
        let on_fulfilled = pending.clone();
        let on_rejected = pending.clone();
        let on_progress = pending;
        outcome.then(
            Reactions::new(
                move |value| on_fulfilled.resolve(spread(value)),
                move |reason| on_rejected.reject(reason),
            )
            .with_progress(move |progress| on_progress.notify(progress)),
        );
    }
}

#[async_trait]
impl TopicHandler for SubscribeAdapter {
    async fn on_publish(&self, legacy_args: Vec<Arg>) -> Result<Outcome, ForwardingError> {
        let remote_topic = self.descriptor.remote_topic.as_str();

        // The legacy hub passes the subscribed topic first.
        let mut payload: Vec<Arg> = legacy_args.into_iter().skip(1).collect();
        let pending = if payload.last().is_some_and(Arg::is_future_like) {
            payload.pop().and_then(|arg| arg.as_completion().cloned())
        } else {
            None
        };

        debug!(
            event = events::SUBSCRIBE_FORWARD,
            component = COMPONENT,
            source = %self.source,
            remote_topic,
            args = %fields::format_args(&payload),
            has_completion = pending.is_some(),
            memory = self.descriptor.memory,
            "forwarding legacy publication to local hub"
        );

        let outcome = match self.local.publish(remote_topic, payload).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    event = events::SUBSCRIBE_FORWARD_FAILED,
                    component = COMPONENT,
                    source = %self.source,
                    remote_topic,
                    err = %err,
                    "local hub refused publication"
                );
                if let Some(pending) = pending {
                    pending.reject(CompletionError::from(err.clone()));
                }
                return Err(err);
            }
        };

        if let Some(pending) = pending {
            debug!(
                event = events::SUBSCRIBE_COMPLETION_CHAINED,
                component = COMPONENT,
                source = %self.source,
                remote_topic,
                outcome = ?outcome,
                "chaining legacy completion to local result"
            );
            Self::chain(&outcome, pending);
        }

        Ok(outcome)
    }
}
