//! Local-to-legacy forwarding handler.

use crate::completion::{CompletionHandle, VariadicResolver};
use crate::error::{CompletionError, ForwardingError};
use crate::hub::{Arg, LegacyHub, Outcome, TopicHandler};
use crate::observability::{events, fields};
use crate::routing::RouteDescriptor;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "publish_adapter";

/// Registered on the local hub under `source`; republishes on the legacy hub
/// under the descriptor's remote topic.
pub(crate) struct PublishAdapter {
    source: String,
    descriptor: RouteDescriptor,
    hub: Arc<dyn LegacyHub>,
}

impl PublishAdapter {
    pub(crate) fn new(source: &str, descriptor: RouteDescriptor, hub: Arc<dyn LegacyHub>) -> Self {
        Self {
            source: source.to_string(),
            descriptor,
            hub,
        }
    }
}

#[async_trait]
impl TopicHandler for PublishAdapter {
    async fn on_publish(&self, args: Vec<Arg>) -> Result<Outcome, ForwardingError> {
        let remote_topic = self.descriptor.remote_topic.as_str();
        let mut outgoing = args;

        let completion = if self.descriptor.defer_completion {
            let (resolver, promise) = VariadicResolver::pair();
            let resolver = Arc::new(resolver);
            outgoing.push(Arg::Completion(resolver.clone()));
            Some((resolver, promise))
        } else {
            None
        };

        debug!(
            event = events::PUBLISH_FORWARD,
            component = COMPONENT,
            source = %self.source,
            remote_topic,
            args = %fields::format_args(&outgoing),
            defer_completion = self.descriptor.defer_completion,
            "forwarding local publication to legacy hub"
        );

        if let Err(err) = self.hub.publish(remote_topic, outgoing).await {
            warn!(
                event = events::PUBLISH_FORWARD_FAILED,
                component = COMPONENT,
                source = %self.source,
                remote_topic,
                err = %err,
                "legacy hub refused publication"
            );
            if let Some((resolver, _)) = &completion {
                resolver.reject(CompletionError::from(err.clone()));
            }
            return Err(err);
        }

        Ok(match completion {
            Some((_, promise)) => Outcome::pending(promise),
            None => Outcome::Empty,
        })
    }
}
