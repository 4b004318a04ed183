//! Live adapter registrations and their exact reversal.

use crate::control_plane::route_plan::PlannedRoute;
use crate::data_plane::publish_adapter::PublishAdapter;
use crate::data_plane::subscribe_adapter::SubscribeAdapter;
use crate::error::ForwardingError;
use crate::hub::{LegacyHub, LocalHub, TopicHandler};
use crate::observability::{events, fields};
use crate::routing::route_descriptor::RouteDirection;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "registration";

enum HubBinding {
    Local(Arc<dyn LocalHub>),
    Legacy {
        hub: Arc<dyn LegacyHub>,
        memory: bool,
    },
}

/// One adapter plus the hub it is registered on.
///
/// Holds the very handler `Arc` given at registration so that unregistering
/// passes the identical (topic, context, handler) triple.
pub(crate) struct Registration {
    route_set: usize,
    topic: String,
    binding: HubBinding,
    handler: Arc<dyn TopicHandler>,
}

impl Registration {
    pub(crate) fn build(route: PlannedRoute, local: &Arc<dyn LocalHub>) -> Self {
        let PlannedRoute {
            route_set,
            direction,
            source,
            descriptor,
            hub,
        } = route;

        let (binding, handler) = match direction {
            RouteDirection::Publish => {
                let handler: Arc<dyn TopicHandler> =
                    Arc::new(PublishAdapter::new(&source, descriptor, hub));
                (HubBinding::Local(local.clone()), handler)
            }
            RouteDirection::Subscribe => {
                let memory = descriptor.memory;
                let handler: Arc<dyn TopicHandler> =
                    Arc::new(SubscribeAdapter::new(&source, descriptor, local.clone()));
                (HubBinding::Legacy { hub, memory }, handler)
            }
        };

        Self {
            route_set,
            topic: source,
            binding,
            handler,
        }
    }

    fn is_legacy(&self) -> bool {
        matches!(self.binding, HubBinding::Legacy { .. })
    }

    async fn register(&self, context: &str) -> Result<(), ForwardingError> {
        match &self.binding {
            HubBinding::Local(local) => {
                local
                    .subscribe(&self.topic, context, self.handler.clone())
                    .await
            }
            HubBinding::Legacy { hub, memory } => {
                hub.subscribe(&self.topic, context, *memory, self.handler.clone())
                    .await
            }
        }
    }

    async fn unregister(&self, context: &str) -> Result<(), ForwardingError> {
        match &self.binding {
            HubBinding::Local(local) => {
                local
                    .unsubscribe(&self.topic, context, self.handler.clone())
                    .await
            }
            HubBinding::Legacy { hub, .. } => {
                hub.unsubscribe(&self.topic, context, self.handler.clone())
                    .await
            }
        }
    }
}

/// Registers every planned route in order. On the first failure all routes
/// registered by this call are unregistered again before the error is returned.
pub(crate) async fn register_routes(
    planned: Vec<PlannedRoute>,
    local: &Arc<dyn LocalHub>,
    context: &str,
) -> Result<Vec<Registration>, ForwardingError> {
    let mut registered: Vec<Registration> = Vec::with_capacity(planned.len());

    for route in planned {
        let registration = Registration::build(route, local);

        if let Err(err) = registration.register(context).await {
            warn!(
                event = events::REGISTRATION_FAILED,
                component = COMPONENT,
                context,
                route_set = registration.route_set,
                topic = %registration.topic,
                hub = fields::format_hub_side(registration.is_legacy()),
                err = %err,
                "unable to register adapter, rolling back"
            );
            rollback(&registered, context).await;
            return Err(err);
        }

        debug!(
            event = events::REGISTRATION_ADDED,
            component = COMPONENT,
            context,
            route_set = registration.route_set,
            topic = %registration.topic,
            hub = fields::format_hub_side(registration.is_legacy()),
            "registered adapter"
        );
        registered.push(registration);
    }

    Ok(registered)
}

async fn rollback(registered: &[Registration], context: &str) {
    for registration in registered {
        match registration.unregister(context).await {
            Ok(()) => debug!(
                event = events::REGISTRATION_ROLLBACK,
                component = COMPONENT,
                context,
                route_set = registration.route_set,
                topic = %registration.topic,
                "rolled back adapter registration"
            ),
            Err(err) => warn!(
                event = events::UNREGISTRATION_FAILED,
                component = COMPONENT,
                context,
                route_set = registration.route_set,
                topic = %registration.topic,
                err = %err,
                "unable to roll back adapter registration"
            ),
        }
    }
}

/// Unregisters every registration once, in registration order.
///
/// A failing hub does not stop the pass; the first failure is returned after
/// all registrations were processed.
pub(crate) async fn unregister_routes(
    registrations: Vec<Registration>,
    context: &str,
) -> Result<(), ForwardingError> {
    let mut first_failure = None;

    for registration in registrations {
        match registration.unregister(context).await {
            Ok(()) => debug!(
                event = events::REGISTRATION_REMOVED,
                component = COMPONENT,
                context,
                route_set = registration.route_set,
                topic = %registration.topic,
                hub = fields::format_hub_side(registration.is_legacy()),
                "unregistered adapter"
            ),
            Err(err) => {
                warn!(
                    event = events::UNREGISTRATION_FAILED,
                    component = COMPONENT,
                    context,
                    route_set = registration.route_set,
                    topic = %registration.topic,
                    err = %err,
                    "unable to unregister adapter"
                );
                first_failure.get_or_insert(err);
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{register_routes, unregister_routes};
    use crate::control_plane::route_plan::plan_routes;
    use crate::error::ForwardingError;
    use crate::hub::{Arg, HandlerIdentity, LegacyHub, LocalHub, Outcome, TopicHandler};
    use crate::route_set::RouteSet;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    /// Records live registrations and can be told to refuse one topic.
    #[derive(Default)]
    struct RecordingHub {
        live: Mutex<HashSet<(String, HandlerIdentity)>>,
        calls: Mutex<Vec<String>>,
        refuse_topic: Option<String>,
    }

    impl RecordingHub {
        fn refusing(topic: &str) -> Self {
            Self {
                refuse_topic: Some(topic.to_string()),
                ..Default::default()
            }
        }

        fn add(&self, topic: &str, handler: Arc<dyn TopicHandler>) -> Result<(), ForwardingError> {
            self.calls
                .lock()
                .expect("lock calls")
                .push(format!("+{topic}"));
            if self.refuse_topic.as_deref() == Some(topic) {
                return Err(ForwardingError::new(topic, "refused"));
            }
            self.live
                .lock()
                .expect("lock live")
                .insert((topic.to_string(), HandlerIdentity::new(handler)));
            Ok(())
        }

        fn remove(&self, topic: &str, handler: Arc<dyn TopicHandler>) -> Result<(), ForwardingError> {
            self.calls
                .lock()
                .expect("lock calls")
                .push(format!("-{topic}"));
            let removed = self
                .live
                .lock()
                .expect("lock live")
                .remove(&(topic.to_string(), HandlerIdentity::new(handler)));
            if removed {
                Ok(())
            } else {
                Err(ForwardingError::new(topic, "not registered"))
            }
        }

        fn live_count(&self) -> usize {
            self.live.lock().expect("lock live").len()
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock calls").clone()
        }
    }

    #[async_trait]
    impl LocalHub for RecordingHub {
        async fn subscribe(
            &self,
            topic: &str,
            _context: &str,
            handler: Arc<dyn TopicHandler>,
        ) -> Result<(), ForwardingError> {
            self.add(topic, handler)
        }

        async fn unsubscribe(
            &self,
            topic: &str,
            _context: &str,
            handler: Arc<dyn TopicHandler>,
        ) -> Result<(), ForwardingError> {
            self.remove(topic, handler)
        }

        async fn publish(&self, _topic: &str, _args: Vec<Arg>) -> Result<Outcome, ForwardingError> {
            Ok(Outcome::Empty)
        }
    }

    #[async_trait]
    impl LegacyHub for RecordingHub {
        async fn publish(&self, _topic: &str, _args: Vec<Arg>) -> Result<(), ForwardingError> {
            Ok(())
        }

        async fn subscribe(
            &self,
            topic: &str,
            _context: &str,
            _memory: bool,
            handler: Arc<dyn TopicHandler>,
        ) -> Result<(), ForwardingError> {
            self.add(topic, handler)
        }

        async fn unsubscribe(
            &self,
            topic: &str,
            _context: &str,
            handler: Arc<dyn TopicHandler>,
        ) -> Result<(), ForwardingError> {
            self.remove(topic, handler)
        }
    }

    #[tokio::test]
    async fn registered_routes_are_unregistered_with_the_same_handlers() {
        let local_hub = Arc::new(RecordingHub::default());
        let legacy_hub = Arc::new(RecordingHub::default());
        let local: Arc<dyn LocalHub> = local_hub.clone();
        let route_sets = vec![RouteSet::new(legacy_hub.clone())
            .publish("a", "b")
            .subscribe("x", "y")];

        let planned = plan_routes(&route_sets).expect("valid configuration");
        let registrations = register_routes(planned, &local, "proxy")
            .await
            .expect("registered");
        assert_eq!(local_hub.live_count(), 1);
        assert_eq!(legacy_hub.live_count(), 1);

        unregister_routes(registrations, "proxy")
            .await
            .expect("unregistered");
        assert_eq!(local_hub.live_count(), 0);
        assert_eq!(legacy_hub.live_count(), 0);
    }

    #[tokio::test]
    async fn failed_registration_rolls_back_earlier_ones() {
        let local_hub = Arc::new(RecordingHub::default());
        let legacy_hub = Arc::new(RecordingHub::refusing("x2"));
        let local: Arc<dyn LocalHub> = local_hub.clone();
        let route_sets = vec![RouteSet::new(legacy_hub.clone())
            .publish("a", "b")
            .subscribe("x1", "y1")
            .subscribe("x2", "y2")
            .subscribe("x3", "y3")];

        let planned = plan_routes(&route_sets).expect("valid configuration");
        let err = register_routes(planned, &local, "proxy")
            .await
            .err()
            .expect("x2 is refused");

        assert_eq!(err, ForwardingError::new("x2", "refused"));
        assert_eq!(local_hub.live_count(), 0);
        assert_eq!(legacy_hub.live_count(), 0);
        assert_eq!(legacy_hub.calls(), vec!["+x1", "+x2", "-x1"]);
        assert_eq!(local_hub.calls(), vec!["+a", "-a"]);
    }
}
