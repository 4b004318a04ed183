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

use crate::control_plane::registration::{register_routes, unregister_routes, Registration};
use crate::control_plane::route_plan::plan_routes;
use crate::error::ProxyError;
use crate::hub::LocalHub;
use crate::observability::events;
use crate::route_set::RouteSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const COMPONENT: &str = "hub_proxy";

/// Registrations of the current activation. `None` while inactive.
type ActiveRegistrations = Mutex<Option<Vec<Registration>>>;

/// Bridges the local hub with one or more legacy hubs.
///
/// Inactive after construction. [`HubProxy::activate`] registers one adapter per
/// configured route, [`HubProxy::deactivate`] unregisters exactly those again.
/// The proxy's name is the context handed to both hubs.
pub struct HubProxy {
    name: String,
    local: Arc<dyn LocalHub>,
    route_sets: Vec<RouteSet>,
    registrations: ActiveRegistrations,
}

impl HubProxy {
    pub fn new(name: &str, local: Arc<dyn LocalHub>, route_sets: Vec<RouteSet>) -> Self {
        debug!(
            event = events::PROXY_CREATED,
            component = COMPONENT,
            proxy = name,
            route_sets = route_sets.len(),
            "hub proxy created"
        );

        Self {
            name: name.to_string(),
            local,
            route_sets,
            registrations: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn route_sets(&self) -> &[RouteSet] {
        &self.route_sets
    }

    pub async fn is_active(&self) -> bool {
        self.registrations.lock().await.is_some()
    }

    /// Number of adapters currently registered on either hub.
    pub async fn registration_count(&self) -> usize {
        self.registrations
            .lock()
            .await
            .as_ref()
            .map_or(0, Vec::len)
    }

    /// Validates the whole configuration, then registers every adapter.
    ///
    /// Nothing stays registered when this fails: configuration errors are
    /// detected before any hub is called, and a refused registration rolls back
    /// the ones made before it.
    ///
    /// The ledger is not locked while hubs are called, so handlers replayed by
    /// `memory` routes may query the proxy. They observe it as inactive until
    /// this call completes.
    pub async fn activate(&self) -> Result<(), ProxyError> {
        if self.registrations.lock().await.is_some() {
            return Err(self.reject_activation());
        }

        debug!(
            event = events::PROXY_ACTIVATE_START,
            component = COMPONENT,
            proxy = %self.name,
            route_sets = self.route_sets.len(),
            "activating hub proxy"
        );

        let planned = plan_routes(&self.route_sets).map_err(|err| {
            warn!(
                event = events::PROXY_ACTIVATE_FAILED,
                component = COMPONENT,
                proxy = %self.name,
                err = %err,
                "invalid route configuration"
            );
            err
        })?;

        let registered = register_routes(planned, &self.local, &self.name)
            .await
            .map_err(|err| {
                warn!(
                    event = events::PROXY_ACTIVATE_FAILED,
                    component = COMPONENT,
                    proxy = %self.name,
                    err = %err,
                    "adapter registration failed"
                );
                err
            })?;

        let mut registrations = self.registrations.lock().await;
        if registrations.is_some() {
            // A concurrent activation finished first.
            drop(registrations);
            if let Err(err) = unregister_routes(registered, &self.name).await {
                warn!(
                    event = events::PROXY_ACTIVATE_FAILED,
                    component = COMPONENT,
                    proxy = %self.name,
                    err = %err,
                    "unable to undo registrations of a concurrent activation"
                );
            }
            return Err(self.reject_activation());
        }

        info!(
            event = events::PROXY_ACTIVATED,
            component = COMPONENT,
            proxy = %self.name,
            registrations = registered.len(),
            "hub proxy active"
        );
        *registrations = Some(registered);
        Ok(())
    }

    fn reject_activation(&self) -> ProxyError {
        warn!(
            event = events::PROXY_ACTIVATE_REJECTED,
            component = COMPONENT,
            proxy = %self.name,
            reason = "already_active",
            "ignoring activation of an active proxy"
        );
        ProxyError::AlreadyActive(self.name.clone())
    }

    /// Unregisters everything the last activation registered.
    ///
    /// Calling this on an inactive proxy does nothing.
    pub async fn deactivate(&self) -> Result<(), ProxyError> {
        let Some(registered) = self.registrations.lock().await.take() else {
            debug!(
                event = events::PROXY_DEACTIVATE_NOOP,
                component = COMPONENT,
                proxy = %self.name,
                "hub proxy already inactive"
            );
            return Ok(());
        };

        let count = registered.len();
        let result = unregister_routes(registered, &self.name).await;

        info!(
            event = events::PROXY_DEACTIVATED,
            component = COMPONENT,
            proxy = %self.name,
            registrations = count,
            clean = result.is_ok(),
            "hub proxy inactive"
        );
        result.map_err(ProxyError::from)
    }
}

impl Debug for HubProxy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubProxy")
            .field("name", &self.name)
            .field("route_sets", &self.route_sets)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::HubProxy;
    use crate::error::{ForwardingError, ProxyError};
    use crate::hub::{Arg, LegacyHub, LocalHub, Outcome, TopicHandler};
    use crate::route_set::{DetailedTopic, RouteSet};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingHub {
        subscribed: AtomicUsize,
        unsubscribed: AtomicUsize,
    }

    #[async_trait]
    impl LocalHub for CountingHub {
        async fn subscribe(
            &self,
            _topic: &str,
            _context: &str,
            _handler: Arc<dyn TopicHandler>,
        ) -> Result<(), ForwardingError> {
            self.subscribed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn unsubscribe(
            &self,
            _topic: &str,
            _context: &str,
            _handler: Arc<dyn TopicHandler>,
        ) -> Result<(), ForwardingError> {
            self.unsubscribed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn publish(&self, _topic: &str, _args: Vec<Arg>) -> Result<Outcome, ForwardingError> {
            Ok(Outcome::Empty)
        }
    }

    #[async_trait]
    impl LegacyHub for CountingHub {
        async fn publish(&self, _topic: &str, _args: Vec<Arg>) -> Result<(), ForwardingError> {
            Ok(())
        }

        async fn subscribe(
            &self,
            _topic: &str,
            _context: &str,
            _memory: bool,
            _handler: Arc<dyn TopicHandler>,
        ) -> Result<(), ForwardingError> {
            self.subscribed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn unsubscribe(
            &self,
            _topic: &str,
            _context: &str,
            _handler: Arc<dyn TopicHandler>,
        ) -> Result<(), ForwardingError> {
            self.unsubscribed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn counts(hub: &CountingHub) -> (usize, usize) {
        (
            hub.subscribed.load(Ordering::SeqCst),
            hub.unsubscribed.load(Ordering::SeqCst),
        )
    }

    #[tokio::test]
    async fn activate_then_deactivate_twice_unregisters_once() {
        let local = Arc::new(CountingHub::default());
        let legacy = Arc::new(CountingHub::default());
        let proxy = HubProxy::new(
            "proxy",
            local.clone(),
            vec![RouteSet::new(legacy.clone())
                .publish("a", "b")
                .publish("c", DetailedTopic::topic("d").with_defer(true))
                .subscribe("x", "y")],
        );

        proxy.activate().await.expect("activated");
        assert!(proxy.is_active().await);
        assert_eq!(proxy.registration_count().await, 3);

        proxy.deactivate().await.expect("deactivated");
        proxy.deactivate().await.expect("second deactivate is a no-op");

        assert!(!proxy.is_active().await);
        assert_eq!(counts(&local), (2, 2));
        assert_eq!(counts(&legacy), (1, 1));
    }

    #[tokio::test]
    async fn activating_an_active_proxy_is_rejected() {
        let local = Arc::new(CountingHub::default());
        let legacy = Arc::new(CountingHub::default());
        let proxy = HubProxy::new(
            "proxy",
            local.clone(),
            vec![RouteSet::new(legacy).publish("a", "b")],
        );

        proxy.activate().await.expect("activated");
        let err = proxy.activate().await.expect_err("already active");

        assert_eq!(err, ProxyError::AlreadyActive("proxy".to_string()));
        assert_eq!(counts(&local), (1, 0));
    }

    #[tokio::test]
    async fn missing_hub_aborts_activation_before_any_registration() {
        let local = Arc::new(CountingHub::default());
        let legacy = Arc::new(CountingHub::default());
        let proxy = HubProxy::new(
            "proxy",
            local.clone(),
            vec![
                RouteSet::new(legacy.clone()).publish("a", "b").subscribe("x", "y"),
                RouteSet::without_hub().publish("c", "d"),
            ],
        );

        let err = proxy.activate().await.expect_err("hub is required");

        assert!(matches!(err, ProxyError::Configuration(_)));
        assert!(!proxy.is_active().await);
        assert_eq!(counts(&local), (0, 0));
        assert_eq!(counts(&legacy), (0, 0));
    }

    #[tokio::test]
    async fn proxy_can_be_reactivated_after_deactivation() {
        let local = Arc::new(CountingHub::default());
        let legacy = Arc::new(CountingHub::default());
        let proxy = HubProxy::new(
            "proxy",
            local.clone(),
            vec![RouteSet::new(legacy).subscribe("x", "y")],
        );

        proxy.activate().await.expect("first activation");
        proxy.deactivate().await.expect("deactivated");
        proxy.activate().await.expect("second activation");

        assert_eq!(proxy.registration_count().await, 1);
    }
}
