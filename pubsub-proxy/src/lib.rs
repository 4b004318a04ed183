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

//! # pubsub-proxy
//!
//! `pubsub-proxy` bridges a local publish/subscribe hub with hubs of an older
//! generation, so components on either side interoperate without knowing about
//! each other.
//!
//! A [`HubProxy`] is configured with [`RouteSet`]s. Each route set names one
//! legacy hub and two maps keyed by source topic:
//!
//! - `publish` routes forward local publications to the legacy hub. With
//!   `defer`, the legacy side receives a trailing completion handle and the
//!   local publisher gets a promise of everything the legacy side resolves it with.
//! - `subscribe` routes forward legacy publications to the local hub. A trailing
//!   completion handle from the legacy side is settled from the local result.
//!   With `memory`, the legacy hub replays its last publication on registration.
//!
//! ```
//! use std::sync::Arc;
//! use pubsub_proxy::{DetailedTopic, HubProxy, LegacyHub, LocalHub, RouteSet};
//! # use pubsub_proxy::{Arg, ForwardingError, Outcome, TopicHandler};
//! # use async_trait::async_trait;
//! #
//! # struct NoopHub;
//! #
//! # #[async_trait]
//! # impl LocalHub for NoopHub {
//! #     async fn subscribe(&self, _: &str, _: &str, _: Arc<dyn TopicHandler>) -> Result<(), ForwardingError> { Ok(()) }
//! #     async fn unsubscribe(&self, _: &str, _: &str, _: Arc<dyn TopicHandler>) -> Result<(), ForwardingError> { Ok(()) }
//! #     async fn publish(&self, _: &str, _: Vec<Arg>) -> Result<Outcome, ForwardingError> { Ok(Outcome::Empty) }
//! # }
//! #
//! # #[async_trait]
//! # impl LegacyHub for NoopHub {
//! #     async fn publish(&self, _: &str, _: Vec<Arg>) -> Result<(), ForwardingError> { Ok(()) }
//! #     async fn subscribe(&self, _: &str, _: &str, _: bool, _: Arc<dyn TopicHandler>) -> Result<(), ForwardingError> { Ok(()) }
//! #     async fn unsubscribe(&self, _: &str, _: &str, _: Arc<dyn TopicHandler>) -> Result<(), ForwardingError> { Ok(()) }
//! # }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let local: Arc<dyn LocalHub> = Arc::new(NoopHub);
//! let legacy: Arc<dyn LegacyHub> = Arc::new(NoopHub);
//!
//! let proxy = HubProxy::new(
//!     "to-legacy",
//!     local,
//!     vec![RouteSet::new(legacy)
//!         .publish("cart/add", "basket/add")
//!         .publish("cart/total", DetailedTopic::topic("basket/total").with_defer(true))
//!         .subscribe("user/login", DetailedTopic::topic("session/user").with_memory(true))],
//! );
//!
//! proxy.activate().await.unwrap();
//! assert_eq!(proxy.registration_count().await, 3);
//! proxy.deactivate().await.unwrap();
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - Routing: normalises route entries into descriptors, once per activation
//! - Data plane: publish- and subscribe-direction adapters
//! - Completion: single-value promises and the legacy multi-value convention
//! - Control plane: activation plan, registration ledger and rollback
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events and never installs a global
//! subscriber. Binaries and tests initialise `tracing_subscriber` themselves.

pub mod completion;
mod control_plane;
mod data_plane;

mod error;
pub use error::{CompletionError, ConfigurationError, ForwardingError, ProxyError};

mod hub;
pub use hub::{Arg, HandlerIdentity, LegacyHub, LocalHub, Outcome, TopicHandler};

#[doc(hidden)]
pub mod observability;

mod proxy;
pub use proxy::HubProxy;

mod route_set;
pub use route_set::{DetailedTopic, RouteEntry, RouteSet};

pub mod routing;
