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

//! Routing layer.
//!
//! Normalises declarative route entries once, at activation time. Adapters only
//! ever see the resolved [`RouteDescriptor`].
//!
//! ```
//! use pubsub_proxy::routing::RouteDescriptor;
//! use pubsub_proxy::{DetailedTopic, RouteEntry};
//!
//! let plain = RouteDescriptor::for_publish("a", &RouteEntry::from("foo")).unwrap();
//! assert!(!plain.defer_completion);
//!
//! let deferred = RouteEntry::from(DetailedTopic::topic("foo").with_defer(true));
//! assert!(RouteDescriptor::for_publish("a", &deferred).unwrap().defer_completion);
//! ```

pub(crate) mod route_descriptor;

pub use route_descriptor::RouteDescriptor;
