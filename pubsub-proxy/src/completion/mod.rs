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

//! Completion layer.
//!
//! The local hub settles a completion with exactly one value, while legacy hubs
//! resolve with any number of values in a single call. This layer owns both
//! conventions and the explicit conversions between them.
//!
//! ```
//! use pubsub_proxy::completion::{CompletionHandle, VariadicResolver};
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let (resolver, promise) = VariadicResolver::pair();
//!
//! // The legacy side resolves with two values ...
//! resolver.resolve(vec![json!(10), json!(20)]);
//!
//! // ... and the local side sees one ordered sequence.
//! assert_eq!(promise.await.unwrap(), json!([10, 20]));
//! # });
//! ```

mod deferred;
mod thenable;
mod variadic;

pub use deferred::{Deferred, Promise};
pub use thenable::{CompletionHandle, Reactions, Thenable};
pub use variadic::{spread, VariadicResolver};
