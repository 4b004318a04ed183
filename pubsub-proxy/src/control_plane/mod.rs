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

//! Control-plane layer.
//!
//! Owns the activation plan and the ledger of live registrations. Activation
//! validates everything first and only then touches the hubs; a registration
//! failure rolls back what this activation registered. Deactivation replays
//! the ledger once.

pub(crate) mod registration;
pub(crate) mod route_plan;
