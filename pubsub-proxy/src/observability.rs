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

//! Stable event names and field formatting for `tracing` output.

pub mod events {
    pub const PROXY_CREATED: &str = "proxy_created";
    pub const PROXY_ACTIVATE_START: &str = "proxy_activate_start";
    pub const PROXY_ACTIVATE_REJECTED: &str = "proxy_activate_rejected";
    pub const PROXY_ACTIVATE_FAILED: &str = "proxy_activate_failed";
    pub const PROXY_ACTIVATED: &str = "proxy_activated";
    pub const PROXY_DEACTIVATED: &str = "proxy_deactivated";
    pub const PROXY_DEACTIVATE_NOOP: &str = "proxy_deactivate_noop";

    pub const ROUTE_RESOLVED: &str = "route_resolved";

    pub const REGISTRATION_ADDED: &str = "registration_added";
    pub const REGISTRATION_FAILED: &str = "registration_failed";
    pub const REGISTRATION_ROLLBACK: &str = "registration_rollback";
    pub const REGISTRATION_REMOVED: &str = "registration_removed";
    pub const UNREGISTRATION_FAILED: &str = "unregistration_failed";

    pub const PUBLISH_FORWARD: &str = "publish_forward";
    pub const PUBLISH_FORWARD_FAILED: &str = "publish_forward_failed";
    pub const SUBSCRIBE_FORWARD: &str = "subscribe_forward";
    pub const SUBSCRIBE_FORWARD_FAILED: &str = "subscribe_forward_failed";
    pub const SUBSCRIBE_COMPLETION_CHAINED: &str = "subscribe_completion_chained";
}

pub mod fields {
    use crate::hub::Arg;

    /// Compact rendering of an argument list, e.g. `[1, "x", <completion>]`.
    pub fn format_args(args: &[Arg]) -> String {
        format!("{args:?}")
    }

    pub fn format_hub_side(legacy: bool) -> &'static str {
        if legacy {
            "legacy"
        } else {
            "local"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fields::format_args;
    use crate::completion::{CompletionHandle, VariadicResolver};
    use crate::hub::Arg;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn format_args_masks_completion_handles() {
        let (resolver, _) = VariadicResolver::pair();
        let handle: Arc<dyn CompletionHandle> = Arc::new(resolver);
        let args = vec![Arg::from(json!(1)), Arg::from(json!("x")), Arg::from(handle)];

        assert_eq!(format_args(&args), "[1, \"x\", <completion>]");
    }
}
