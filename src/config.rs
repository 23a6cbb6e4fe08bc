// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::env;

use crate::constants::DEFAULT_OPERATOR_IMAGE;

/// Operator settings loaded from environment variables
#[derive(Debug, Clone)]
pub struct Settings {
    /// Operator image handed to the manager deployment for agent installs
    pub operator_image: String,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Self {
        let operator_image = env::var("HUB_OF_HUBS_OPERATOR_IMAGE")
            .unwrap_or_else(|_| DEFAULT_OPERATOR_IMAGE.to_string());

        Settings { operator_image }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            operator_image: DEFAULT_OPERATOR_IMAGE.to_string(),
        }
    }
}
