// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Projection of Config settings into AgentConfig objects and their fan-out
//! to managed clusters.

pub mod agent_config;

pub use agent_config::{project_agent_config, propagate_agent_config, remove_agent_configs};
