// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

use crate::types::config::{LeafHubConfig, SyncServiceConfig, TransportProvider};

/// The per-leaf-hub projection of a Config. One instance lives in each
/// managed cluster's namespace on the hub and is never authored by hand.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(
    group = "hubofhubs.open-cluster-management.io",
    version = "v1alpha1",
    kind = "AgentConfig"
)]
#[kube(namespaced)]
#[kube(status = "AgentConfigStatus")]
#[serde(rename_all = "camelCase")]
pub struct AgentConfigSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<AgentGlobalConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<AgentComponentsConfig>,
}

/// Settings shared by all leaf hub components
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentGlobalConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_interval: Option<AgentHeartbeatIntervalConfig>,
}

/// Heartbeat interval for the leaf hub, in seconds
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentHeartbeatIntervalConfig {
    #[serde(default = "default_heartbeat_secs")]
    pub leaf_hub: u64,
}

/// Settings for leaf hub components
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentComponentsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core: Option<AgentCoreConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<AgentTransportConfig>,
}

/// Settings for leaf hub core controllers
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentCoreConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_hub: Option<LeafHubConfig>,
}

/// Transport settings relevant to an agent. Kafka tuning stays hub-side and
/// is intentionally not mirrored here.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentTransportConfig {
    #[serde(default)]
    pub provider: TransportProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_service: Option<SyncServiceConfig>,
}

/// Observed state of AgentConfig, currently a placeholder
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub struct AgentConfigStatus {}

fn default_heartbeat_secs() -> u64 {
    60
}
