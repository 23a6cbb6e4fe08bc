// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Level of aggregation leaf hubs apply before sending information upstream
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationLevel {
    #[default]
    Full,
    Minimal,
}

/// Compression applied to messages before they enter the transport layer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
pub enum MsgCompressType {
    #[serde(rename = "gzip")]
    Gzip,
    #[serde(rename = "no-op")]
    Noop,
}

/// Provider backing the transport layer
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TransportProvider {
    #[default]
    Kafka,
    SyncService,
}

impl TransportProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportProvider::Kafka => "kafka",
            TransportProvider::SyncService => "sync-service",
        }
    }
}

/// Provider backing the database
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DatabaseProvider {
    #[default]
    Postgresql,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(
    group = "hubofhubs.open-cluster-management.io",
    version = "v1alpha1",
    kind = "Config"
)]
#[kube(namespaced)]
#[kube(status = "ConfigStatus")]
#[serde(rename_all = "camelCase")]
pub struct ConfigSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<GlobalConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentsConfig>,
}

impl Config {
    /// Transport provider selected by this config, kafka when unset
    pub fn transport_provider(&self) -> TransportProvider {
        self.spec
            .components
            .as_ref()
            .and_then(|c| c.transport.as_ref())
            .map(|t| t.provider.clone())
            .unwrap_or_default()
    }
}

/// Settings shared by all components
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default)]
    pub aggregation_level: AggregationLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartbeat_interval: Option<HeartbeatIntervalConfig>,
    #[serde(default)]
    pub enable_local_policies: bool,
}

/// Heartbeat intervals for the hub of hubs and leaf hubs, in seconds
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatIntervalConfig {
    #[serde(default = "default_heartbeat_secs")]
    pub hoh_in_seconds: u64,
    #[serde(default = "default_heartbeat_secs")]
    pub leaf_hub_in_seconds: u64,
}

/// Settings for all components
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core: Option<CoreConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,
}

/// Settings for the core controllers
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoh: Option<HohConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_hub: Option<LeafHubConfig>,
}

/// Settings for core controllers running in the hub of hubs cluster
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HohConfig {
    #[serde(rename = "nonk8sAPI", skip_serializing_if = "Option::is_none")]
    pub nonk8s_api: Option<Nonk8sApiConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rbac: Option<RbacConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_sync: Option<SpecSyncConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_sync: Option<StatusSyncConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_transport_bridge: Option<SpecTransportBridgeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_transport_bridge: Option<StatusTransportBridgeConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Nonk8sApiConfig {
    #[serde(default)]
    pub base_path: String,
}

/// Placeholder, carries no tuning knobs yet
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub struct RbacConfig {}

/// Placeholder, carries no tuning knobs yet
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub struct SpecSyncConfig {}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusSyncConfig {
    #[serde(default = "default_sync_interval")]
    pub sync_interval: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpecTransportBridgeConfig {
    #[serde(default = "default_sync_interval")]
    pub sync_interval: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_compress_type: Option<MsgCompressType>,
    #[serde(default = "default_msg_size_limit")]
    pub msg_size_limit: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransportBridgeConfig {
    #[serde(default = "default_sync_interval")]
    pub committer_interval: u64,
    #[serde(default = "default_sync_interval")]
    pub statistics_log_interval: u64,
}

/// Settings for core controllers running in a leaf hub cluster
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeafHubConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_sync: Option<LeafHubSpecSyncConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_sync: Option<LeafHubStatusSyncConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeafHubSpecSyncConfig {
    #[serde(rename = "kubeClientPoolSIze", default = "default_kube_client_pool_size")]
    pub kube_client_pool_size: u64,
    #[serde(rename = "enforceHoHRbac", default)]
    pub enforce_hoh_rbac: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeafHubStatusSyncConfig {
    #[serde(rename = "syncIntervalConfig", skip_serializing_if = "Option::is_none")]
    pub sync_interval: Option<LeafHubStatusSyncIntervalSettings>,
    #[serde(default = "default_delta_sent_count_switch_factor")]
    pub delta_sent_count_switch_factor: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_compress_type: Option<MsgCompressType>,
    #[serde(default = "default_msg_size_limit")]
    pub msg_size_limit: u64,
}

/// Sync intervals for the leaf hub status sync, in seconds
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeafHubStatusSyncIntervalSettings {
    #[serde(default = "default_sync_interval")]
    pub managed_clusters: u64,
    #[serde(default = "default_sync_interval")]
    pub policies: u64,
    #[serde(default = "default_control_info_interval")]
    pub control_info: u64,
}

/// Settings for the transport layer
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransportConfig {
    #[serde(default)]
    pub provider: TransportProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kafka: Option<KafkaConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_service: Option<SyncServiceConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KafkaConfig {
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_kafka_replicas")]
    pub replicas: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncServiceConfig {
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_sync_interval")]
    pub polling_interval: u64,
}

/// Settings for the database
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    #[serde(default)]
    pub provider: DatabaseProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgresql: Option<PostgreSqlConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostgreSqlConfig {
    #[serde(default)]
    pub version: String,
    #[serde(rename = "enableHA", default)]
    pub enable_ha: bool,
}

/// Observed state of Config, currently a placeholder
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, schemars::JsonSchema)]
pub struct ConfigStatus {}

fn default_heartbeat_secs() -> u64 {
    60
}

fn default_sync_interval() -> u64 {
    5
}

fn default_msg_size_limit() -> u64 {
    940
}

fn default_kube_client_pool_size() -> u64 {
    10
}

fn default_delta_sent_count_switch_factor() -> u64 {
    100
}

fn default_control_info_interval() -> u64 {
    3600
}

fn default_kafka_replicas() -> u64 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::api::ObjectMeta;

    fn make_config(spec: ConfigSpec) -> Config {
        Config {
            metadata: ObjectMeta {
                name: Some("cfg1".to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec,
            status: None,
        }
    }

    #[test]
    fn test_transport_provider_defaults_to_kafka() {
        let config = make_config(ConfigSpec::default());
        assert_eq!(config.transport_provider(), TransportProvider::Kafka);
    }

    #[test]
    fn test_transport_provider_from_components() {
        let config = make_config(ConfigSpec {
            components: Some(ComponentsConfig {
                transport: Some(TransportConfig {
                    provider: TransportProvider::SyncService,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert_eq!(config.transport_provider(), TransportProvider::SyncService);
    }

    #[test]
    fn test_transport_provider_wire_names() {
        assert_eq!(TransportProvider::Kafka.as_str(), "kafka");
        assert_eq!(TransportProvider::SyncService.as_str(), "sync-service");

        let provider: TransportProvider = serde_json::from_str("\"sync-service\"").unwrap();
        assert_eq!(provider, TransportProvider::SyncService);
    }

    #[test]
    fn test_msg_compress_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&MsgCompressType::Noop).unwrap(),
            "\"no-op\""
        );
        assert_eq!(
            serde_json::to_string(&MsgCompressType::Gzip).unwrap(),
            "\"gzip\""
        );
    }

    #[test]
    fn test_heartbeat_interval_defaults() {
        let interval: HeartbeatIntervalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(interval.hoh_in_seconds, 60);
        assert_eq!(interval.leaf_hub_in_seconds, 60);
    }

    #[test]
    fn test_leaf_hub_spec_sync_wire_names() {
        let sync: LeafHubSpecSyncConfig =
            serde_json::from_str(r#"{"kubeClientPoolSIze": 20, "enforceHoHRbac": true}"#).unwrap();
        assert_eq!(sync.kube_client_pool_size, 20);
        assert!(sync.enforce_hoh_rbac);
    }

    #[test]
    fn test_spec_deserializes_nested_components() {
        let spec: ConfigSpec = serde_json::from_str(
            r#"{
                "global": {"aggregationLevel": "minimal", "heartbeatInterval": {"leafHubInSeconds": 30}},
                "components": {
                    "transport": {"provider": "sync-service", "syncService": {"version": "1.0"}},
                    "database": {"provider": "postgresql", "postgresql": {"enableHA": true}}
                }
            }"#,
        )
        .unwrap();

        let global = spec.global.unwrap();
        assert_eq!(global.aggregation_level, AggregationLevel::Minimal);
        assert_eq!(global.heartbeat_interval.unwrap().leaf_hub_in_seconds, 30);

        let components = spec.components.unwrap();
        let transport = components.transport.unwrap();
        assert_eq!(transport.provider, TransportProvider::SyncService);
        assert_eq!(transport.sync_service.unwrap().polling_interval, 5);
        assert!(components.database.unwrap().postgresql.unwrap().enable_ha);
    }
}
