// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Building AgentConfig projections and applying them per managed cluster

use std::collections::BTreeMap;

use kube::api::{DeleteParams, ListParams, ObjectMeta};
use kube::runtime::events::Recorder;
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info, instrument};

use crate::apply::apply_agent_config;
use crate::constants::labels;
use crate::error::Result;
use crate::types::agent_config::{
    AgentComponentsConfig, AgentConfig, AgentConfigSpec, AgentCoreConfig, AgentGlobalConfig,
    AgentHeartbeatIntervalConfig, AgentTransportConfig,
};
use crate::types::config::Config;
use crate::types::managed_cluster::ManagedCluster;

/// Build the AgentConfig projection of a Config.
///
/// Carries the leaf hub heartbeat interval, the leaf hub core settings and
/// the transport provider with its sync-service settings. Everything else
/// (kafka tuning, database, hub core settings) stays hub-side.
pub fn project_agent_config(config: &Config) -> AgentConfig {
    let spec = &config.spec;

    AgentConfig {
        metadata: ObjectMeta {
            name: config.metadata.name.clone(),
            labels: Some(BTreeMap::from([(
                labels::MANAGED_BY_KEY.to_string(),
                labels::MANAGED_BY_VALUE.to_string(),
            )])),
            ..Default::default()
        },
        spec: AgentConfigSpec {
            global: spec.global.as_ref().map(|global| AgentGlobalConfig {
                heartbeat_interval: global.heartbeat_interval.as_ref().map(|interval| {
                    AgentHeartbeatIntervalConfig {
                        leaf_hub: interval.leaf_hub_in_seconds,
                    }
                }),
            }),
            components: spec.components.as_ref().map(|components| {
                AgentComponentsConfig {
                    core: components.core.as_ref().map(|core| AgentCoreConfig {
                        leaf_hub: core.leaf_hub.clone(),
                    }),
                    transport: components.transport.as_ref().map(|transport| {
                        AgentTransportConfig {
                            provider: transport.provider.clone(),
                            sync_service: transport.sync_service.clone(),
                        }
                    }),
                }
            }),
        },
        status: None,
    }
}

/// List all managed clusters the operator propagates to
async fn list_matching_clusters(client: &Client) -> Result<Vec<ManagedCluster>> {
    let clusters: Api<ManagedCluster> = Api::all(client.clone());
    let cluster_list = clusters
        .list(&ListParams::default().labels(labels::CLUSTER_SELECTOR))
        .await?;

    Ok(cluster_list.items)
}

/// Apply the projection of the given Config to every matching managed
/// cluster, namespacing each copy to the cluster name. The first apply
/// failure aborts the fan-out; a retry heals the remainder since applying
/// is idempotent.
#[instrument(skip(client, recorder, config), fields(config = %config.name_any()))]
pub async fn propagate_agent_config(
    client: &Client,
    recorder: &Recorder,
    config: &Config,
) -> Result<()> {
    let mut agent_config = project_agent_config(config);
    let clusters = list_matching_clusters(client).await?;

    debug!(
        "Propagating config {} to {} managed clusters",
        config.name_any(),
        clusters.len()
    );

    for cluster in &clusters {
        agent_config.metadata.namespace = Some(cluster.name_any());
        let (_, changed) = apply_agent_config(client, recorder, &agent_config).await?;
        if changed {
            info!(
                "Applied AgentConfig {} to cluster {}",
                config.name_any(),
                cluster.name_any()
            );
        }
    }

    Ok(())
}

/// Delete the AgentConfig derived from the given Config in every matching
/// managed cluster. An already absent object counts as success.
#[instrument(skip(client, config), fields(config = %config.name_any()))]
pub async fn remove_agent_configs(client: &Client, config: &Config) -> Result<()> {
    let name = config.name_any();
    let clusters = list_matching_clusters(client).await?;

    for cluster in &clusters {
        let api: Api<AgentConfig> = Api::namespaced(client.clone(), &cluster.name_any());
        match api.delete(&name, &DeleteParams::default()).await {
            Ok(_) => {
                info!(
                    "Deleted AgentConfig {} from cluster {}",
                    name,
                    cluster.name_any()
                );
            }
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!(
                    "AgentConfig {} already absent from cluster {}",
                    name,
                    cluster.name_any()
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
