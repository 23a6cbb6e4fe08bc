// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Agent reconciler - runs inside a managed cluster and watches the
//! AgentConfig propagated into the cluster's namespace on the hub.

use crate::constants::finalizers;
use crate::error::{OperatorError, Result};
use crate::reconcilers::finalizer::{add_finalizer, has_finalizer, remove_finalizer};
use crate::types::agent_config::AgentConfig;
use futures::StreamExt;
use kube::{
    api::PostParams,
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct AgentReconciler {
    hub_client: Client,
    cluster_name: String,
}

impl AgentReconciler {
    pub fn new(hub_client: Client, cluster_name: String) -> Self {
        Self {
            hub_client,
            cluster_name,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let agent_configs: Api<AgentConfig> =
            Api::namespaced(self.hub_client.clone(), &self.cluster_name);
        let context = Arc::new(self);

        Controller::new(agent_configs, watcher::Config::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled agent config: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }

    /// Sync one queue key of the form `namespace/name`. Same finalizer state
    /// machine as the propagator, without fan-out.
    pub(crate) async fn sync(&self, key: &str) -> Result<()> {
        debug!("Reconciling agent config {:?}", key);

        let Some((namespace, name)) = key.split_once('/') else {
            // ignore keys that are not in format: namespace/name
            debug!("Ignoring malformed key {:?}", key);
            return Ok(());
        };

        let agent_configs: Api<AgentConfig> =
            Api::namespaced(self.hub_client.clone(), namespace);
        let mut agent_config = match agent_configs.get(name).await {
            Ok(agent_config) => agent_config,
            Err(kube::Error::Api(err)) if err.code == 404 => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if agent_config.metadata.deletion_timestamp.is_none()
            && !has_finalizer(&agent_config.metadata, finalizers::AGENT)
        {
            add_finalizer(&mut agent_config.metadata, finalizers::AGENT);
            debug!(
                "Adding finalizer {:?} to agent config {}/{}",
                finalizers::AGENT,
                namespace,
                name
            );
            agent_configs
                .replace(name, &PostParams::default(), &agent_config)
                .await?;
            return Ok(());
        }

        // Remove local resources after the agent config is deleted
        if agent_config.metadata.deletion_timestamp.is_some() {
            self.remove_local_resources(&agent_config).await?;
            return self.strip_finalizer(&agent_configs, agent_config).await;
        }

        // TODO: apply the received configuration to the local hub-of-hubs
        // workloads once the leaf hub components are wired up.

        Ok(())
    }

    async fn remove_local_resources(&self, _agent_config: &AgentConfig) -> Result<()> {
        // Nothing is installed locally yet, see the TODO in sync.
        Ok(())
    }

    async fn strip_finalizer(
        &self,
        agent_configs: &Api<AgentConfig>,
        mut agent_config: AgentConfig,
    ) -> Result<()> {
        if !remove_finalizer(&mut agent_config.metadata, finalizers::AGENT) {
            return Ok(());
        }

        debug!(
            "Removing finalizer {:?} from agent config {}/{}",
            finalizers::AGENT,
            agent_config.namespace().unwrap_or_default(),
            agent_config.name_any()
        );
        agent_configs
            .replace(
                &agent_config.name_any(),
                &PostParams::default(),
                &agent_config,
            )
            .await?;
        Ok(())
    }
}

async fn reconcile(agent_config: Arc<AgentConfig>, ctx: Arc<AgentReconciler>) -> Result<Action> {
    let key = format!(
        "{}/{}",
        agent_config.namespace().unwrap_or_default(),
        agent_config.name_any()
    );
    ctx.sync(&key).await?;

    Ok(Action::await_change())
}

fn error_policy(
    _agent_config: Arc<AgentConfig>,
    error: &OperatorError,
    _ctx: Arc<AgentReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(60))
}
