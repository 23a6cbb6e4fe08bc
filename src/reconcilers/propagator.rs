// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Propagator reconciler - keeps per-cluster AgentConfig objects consistent
//! with the Config they derive from.

use crate::constants::finalizers;
use crate::error::{OperatorError, Result};
use crate::propagation::{propagate_agent_config, remove_agent_configs};
use crate::reconcilers::finalizer::{add_finalizer, has_finalizer, remove_finalizer};
use crate::types::config::Config;
use futures::StreamExt;
use kube::{
    api::PostParams,
    runtime::{controller::Action, events::Recorder, events::Reporter, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct PropagatorReconciler {
    client: Client,
    recorder: Recorder,
}

impl PropagatorReconciler {
    pub fn new(client: Client) -> Self {
        let reporter = Reporter {
            controller: "hub-of-hubs-operator-propagator".to_string(),
            instance: None,
        };
        Self {
            recorder: Recorder::new(client.clone(), reporter),
            client,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let configs: Api<Config> = Api::all(self.client.clone());
        let context = Arc::new(self);

        Controller::new(configs, watcher::Config::default())
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled config: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }

    /// Sync one queue key of the form `namespace/name`.
    ///
    /// State machine: ensure the finalizer on live objects, clean up derived
    /// AgentConfigs and strip the finalizer on deleted ones, otherwise
    /// propagate the current spec to all matching clusters.
    pub(crate) async fn sync(&self, key: &str) -> Result<()> {
        debug!("Reconciling config {:?}", key);

        let Some((namespace, name)) = key.split_once('/') else {
            // ignore keys that are not in format: namespace/name
            debug!("Ignoring malformed key {:?}", key);
            return Ok(());
        };

        let configs: Api<Config> = Api::namespaced(self.client.clone(), namespace);
        let mut config = match configs.get(name).await {
            Ok(config) => config,
            Err(kube::Error::Api(err)) if err.code == 404 => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if config.metadata.deletion_timestamp.is_none()
            && !has_finalizer(&config.metadata, finalizers::PROPAGATOR)
        {
            add_finalizer(&mut config.metadata, finalizers::PROPAGATOR);
            debug!(
                "Adding finalizer {:?} to config {}/{}",
                finalizers::PROPAGATOR,
                namespace,
                name
            );
            configs
                .replace(name, &PostParams::default(), &config)
                .await?;
            return Ok(());
        }

        // Remove derived resources after the config is deleted
        if config.metadata.deletion_timestamp.is_some() {
            remove_agent_configs(&self.client, &config).await?;
            return self.strip_finalizer(&configs, config).await;
        }

        propagate_agent_config(&self.client, &self.recorder, &config).await
    }

    async fn strip_finalizer(&self, configs: &Api<Config>, mut config: Config) -> Result<()> {
        if !remove_finalizer(&mut config.metadata, finalizers::PROPAGATOR) {
            return Ok(());
        }

        debug!(
            "Removing finalizer {:?} from config {}/{}",
            finalizers::PROPAGATOR,
            config.namespace().unwrap_or_default(),
            config.name_any()
        );
        configs
            .replace(&config.name_any(), &PostParams::default(), &config)
            .await?;
        Ok(())
    }
}

async fn reconcile(config: Arc<Config>, ctx: Arc<PropagatorReconciler>) -> Result<Action> {
    let key = format!(
        "{}/{}",
        config.namespace().unwrap_or_default(),
        config.name_any()
    );
    ctx.sync(&key).await?;

    Ok(Action::await_change())
}

fn error_policy(
    _config: Arc<Config>,
    error: &OperatorError,
    _ctx: Arc<PropagatorReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{list_json, managed_cluster_json, MockService};
    use crate::types::config::ConfigSpec;
    use kube::api::ObjectMeta;

    const CONFIG_PATH: &str =
        "/apis/hubofhubs.open-cluster-management.io/v1alpha1/namespaces/default/configs/cfg1";
    const CLUSTERS_PATH: &str = "/apis/cluster.open-cluster-management.io/v1/managedclusters";

    fn make_reconciler(mock: &MockService) -> PropagatorReconciler {
        PropagatorReconciler::new(mock.client())
    }

    fn config_json(finalizers: &[&str], deleted: bool) -> String {
        let config = Config {
            metadata: ObjectMeta {
                name: Some("cfg1".to_string()),
                namespace: Some("default".to_string()),
                finalizers: if finalizers.is_empty() {
                    None
                } else {
                    Some(finalizers.iter().map(|f| f.to_string()).collect())
                },
                deletion_timestamp: deleted.then(|| {
                    k8s_openapi::apimachinery::pkg::apis::meta::v1::Time(
                        k8s_openapi::chrono::Utc::now(),
                    )
                }),
                ..Default::default()
            },
            spec: ConfigSpec::default(),
            status: None,
        };
        serde_json::to_string(&config).unwrap()
    }

    #[tokio::test]
    async fn test_sync_ignores_malformed_key() {
        let mock = MockService::new();
        let reconciler = make_reconciler(&mock);

        reconciler.sync("not-a-valid-key").await.unwrap();

        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_sync_ignores_missing_config() {
        let mock = MockService::new();
        let reconciler = make_reconciler(&mock);

        // The config GET falls through to the default 404 response.
        reconciler.sync("default/cfg1").await.unwrap();

        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_adds_finalizer_first() {
        let mock = MockService::new().on_get(CONFIG_PATH, 200, &config_json(&[], false));
        let reconciler = make_reconciler(&mock);

        reconciler.sync("default/cfg1").await.unwrap();

        let puts = mock.requests_with_method("PUT");
        assert_eq!(puts.len(), 1);
        assert!(puts[0].body.contains(finalizers::PROPAGATOR));
        // No propagation happens on the finalizer round trip
        assert!(mock.requests_with_method("POST").is_empty());
    }

    #[tokio::test]
    async fn test_sync_propagates_when_finalizer_present() {
        let clusters = list_json(
            "ManagedCluster",
            "cluster.open-cluster-management.io/v1",
            &[managed_cluster_json(
                "cluster-a",
                serde_json::json!({"vendor": "OpenShift"}),
            )],
        );
        let mock = MockService::new()
            .on_get(CONFIG_PATH, 200, &config_json(&[finalizers::PROPAGATOR], false))
            .on_get(CLUSTERS_PATH, 200, &clusters);
        let reconciler = make_reconciler(&mock);

        reconciler.sync("default/cfg1").await.unwrap();

        let creates: Vec<_> = mock
            .requests_with_method("POST")
            .into_iter()
            .filter(|r| r.path.contains("/agentconfigs"))
            .collect();
        assert_eq!(creates.len(), 1);
        assert!(creates[0].path.contains("/namespaces/cluster-a/"));
    }

    #[tokio::test]
    async fn test_sync_cleans_up_on_deletion() {
        let clusters = list_json(
            "ManagedCluster",
            "cluster.open-cluster-management.io/v1",
            &[managed_cluster_json(
                "cluster-a",
                serde_json::json!({"vendor": "OpenShift"}),
            )],
        );
        let other_finalizer = "kubernetes.io/some-other-finalizer";
        let mock = MockService::new()
            .on_get(
                CONFIG_PATH,
                200,
                &config_json(&[other_finalizer, finalizers::PROPAGATOR], true),
            )
            .on_get(CLUSTERS_PATH, 200, &clusters);
        let reconciler = make_reconciler(&mock);

        reconciler.sync("default/cfg1").await.unwrap();

        // The derived AgentConfig is deleted (404 counts as done), then the
        // propagator finalizer is stripped while the foreign one stays.
        let deletes = mock.requests_with_method("DELETE");
        assert_eq!(deletes.len(), 1);
        assert!(deletes[0]
            .path
            .ends_with("/namespaces/cluster-a/agentconfigs/cfg1"));

        let puts = mock.requests_with_method("PUT");
        assert_eq!(puts.len(), 1);
        assert!(!puts[0].body.contains(finalizers::PROPAGATOR));
        assert!(puts[0].body.contains(other_finalizer));
    }
}
