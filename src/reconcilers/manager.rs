// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deploy reconciler - renders the database and manager manifests for a
//! Config and applies them to the hub cluster.

use crate::config::Settings;
use crate::constants::{IMAGE_REGISTRY, IMAGE_TAG};
use crate::deployer::{Deployer, KubeDeployer};
use crate::error::{OperatorError, Result};
use crate::render::{render_manifests, DATABASE_MANIFESTS, MANAGER_MANIFESTS};
use crate::types::config::Config;
use futures::StreamExt;
use kube::api::DynamicObject;
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Serialize)]
struct DatabaseValues {
    registry: String,
    image_tag: String,
}

#[derive(Serialize)]
struct ManagerValues {
    registry: String,
    image_tag: String,
    transport_type: String,
    operator_image: String,
}

pub struct DeployReconciler {
    client: Client,
    settings: Settings,
    deployer: Arc<dyn Deployer>,
}

impl DeployReconciler {
    pub fn new(client: Client, settings: Settings) -> Self {
        let deployer = Arc::new(KubeDeployer::new(client.clone()));
        Self {
            client,
            settings,
            deployer,
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

    async fn sync(&self, config: &Config) -> Result<()> {
        let transport_type = config.transport_provider().as_str().to_string();

        let database_objects = render_manifests(
            DATABASE_MANIFESTS,
            &DatabaseValues {
                registry: IMAGE_REGISTRY.to_string(),
                image_tag: IMAGE_TAG.to_string(),
            },
        )?;

        // The database schema must exist before the init job runs against
        // it, so Job objects go in a second pass.
        let (objects, jobs) = partition_jobs(database_objects);
        for object in objects.iter().chain(jobs.iter()) {
            info!(
                "Creating or updating object {}/{}",
                object.namespace().unwrap_or_default(),
                object.name_any()
            );
            self.deployer.deploy(object).await?;
        }

        let manager_objects = render_manifests(
            MANAGER_MANIFESTS,
            &ManagerValues {
                registry: IMAGE_REGISTRY.to_string(),
                image_tag: IMAGE_TAG.to_string(),
                transport_type,
                operator_image: self.settings.operator_image.clone(),
            },
        )?;

        for object in &manager_objects {
            info!(
                "Creating or updating object {}/{}",
                object.namespace().unwrap_or_default(),
                object.name_any()
            );
            self.deployer.deploy(object).await?;
        }

        Ok(())
    }
}

/// Split rendered objects into non-Job objects and Job objects, preserving
/// the encounter order within each group
fn partition_jobs(objects: Vec<DynamicObject>) -> (Vec<DynamicObject>, Vec<DynamicObject>) {
    objects.into_iter().partition(|object| {
        object
            .types
            .as_ref()
            .map(|types| types.kind != "Job")
            .unwrap_or(true)
    })
}

async fn reconcile(config: Arc<Config>, ctx: Arc<DeployReconciler>) -> Result<Action> {
    debug!(
        "Reconciling config {}/{}",
        config.namespace().unwrap_or_default(),
        config.name_any()
    );
    ctx.sync(&config).await?;

    Ok(Action::await_change())
}

fn error_policy(
    _config: Arc<Config>,
    error: &OperatorError,
    _ctx: Arc<DeployReconciler>,
) -> Action {
    error!("Reconciliation error: {}", error);
    Action::requeue(Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockService;
    use crate::types::config::ConfigSpec;
    use kube::api::ObjectMeta;

    fn make_config() -> Config {
        Config {
            metadata: ObjectMeta {
                name: Some("cfg1".to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec: ConfigSpec::default(),
            status: None,
        }
    }

    #[test]
    fn test_partition_jobs_defers_jobs() {
        let objects = render_manifests(
            DATABASE_MANIFESTS,
            &DatabaseValues {
                registry: "quay.io/test".to_string(),
                image_tag: "latest".to_string(),
            },
        )
        .unwrap();

        let (others, jobs) = partition_jobs(objects);

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].types.as_ref().unwrap().kind, "Job");
        assert!(others
            .iter()
            .all(|o| o.types.as_ref().unwrap().kind != "Job"));
    }

    #[tokio::test]
    async fn test_sync_applies_job_last_within_database_set() {
        let mock = MockService::new();
        let reconciler = DeployReconciler::new(mock.client(), Settings::default());

        reconciler.sync(&make_config()).await.unwrap();

        let patches = mock.requests_with_method("PATCH");
        let job_index = patches
            .iter()
            .position(|r| r.path.contains("/jobs/"))
            .unwrap();
        let database_indexes: Vec<_> = patches
            .iter()
            .enumerate()
            .filter(|(_, r)| r.path.contains("postgresql") || r.path.contains("database"))
            .map(|(i, _)| i)
            .collect();

        // The init job is the last of the database objects
        assert!(database_indexes.iter().all(|i| *i <= job_index));

        // The manager deployment is applied too
        assert!(patches
            .iter()
            .any(|r| r.path.ends_with("/deployments/hub-of-hubs-manager")));
    }

    #[tokio::test]
    async fn test_sync_renders_selected_transport_type() {
        let mock = MockService::new();
        let reconciler = DeployReconciler::new(mock.client(), Settings::default());
        let mut config = make_config();
        config.spec = serde_json::from_str(
            r#"{"components": {"transport": {"provider": "sync-service"}}}"#,
        )
        .unwrap();

        reconciler.sync(&config).await.unwrap();

        let patches = mock.requests_with_method("PATCH");
        let deployment = patches
            .iter()
            .find(|r| r.path.ends_with("/deployments/hub-of-hubs-manager"))
            .unwrap();
        assert!(deployment.body.contains("--transport-type=sync-service"));
    }
}
