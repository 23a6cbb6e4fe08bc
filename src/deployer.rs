// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deploying rendered manifests to the hub cluster.

use async_trait::async_trait;
use kube::api::{DynamicObject, Patch, PatchParams};
use kube::core::GroupVersionKind;
use kube::discovery::ApiResource;
use kube::{Api, Client, ResourceExt};
use tracing::debug;

use crate::constants::OPERATOR_NAME;
use crate::error::{OperatorError, Result};

/// Seam for deploying a rendered Kubernetes object
#[async_trait]
pub trait Deployer: Send + Sync {
    async fn deploy(&self, object: &DynamicObject) -> Result<()>;
}

/// Deployer that server-side-applies objects through the Kubernetes API
pub struct KubeDeployer {
    client: Client,
}

impl KubeDeployer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Deployer for KubeDeployer {
    async fn deploy(&self, object: &DynamicObject) -> Result<()> {
        let gvk = object_gvk(object)?;
        let api_resource = ApiResource::from_gvk(&gvk);
        let name = object.name_any();

        let api: Api<DynamicObject> = match object.namespace() {
            Some(namespace) => Api::namespaced_with(self.client.clone(), &namespace, &api_resource),
            None => Api::all_with(self.client.clone(), &api_resource),
        };

        let params = PatchParams::apply(OPERATOR_NAME).force();
        api.patch(&name, &params, &Patch::Apply(object)).await?;

        debug!("Applied {} {}", gvk.kind, name);
        Ok(())
    }
}

/// Resolve the group, version and kind of a rendered object
fn object_gvk(object: &DynamicObject) -> Result<GroupVersionKind> {
    let types = object.types.as_ref().ok_or_else(|| {
        OperatorError::MalformedManifest(format!(
            "object {} has no type information",
            object.name_any()
        ))
    })?;

    Ok(match types.api_version.split_once('/') {
        Some((group, version)) => GroupVersionKind::gvk(group, version, &types.kind),
        None => GroupVersionKind::gvk("", &types.api_version, &types.kind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockService;
    use kube::core::TypeMeta;

    fn make_object(api_version: &str, kind: &str, name: &str, namespace: Option<&str>) -> DynamicObject {
        let mut object = DynamicObject {
            types: Some(TypeMeta {
                api_version: api_version.to_string(),
                kind: kind.to_string(),
            }),
            metadata: Default::default(),
            data: serde_json::json!({}),
        };
        object.metadata.name = Some(name.to_string());
        object.metadata.namespace = namespace.map(|ns| ns.to_string());
        object
    }

    #[test]
    fn test_object_gvk_with_group() {
        let object = make_object("apps/v1", "Deployment", "manager", Some("hub-of-hubs"));

        let gvk = object_gvk(&object).unwrap();

        assert_eq!(gvk.group, "apps");
        assert_eq!(gvk.version, "v1");
        assert_eq!(gvk.kind, "Deployment");
    }

    #[test]
    fn test_object_gvk_core_group() {
        let object = make_object("v1", "Service", "postgres", Some("hub-of-hubs"));

        let gvk = object_gvk(&object).unwrap();

        assert_eq!(gvk.group, "");
        assert_eq!(gvk.version, "v1");
    }

    #[test]
    fn test_object_gvk_requires_type_meta() {
        let mut object = make_object("v1", "Service", "postgres", None);
        object.types = None;

        assert!(matches!(
            object_gvk(&object),
            Err(OperatorError::MalformedManifest(_))
        ));
    }

    #[tokio::test]
    async fn test_deploy_patches_namespaced_object() {
        let mock = MockService::new();
        let deployer = KubeDeployer::new(mock.client());
        let object = make_object("apps/v1", "Deployment", "manager", Some("hub-of-hubs"));

        deployer.deploy(&object).await.unwrap();

        let patches = mock.requests_with_method("PATCH");
        assert_eq!(patches.len(), 1);
        assert_eq!(
            patches[0].path,
            "/apis/apps/v1/namespaces/hub-of-hubs/deployments/manager"
        );
        assert!(patches[0].query.contains("fieldManager=hub-of-hubs-operator"));
    }
}
