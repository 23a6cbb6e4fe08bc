// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Hub cluster client creation from a kubeconfig file

use crate::error::{OperatorError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use tracing::info;

/// Create a Kubernetes client for the hub cluster from a kubeconfig file.
/// The agent receives this file mounted into its pod at registration time.
pub async fn create_hub_client(kubeconfig_path: &str) -> Result<Client> {
    info!("Creating hub client from kubeconfig '{}'", kubeconfig_path);

    let kubeconfig = Kubeconfig::read_from(kubeconfig_path).map_err(|e| {
        OperatorError::KubeconfigError(format!(
            "Failed to read kubeconfig {}: {}",
            kubeconfig_path, e
        ))
    })?;

    let client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                OperatorError::KubeconfigError(format!("Failed to create config: {}", e))
            })?;

    Client::try_from(client_config)
        .map_err(|e| OperatorError::KubeconfigError(format!("Failed to create client: {}", e)))
}
