// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use kube::{discovery::Discovery, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

const CLUSTER_GROUP: &str = "cluster.open-cluster-management.io";

/// Wait for the ManagedCluster CRD to become available in the cluster.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
pub async fn wait_for_managed_cluster_crd(client: &Client) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match check_managed_cluster_crd_exists(client).await {
            Ok(true) => {
                info!("ManagedCluster CRD ({}/v1) is available", CLUSTER_GROUP);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "ManagedCluster CRD ({}/v1) not yet available, waiting {} seconds...",
                    CLUSTER_GROUP, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for ManagedCluster CRD: {}, retrying in {} seconds...",
                    e, interval
                );
            }
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Check if the ManagedCluster CRD exists by attempting to discover it.
async fn check_managed_cluster_crd_exists(client: &Client) -> Result<bool> {
    let discovery = Discovery::new(client.clone())
        .filter(&[CLUSTER_GROUP])
        .run()
        .await?;

    for group in discovery.groups() {
        if group.name() == CLUSTER_GROUP {
            for (ar, _) in group.recommended_resources() {
                if ar.kind == "ManagedCluster" && ar.version == "v1" {
                    return Ok(true);
                }
            }
        }
    }

    Ok(false)
}
