// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::{Parser, Subcommand};
use kube::Client;
use tracing::{info, warn};

use hoh_operator::config::Settings;
use hoh_operator::constants::DEFAULT_AGENT_NAMESPACE;
use hoh_operator::kubernetes::{create_hub_client, wait_for_managed_cluster_crd};
use hoh_operator::reconcilers::{AgentReconciler, DeployReconciler, PropagatorReconciler};

#[derive(Parser)]
#[command(name = "hub-of-hubs-operator")]
#[command(about = "Operator for hub-of-hubs multi-cluster management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the hub-side manager: deploys components and propagates config
    Manager,

    /// Start the agent inside a managed cluster
    Agent {
        /// Location of kubeconfig file to connect to hub cluster
        #[arg(long)]
        hub_kubeconfig: String,

        /// Name of the managed cluster the agent runs in
        #[arg(long)]
        cluster_name: String,

        /// Installation namespace of the agent
        #[arg(long, default_value = DEFAULT_AGENT_NAMESPACE)]
        addon_namespace: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Manager => run_manager().await,
        Commands::Agent {
            hub_kubeconfig,
            cluster_name,
            addon_namespace,
        } => run_agent(&hub_kubeconfig, cluster_name, &addon_namespace).await,
    }
}

async fn run_manager() -> Result<()> {
    info!("Starting hub-of-hubs-operator manager");

    let settings = Settings::from_env();
    info!("Using operator image {}", settings.operator_image);

    let client = Client::try_default().await?;
    info!("Connected to hub cluster");

    // Propagation cannot start before the cluster manager registered its CRDs
    info!("Waiting for ManagedCluster CRD to become available...");
    wait_for_managed_cluster_crd(&client).await?;

    let deploy_reconciler = DeployReconciler::new(client.clone(), settings);
    let propagator_reconciler = PropagatorReconciler::new(client);

    info!("Starting reconcilers...");

    tokio::try_join!(deploy_reconciler.run(), propagator_reconciler.run())?;

    // This should never be reached as reconcilers run forever
    warn!("All reconcilers stopped unexpectedly");
    Ok(())
}

async fn run_agent(hub_kubeconfig: &str, cluster_name: String, addon_namespace: &str) -> Result<()> {
    info!(
        "Starting hub-of-hubs-operator agent for cluster {} in namespace {}",
        cluster_name, addon_namespace
    );

    let hub_client = create_hub_client(hub_kubeconfig).await?;
    info!("Connected to hub cluster");

    let agent_reconciler = AgentReconciler::new(hub_client, cluster_name);

    info!("Starting reconciler...");

    agent_reconciler.run().await?;

    warn!("Reconciler stopped unexpectedly");
    Ok(())
}
