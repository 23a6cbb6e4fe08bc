// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes labels used by the operator
pub mod labels {
    /// Selector matching the managed clusters config is propagated to
    pub const CLUSTER_SELECTOR: &str = "vendor=OpenShift";
    /// Marks derived AgentConfig objects as owned by the manager
    pub const MANAGED_BY_KEY: &str = "hub-of-hubs.open-cluster-management.io/managed-by";
    pub const MANAGED_BY_VALUE: &str = "hub-of-hubs-operator-manager";
}

/// Finalizers gating deletion until derived resources are cleaned up
pub mod finalizers {
    /// Held on Config objects by the propagator controller
    pub const PROPAGATOR: &str =
        "hubofhubs.open-cluster-management.io/operator-propagator-resources-cleanup";
    /// Held on AgentConfig objects by the agent controller
    pub const AGENT: &str =
        "hubofhubs.open-cluster-management.io/hoh-operator-agent-resources-cleanup";
}

/// The operator name used for server-side apply and event reporting
pub const OPERATOR_NAME: &str = "hub-of-hubs-operator";

/// Registry and tag for the database and manager component images
pub const IMAGE_REGISTRY: &str = "quay.io/open-cluster-management-hub-of-hubs";
pub const IMAGE_TAG: &str = "latest";

/// Operator image used when HUB_OF_HUBS_OPERATOR_IMAGE is not set
pub const DEFAULT_OPERATOR_IMAGE: &str =
    "quay.io/open-cluster-management-hub-of-hubs/hub-of-hubs-operator:latest";

/// Default installation namespace of the agent
pub const DEFAULT_AGENT_NAMESPACE: &str = "open-cluster-management-agent-addon";

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
