// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes reconcilers that react to watch events.

pub mod agent;
pub mod finalizer;
pub mod manager;
pub mod propagator;

pub use agent::AgentReconciler;
pub use manager::DeployReconciler;
pub use propagator::PropagatorReconciler;
