// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types served by or consumed from the hub cluster.

pub mod agent_config;
pub mod config;
pub mod managed_cluster;
