// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Manifest rendering failed: {0}")]
    RenderError(String),

    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),
}

pub type Result<T> = std::result::Result<T, OperatorError>;
