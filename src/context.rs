// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Shared context for the Gatekeeper controller.
//!
//! The controller receives an `Arc<Context>` carrying the Kubernetes client,
//! the install namespace, and the detected platform flavor. Platform
//! detection happens once at startup; the reconciler only consumes the
//! result.

use anyhow::Result;
use kube::{Client, Discovery};

/// Cluster flavor the operator is running on.
///
/// On plain Kubernetes the operator reuses its own namespace and skips the
/// bundled Namespace asset; on OpenShift the Namespace asset is applied and
/// the Role asset swaps to the OpenShift catalog variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Kubernetes,
    OpenShift,
}

impl Platform {
    /// True when running on OpenShift.
    #[must_use]
    pub fn is_openshift(self) -> bool {
        matches!(self, Platform::OpenShift)
    }
}

/// Shared context passed to the controller.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// Namespace the Gatekeeper components are installed into
    pub namespace: String,

    /// Detected cluster flavor
    pub platform: Platform,
}

impl Context {
    /// Build a context for the given client and install namespace.
    #[must_use]
    pub fn new(client: Client, namespace: String, platform: Platform) -> Self {
        Self {
            client,
            namespace,
            platform,
        }
    }
}

/// Detect the cluster flavor by probing API group discovery for the
/// OpenShift security API group.
///
/// # Errors
///
/// Returns an error if API discovery itself fails.
pub async fn detect_platform(client: &Client) -> Result<Platform> {
    let discovery = Discovery::new(client.clone()).run().await?;
    let is_openshift = discovery
        .groups()
        .any(|group| group.name() == "security.openshift.io");
    Ok(if is_openshift {
        Platform::OpenShift
    } else {
        Platform::Kubernetes
    })
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
