// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Embedded manifest catalog and asset selection.
//!
//! All manifests the operator manages are compiled into the binary from the
//! `manifests/` directory and addressed by their relative path. The catalog
//! itself is immutable; selection produces fresh lists on every call.
//!
//! Apply ordering is significant: the namespace comes first so namespaced
//! resources have somewhere to land, RBAC and the cert secret precede the
//! Deployments that mount them, and the webhook configurations are applied
//! last, gated on webhook Deployment readiness.

use crate::crd::GatekeeperSpec;
use crate::manifest::ManifestDocument;
use anyhow::{bail, Result};

// ============================================================================
// Catalog Names
// ============================================================================

/// The gatekeeper-system Namespace
pub const NAMESPACE_ASSET: &str = "v1_namespace_gatekeeper-system.yaml";

/// CRD for Assign mutators (mutation feature only)
pub const ASSIGN_CRD_ASSET: &str =
    "apiextensions.k8s.io_v1_customresourcedefinition_assign.mutations.gatekeeper.sh.yaml";

/// CRD for AssignMetadata mutators (mutation feature only)
pub const ASSIGN_METADATA_CRD_ASSET: &str =
    "apiextensions.k8s.io_v1_customresourcedefinition_assignmetadata.mutations.gatekeeper.sh.yaml";

/// CRD for Gatekeeper Configs
pub const CONFIG_CRD_ASSET: &str =
    "apiextensions.k8s.io_v1_customresourcedefinition_configs.config.gatekeeper.sh.yaml";

/// CRD for ConstraintTemplates
pub const CONSTRAINT_TEMPLATE_CRD_ASSET: &str =
    "apiextensions.k8s.io_v1_customresourcedefinition_constrainttemplates.templates.gatekeeper.sh.yaml";

/// Webhook server certificate Secret
pub const SERVER_CERT_SECRET_ASSET: &str = "v1_secret_gatekeeper-webhook-server-cert.yaml";

/// ClusterRole for the Gatekeeper manager
pub const CLUSTER_ROLE_ASSET: &str =
    "rbac.authorization.k8s.io_v1_clusterrole_gatekeeper-manager-role.yaml";

/// ClusterRoleBinding for the Gatekeeper manager
pub const CLUSTER_ROLE_BINDING_ASSET: &str =
    "rbac.authorization.k8s.io_v1_clusterrolebinding_gatekeeper-manager-rolebinding.yaml";

/// Namespaced Role for the Gatekeeper manager
pub const ROLE_ASSET: &str = "rbac.authorization.k8s.io_v1_role_gatekeeper-manager-role.yaml";

/// OpenShift variant of the namespaced Role, substituted on OpenShift
pub const OPENSHIFT_ROLE_ASSET: &str =
    "openshift/rbac.authorization.k8s.io_v1_role_gatekeeper-manager-role.yaml";

/// RoleBinding for the Gatekeeper manager
pub const ROLE_BINDING_ASSET: &str =
    "rbac.authorization.k8s.io_v1_rolebinding_gatekeeper-manager-rolebinding.yaml";

/// ServiceAccount the Deployments run as
pub const SERVICE_ACCOUNT_ASSET: &str = "v1_serviceaccount_gatekeeper-admin.yaml";

/// PodSecurityPolicy for the Gatekeeper pods
pub const POD_SECURITY_POLICY_ASSET: &str = "policy_v1beta1_podsecuritypolicy_gatekeeper-admin.yaml";

/// The audit Deployment
pub const AUDIT_DEPLOYMENT_ASSET: &str = "apps_v1_deployment_gatekeeper-audit.yaml";

/// The webhook (controller-manager) Deployment
pub const WEBHOOK_DEPLOYMENT_ASSET: &str = "apps_v1_deployment_gatekeeper-controller-manager.yaml";

/// Service in front of the webhook server
pub const WEBHOOK_SERVICE_ASSET: &str = "v1_service_gatekeeper-webhook-service.yaml";

/// The validating webhook configuration
pub const VALIDATING_WEBHOOK_ASSET: &str =
    "admissionregistration.k8s.io_v1_validatingwebhookconfiguration_gatekeeper-validating-webhook-configuration.yaml";

/// The mutating webhook configuration
pub const MUTATING_WEBHOOK_ASSET: &str =
    "admissionregistration.k8s.io_v1_mutatingwebhookconfiguration_gatekeeper-mutating-webhook-configuration.yaml";

/// Catalog of embedded manifest bytes, keyed by relative path.
static CATALOG: &[(&str, &str)] = &[
    (
        NAMESPACE_ASSET,
        include_str!("../manifests/v1_namespace_gatekeeper-system.yaml"),
    ),
    (
        ASSIGN_CRD_ASSET,
        include_str!(
            "../manifests/apiextensions.k8s.io_v1_customresourcedefinition_assign.mutations.gatekeeper.sh.yaml"
        ),
    ),
    (
        ASSIGN_METADATA_CRD_ASSET,
        include_str!(
            "../manifests/apiextensions.k8s.io_v1_customresourcedefinition_assignmetadata.mutations.gatekeeper.sh.yaml"
        ),
    ),
    (
        CONFIG_CRD_ASSET,
        include_str!(
            "../manifests/apiextensions.k8s.io_v1_customresourcedefinition_configs.config.gatekeeper.sh.yaml"
        ),
    ),
    (
        CONSTRAINT_TEMPLATE_CRD_ASSET,
        include_str!(
            "../manifests/apiextensions.k8s.io_v1_customresourcedefinition_constrainttemplates.templates.gatekeeper.sh.yaml"
        ),
    ),
    (
        SERVER_CERT_SECRET_ASSET,
        include_str!("../manifests/v1_secret_gatekeeper-webhook-server-cert.yaml"),
    ),
    (
        CLUSTER_ROLE_ASSET,
        include_str!(
            "../manifests/rbac.authorization.k8s.io_v1_clusterrole_gatekeeper-manager-role.yaml"
        ),
    ),
    (
        CLUSTER_ROLE_BINDING_ASSET,
        include_str!(
            "../manifests/rbac.authorization.k8s.io_v1_clusterrolebinding_gatekeeper-manager-rolebinding.yaml"
        ),
    ),
    (
        ROLE_ASSET,
        include_str!("../manifests/rbac.authorization.k8s.io_v1_role_gatekeeper-manager-role.yaml"),
    ),
    (
        OPENSHIFT_ROLE_ASSET,
        include_str!(
            "../manifests/openshift/rbac.authorization.k8s.io_v1_role_gatekeeper-manager-role.yaml"
        ),
    ),
    (
        ROLE_BINDING_ASSET,
        include_str!(
            "../manifests/rbac.authorization.k8s.io_v1_rolebinding_gatekeeper-manager-rolebinding.yaml"
        ),
    ),
    (
        SERVICE_ACCOUNT_ASSET,
        include_str!("../manifests/v1_serviceaccount_gatekeeper-admin.yaml"),
    ),
    (
        POD_SECURITY_POLICY_ASSET,
        include_str!("../manifests/policy_v1beta1_podsecuritypolicy_gatekeeper-admin.yaml"),
    ),
    (
        AUDIT_DEPLOYMENT_ASSET,
        include_str!("../manifests/apps_v1_deployment_gatekeeper-audit.yaml"),
    ),
    (
        WEBHOOK_DEPLOYMENT_ASSET,
        include_str!("../manifests/apps_v1_deployment_gatekeeper-controller-manager.yaml"),
    ),
    (
        WEBHOOK_SERVICE_ASSET,
        include_str!("../manifests/v1_service_gatekeeper-webhook-service.yaml"),
    ),
    (
        VALIDATING_WEBHOOK_ASSET,
        include_str!(
            "../manifests/admissionregistration.k8s.io_v1_validatingwebhookconfiguration_gatekeeper-validating-webhook-configuration.yaml"
        ),
    ),
    (
        MUTATING_WEBHOOK_ASSET,
        include_str!(
            "../manifests/admissionregistration.k8s.io_v1_mutatingwebhookconfiguration_gatekeeper-mutating-webhook-configuration.yaml"
        ),
    ),
];

/// Fixed apply order for foundational (non-webhook-configuration) assets.
static ORDERED_FOUNDATIONAL_ASSETS: &[&str] = &[
    NAMESPACE_ASSET,
    ASSIGN_CRD_ASSET,
    ASSIGN_METADATA_CRD_ASSET,
    CONFIG_CRD_ASSET,
    CONSTRAINT_TEMPLATE_CRD_ASSET,
    SERVER_CERT_SECRET_ASSET,
    CLUSTER_ROLE_ASSET,
    CLUSTER_ROLE_BINDING_ASSET,
    ROLE_ASSET,
    ROLE_BINDING_ASSET,
    SERVICE_ACCOUNT_ASSET,
    POD_SECURITY_POLICY_ASSET,
    AUDIT_DEPLOYMENT_ASSET,
    WEBHOOK_DEPLOYMENT_ASSET,
    WEBHOOK_SERVICE_ASSET,
];

/// Fixed apply order for the gated webhook-configuration assets.
static ORDERED_WEBHOOK_ASSETS: &[&str] = &[VALIDATING_WEBHOOK_ASSET, MUTATING_WEBHOOK_ASSET];

/// Load an asset from the embedded catalog as a fresh document.
///
/// # Errors
///
/// Returns an error if `asset` is not a catalog name or its bytes are not a
/// well-formed YAML mapping.
pub fn load(asset: &str) -> Result<ManifestDocument> {
    let Some((_, yaml)) = CATALOG.iter().find(|(name, _)| *name == asset) else {
        bail!("asset '{asset}' is not in the embedded catalog");
    };
    Ok(ManifestDocument::from_yaml(asset, yaml)?)
}

/// All catalog names, in no particular order. Exposed for tests.
#[must_use]
pub fn catalog_names() -> Vec<&'static str> {
    CATALOG.iter().map(|(name, _)| *name).collect()
}

/// Partition of the catalog into delete and apply lists for one
/// reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSelection {
    /// Assets whose cluster objects must be removed.
    pub delete: Vec<&'static str>,

    /// Foundational assets to apply, in order.
    pub apply: Vec<&'static str>,

    /// Webhook-configuration assets to apply after the readiness gate,
    /// in order.
    pub webhook_apply: Vec<&'static str>,
}

/// Compute the asset partition for the given spec.
///
/// Both toggles are evaluated independently; each targets disjoint asset
/// names, so the delete list cannot accumulate duplicates.
#[must_use]
pub fn select_assets(spec: &GatekeeperSpec) -> AssetSelection {
    let mut delete: Vec<&'static str> = Vec::new();
    let mut apply: Vec<&'static str> = ORDERED_FOUNDATIONAL_ASSETS.to_vec();
    let mut webhook_apply: Vec<&'static str> = ORDERED_WEBHOOK_ASSETS.to_vec();

    if !spec.validating_webhook_enabled() {
        webhook_apply.retain(|asset| *asset != VALIDATING_WEBHOOK_ASSET);
        delete.push(VALIDATING_WEBHOOK_ASSET);
    }

    if !spec.mutating_webhook_enabled() {
        apply.retain(|asset| *asset != ASSIGN_CRD_ASSET && *asset != ASSIGN_METADATA_CRD_ASSET);
        webhook_apply.retain(|asset| *asset != MUTATING_WEBHOOK_ASSET);
        delete.push(ASSIGN_CRD_ASSET);
        delete.push(ASSIGN_METADATA_CRD_ASSET);
        delete.push(MUTATING_WEBHOOK_ASSET);
    }

    AssetSelection {
        delete,
        apply,
        webhook_apply,
    }
}

#[cfg(test)]
#[path = "assets_tests.rs"]
mod assets_tests;
