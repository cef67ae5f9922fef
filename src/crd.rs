// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Custom Resource Definition for the Gatekeeper operator.
//!
//! This module defines the cluster-scoped [`Gatekeeper`] resource. A single
//! instance (named `gatekeeper`) describes the desired configuration of a
//! Gatekeeper installation: replica counts for the audit and webhook
//! Deployments, image overrides, node placement, audit tuning, and the two
//! webhook enablement toggles.
//!
//! Every field is optional. An unset field means "keep the default shipped in
//! the embedded manifest" — the override engine never clears a manifest value
//! because the spec left it out.
//!
//! # Example
//!
//! ```rust,no_run
//! use gatekeeper_operator::crd::{AuditConfig, GatekeeperSpec, LogLevelMode};
//!
//! let spec = GatekeeperSpec {
//!     audit: Some(AuditConfig {
//!         replicas: Some(2),
//!         log_level: Some(LogLevelMode::Info),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//! ```

use k8s_openapi::api::core::v1::{Affinity, ResourceRequirements, Toleration};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Desired configuration of a Gatekeeper installation.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "operator.gatekeeper.sh",
    version = "v1alpha1",
    kind = "Gatekeeper",
    status = "GatekeeperStatus",
    shortname = "gk"
)]
#[serde(rename_all = "camelCase")]
pub struct GatekeeperSpec {
    /// Image repository, tag, and pull policy for both Deployments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageConfig>,

    /// Audit Deployment configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditConfig>,

    /// Webhook (controller-manager) Deployment configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookConfig>,

    /// Enablement of the validating admission webhook. Defaults to Enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validating_webhook: Option<Mode>,

    /// Enablement of the mutating admission webhook. Defaults to Disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutating_webhook: Option<Mode>,

    /// Node selector applied to both Deployment pod templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    /// Affinity applied to both Deployment pod templates. Replaces the
    /// shipped default (the webhook Deployment ships with pod anti-affinity).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,

    /// Tolerations applied to both Deployment pod templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,

    /// Annotations applied to both Deployment pod templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_annotations: Option<BTreeMap<String, String>>,
}

impl GatekeeperSpec {
    /// Whether the validating webhook should be installed. Unset means enabled.
    #[must_use]
    pub fn validating_webhook_enabled(&self) -> bool {
        !matches!(self.validating_webhook, Some(Mode::Disabled))
    }

    /// Whether the mutating webhook should be installed. Unset means disabled.
    #[must_use]
    pub fn mutating_webhook_enabled(&self) -> bool {
        matches!(self.mutating_webhook, Some(Mode::Enabled))
    }
}

/// Container image configuration shared by both Deployments.
///
/// `image` and `image_pull_policy` are independent; either may be set without
/// the other.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// Full image reference (repository and tag), e.g.
    /// `openpolicyagent/gatekeeper:v3.5.2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Image pull policy: `Always`, `IfNotPresent`, or `Never`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
}

/// Audit Deployment configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditConfig {
    /// Number of audit replicas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Interval between audit runs, as a Go-style duration string
    /// (e.g. `60s`, `5m`, `1h`). Rounded to whole seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_interval: Option<String>,

    /// Upper bound on the number of reported constraint violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_violation_limit: Option<u64>,

    /// Audit from the informer cache instead of live API reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_from_cache: Option<Mode>,

    /// Page size for audit list requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_chunk_size: Option<u64>,

    /// Log verbosity of the audit manager.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevelMode>,

    /// Emit Kubernetes events for audit violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_audit_events: Option<Mode>,

    /// Resource requests and limits for the audit manager container.
    /// Replaces the shipped block wholesale when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
}

/// Webhook (controller-manager) Deployment configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    /// Number of webhook replicas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Log verbosity of the webhook manager.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevelMode>,

    /// Emit Kubernetes events for admission violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_admission_events: Option<Mode>,

    /// Failure policy of the enforcement webhook entry. Forced to `Ignore`
    /// while the webhook Deployment is still rolling out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_policy: Option<FailurePolicyMode>,

    /// Namespace selector of the enforcement webhook entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,

    /// Resource requests and limits for the webhook manager container.
    /// Replaces the shipped block wholesale when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
}

/// Two-state feature toggle used for webhook enablement, cache-based audit,
/// and event emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Mode {
    Enabled,
    Disabled,
}

impl Mode {
    /// Literal `"true"` / `"false"` rendering used for boolean-valued
    /// container arguments.
    #[must_use]
    pub fn as_bool_str(self) -> &'static str {
        match self {
            Mode::Enabled => "true",
            Mode::Disabled => "false",
        }
    }
}

/// Log verbosity accepted by the Gatekeeper manager binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevelMode {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevelMode {
    /// Value rendered into the `--log-level` argument.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevelMode::Debug => "DEBUG",
            LogLevelMode::Info => "INFO",
            LogLevelMode::Warning => "WARNING",
            LogLevelMode::Error => "ERROR",
        }
    }
}

/// Admission webhook failure policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FailurePolicyMode {
    Ignore,
    Fail,
}

impl FailurePolicyMode {
    /// Value written into the webhook entry's `failurePolicy` field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailurePolicyMode::Ignore => "Ignore",
            FailurePolicyMode::Fail => "Fail",
        }
    }
}

/// Observed state of a `Gatekeeper` resource.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatekeeperStatus {
    /// Generation of the spec that was last fully reconciled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Latest observed conditions.
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// A single status condition.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type, e.g. `Ready`.
    pub r#type: String,

    /// Condition status: `True`, `False`, or `Unknown`.
    pub status: String,

    /// Machine-readable reason for the last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message for the last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// RFC 3339 timestamp of the last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
