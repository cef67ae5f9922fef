// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Per-asset override rules.
//!
//! Each reconciliation loads a fresh copy of every selected asset and runs it
//! through [`apply_overrides`], which dispatches on the asset's catalog name.
//! Deployment assets run a fixed, ordered list of named rules; the remaining
//! kinds get their own small rule sets (webhook entry mutation, RBAC rule
//! pruning, subject and namespace rewriting).
//!
//! Invariants shared by every rule:
//!
//! - A spec field left unset is a no-op. Rules never clear a manifest value
//!   because the caller did not provide one.
//! - Rules are idempotent. Applying the same spec twice yields the same
//!   document, which the driver relies on across requeues.
//! - Collections read out of the document are written back whole after
//!   mutation.

use crate::args::upsert_arg;
use crate::assets;
use crate::constants::{
    AUDIT_CHUNK_SIZE_ARG, AUDIT_FROM_CACHE_ARG, AUDIT_INTERVAL_ARG,
    CONSTRAINT_VIOLATIONS_LIMIT_ARG, EMIT_ADMISSION_EVENTS_ARG, EMIT_AUDIT_EVENTS_ARG,
    ENABLE_MUTATION_ARG, EXEMPT_NAMESPACE_ARG, LOG_LEVEL_ARG, MANAGER_CONTAINER_NAME,
    MUTATING_WEBHOOK_CONFIGURATION_NAME, MUTATION_API_GROUP, MUTATION_WEBHOOK_NAME,
    VALIDATION_WEBHOOK_NAME,
};
use crate::crd::{FailurePolicyMode, GatekeeperSpec, LogLevelMode};
use crate::duration::parse_duration_seconds;
use crate::manifest::{FieldError, JsonObject, ManifestDocument};
use serde_json::Value;
use tracing::debug;

const CONTAINERS_PATH: [&str; 4] = ["spec", "template", "spec", "containers"];
const WEBHOOKS_PATH: [&str; 1] = ["webhooks"];
const RULES_PATH: [&str; 1] = ["rules"];
const SUBJECTS_PATH: [&str; 1] = ["subjects"];

/// Per-pass inputs to the override engine that do not come from the spec.
#[derive(Debug, Clone)]
pub struct OverrideContext {
    /// Namespace the Gatekeeper components are installed into.
    pub namespace: String,

    /// True while the webhook Deployment has not reported all replicas
    /// ready. Forces the enforcement webhook failure policy to `Ignore` so a
    /// half-rolled-out webhook cannot block all admission requests.
    pub webhook_deployment_pending: bool,
}

/// A single named override rule for a Deployment asset.
struct DeploymentRule {
    name: &'static str,
    apply: fn(&mut ManifestDocument, &GatekeeperSpec, &OverrideContext) -> Result<(), FieldError>,
}

/// Rules applied to the audit Deployment, in order.
static AUDIT_DEPLOYMENT_RULES: &[DeploymentRule] = &[
    DeploymentRule {
        name: "audit-replicas",
        apply: |doc, spec, _| {
            match spec.audit.as_ref().and_then(|a| a.replicas) {
                Some(replicas) => doc.set_i64(i64::from(replicas), &["spec", "replicas"]),
                None => Ok(()),
            }
        },
    },
    DeploymentRule {
        name: "image",
        apply: |doc, spec, _| apply_image(doc, spec),
    },
    DeploymentRule {
        name: "pod-placement",
        apply: |doc, spec, _| apply_pod_placement(doc, spec),
    },
    DeploymentRule {
        name: "audit-resources",
        apply: |doc, spec, _| {
            match spec.audit.as_ref().and_then(|a| a.resources.as_ref()) {
                Some(resources) => {
                    let value = to_json(doc, resources)?;
                    update_manager_container(doc, |container| {
                        container.insert("resources".to_string(), value.clone());
                        Ok(())
                    })
                }
                None => Ok(()),
            }
        },
    },
    DeploymentRule {
        name: "audit-args",
        apply: |doc, spec, _| apply_audit_args(doc, spec),
    },
];

/// Rules applied to the webhook Deployment, in order.
static WEBHOOK_DEPLOYMENT_RULES: &[DeploymentRule] = &[
    DeploymentRule {
        name: "webhook-replicas",
        apply: |doc, spec, _| {
            match spec.webhook.as_ref().and_then(|w| w.replicas) {
                Some(replicas) => doc.set_i64(i64::from(replicas), &["spec", "replicas"]),
                None => Ok(()),
            }
        },
    },
    DeploymentRule {
        name: "image",
        apply: |doc, spec, _| apply_image(doc, spec),
    },
    DeploymentRule {
        name: "pod-placement",
        apply: |doc, spec, _| apply_pod_placement(doc, spec),
    },
    DeploymentRule {
        name: "webhook-resources",
        apply: |doc, spec, _| {
            match spec.webhook.as_ref().and_then(|w| w.resources.as_ref()) {
                Some(resources) => {
                    let value = to_json(doc, resources)?;
                    update_manager_container(doc, |container| {
                        container.insert("resources".to_string(), value.clone());
                        Ok(())
                    })
                }
                None => Ok(()),
            }
        },
    },
    DeploymentRule {
        name: "webhook-args",
        apply: apply_webhook_args,
    },
];

/// Apply every override relevant to `doc`, dispatched on its catalog name.
///
/// Assets without overridable fields (the CRDs, the PodSecurityPolicy) pass
/// through untouched.
///
/// # Errors
///
/// Returns the first structural error hit; the document may be partially
/// mutated in that case and must be discarded by the caller.
pub fn apply_overrides(
    doc: &mut ManifestDocument,
    spec: &GatekeeperSpec,
    ctx: &OverrideContext,
) -> Result<(), FieldError> {
    match doc.asset() {
        assets::NAMESPACE_ASSET => doc.set_string(&ctx.namespace, &["metadata", "name"]),
        assets::AUDIT_DEPLOYMENT_ASSET => {
            doc.set_string(&ctx.namespace, &["metadata", "namespace"])?;
            run_deployment_rules(doc, spec, ctx, AUDIT_DEPLOYMENT_RULES)
        }
        assets::WEBHOOK_DEPLOYMENT_ASSET => {
            doc.set_string(&ctx.namespace, &["metadata", "namespace"])?;
            run_deployment_rules(doc, spec, ctx, WEBHOOK_DEPLOYMENT_RULES)
        }
        assets::VALIDATING_WEBHOOK_ASSET => {
            apply_webhook_configuration_overrides(doc, spec, ctx, VALIDATION_WEBHOOK_NAME)
        }
        assets::MUTATING_WEBHOOK_ASSET => {
            apply_webhook_configuration_overrides(doc, spec, ctx, MUTATION_WEBHOOK_NAME)
        }
        assets::CLUSTER_ROLE_ASSET => {
            if spec.mutating_webhook_enabled() {
                Ok(())
            } else {
                prune_mutation_rbac_rules(doc)
            }
        }
        assets::CLUSTER_ROLE_BINDING_ASSET => apply_subjects_namespace(doc, &ctx.namespace),
        assets::ROLE_BINDING_ASSET => {
            doc.set_string(&ctx.namespace, &["metadata", "namespace"])?;
            apply_subjects_namespace(doc, &ctx.namespace)
        }
        assets::ROLE_ASSET
        | assets::OPENSHIFT_ROLE_ASSET
        | assets::SERVER_CERT_SECRET_ASSET
        | assets::SERVICE_ACCOUNT_ASSET
        | assets::WEBHOOK_SERVICE_ASSET => {
            doc.set_string(&ctx.namespace, &["metadata", "namespace"])
        }
        _ => Ok(()),
    }
}

fn run_deployment_rules(
    doc: &mut ManifestDocument,
    spec: &GatekeeperSpec,
    ctx: &OverrideContext,
    rules: &[DeploymentRule],
) -> Result<(), FieldError> {
    for rule in rules {
        debug!(asset = %doc.asset(), rule = rule.name, "Applying deployment override");
        (rule.apply)(doc, spec, ctx)?;
    }
    Ok(())
}

// ============================================================================
// Deployment rule bodies
// ============================================================================

fn apply_image(doc: &mut ManifestDocument, spec: &GatekeeperSpec) -> Result<(), FieldError> {
    let Some(image) = spec.image.as_ref() else {
        return Ok(());
    };
    let image_ref = image.image.clone();
    let pull_policy = image.image_pull_policy.clone();
    update_manager_container(doc, |container| {
        if let Some(ref image_ref) = image_ref {
            container.insert("image".to_string(), Value::String(image_ref.clone()));
        }
        if let Some(ref pull_policy) = pull_policy {
            container.insert(
                "imagePullPolicy".to_string(),
                Value::String(pull_policy.clone()),
            );
        }
        Ok(())
    })
}

fn apply_pod_placement(
    doc: &mut ManifestDocument,
    spec: &GatekeeperSpec,
) -> Result<(), FieldError> {
    if let Some(ref affinity) = spec.affinity {
        let value = to_json(doc, affinity)?;
        doc.set(value, &["spec", "template", "spec", "affinity"])?;
    }
    if let Some(ref node_selector) = spec.node_selector {
        let value = to_json(doc, node_selector)?;
        doc.set(value, &["spec", "template", "spec", "nodeSelector"])?;
    }
    if let Some(ref tolerations) = spec.tolerations {
        let value = to_json(doc, tolerations)?;
        doc.set(value, &["spec", "template", "spec", "tolerations"])?;
    }
    if let Some(ref annotations) = spec.pod_annotations {
        let value = to_json(doc, annotations)?;
        doc.set(value, &["spec", "template", "metadata", "annotations"])?;
    }
    Ok(())
}

fn apply_audit_args(doc: &mut ManifestDocument, spec: &GatekeeperSpec) -> Result<(), FieldError> {
    let Some(audit) = spec.audit.clone() else {
        return Ok(());
    };
    let interval_seconds = match audit.audit_interval.as_deref() {
        Some(interval) => {
            Some(
                parse_duration_seconds(interval).map_err(|e| FieldError::TypeMismatch {
                    asset: doc.asset().to_string(),
                    path: format!("spec.audit.auditInterval ({e})"),
                    expected: "duration",
                })?,
            )
        }
        None => None,
    };
    update_manager_args(doc, |args| {
        if let Some(log_level) = audit.log_level {
            upsert_log_level(args, log_level);
        }
        if let Some(seconds) = interval_seconds {
            upsert_arg(args, AUDIT_INTERVAL_ARG, &seconds.to_string());
        }
        if let Some(limit) = audit.constraint_violation_limit {
            upsert_arg(args, CONSTRAINT_VIOLATIONS_LIMIT_ARG, &limit.to_string());
        }
        if let Some(from_cache) = audit.audit_from_cache {
            upsert_arg(args, AUDIT_FROM_CACHE_ARG, from_cache.as_bool_str());
        }
        if let Some(chunk_size) = audit.audit_chunk_size {
            upsert_arg(args, AUDIT_CHUNK_SIZE_ARG, &chunk_size.to_string());
        }
        if let Some(emit) = audit.emit_audit_events {
            upsert_arg(args, EMIT_AUDIT_EVENTS_ARG, emit.as_bool_str());
        }
    })
}

fn apply_webhook_args(
    doc: &mut ManifestDocument,
    spec: &GatekeeperSpec,
    ctx: &OverrideContext,
) -> Result<(), FieldError> {
    let webhook = spec.webhook.clone();
    let mutation_enabled = spec.mutating_webhook_enabled();
    let namespace = ctx.namespace.clone();
    update_manager_args(doc, |args| {
        // The webhook must never review its own namespace.
        upsert_arg(args, EXEMPT_NAMESPACE_ARG, &namespace);
        upsert_arg(
            args,
            ENABLE_MUTATION_ARG,
            if mutation_enabled { "true" } else { "false" },
        );
        if let Some(ref webhook) = webhook {
            if let Some(log_level) = webhook.log_level {
                upsert_log_level(args, log_level);
            }
            if let Some(emit) = webhook.emit_admission_events {
                upsert_arg(args, EMIT_ADMISSION_EVENTS_ARG, emit.as_bool_str());
            }
        }
    })
}

fn upsert_log_level(args: &mut Vec<String>, level: LogLevelMode) {
    upsert_arg(args, LOG_LEVEL_ARG, level.as_str());
}

// ============================================================================
// Webhook configuration overrides
// ============================================================================

/// Rewrite every webhook entry's client-config service namespace, then apply
/// failure policy and namespace selector to the entry named `primary`.
///
/// While the webhook Deployment is pending, the primary entry's failure
/// policy is forced to `Ignore` regardless of the spec.
fn apply_webhook_configuration_overrides(
    doc: &mut ManifestDocument,
    spec: &GatekeeperSpec,
    ctx: &OverrideContext,
    primary: &str,
) -> Result<(), FieldError> {
    let mut webhooks = doc.get_map_slice(&WEBHOOKS_PATH)?;

    let failure_policy = if ctx.webhook_deployment_pending {
        Some(FailurePolicyMode::Ignore)
    } else {
        spec.webhook.as_ref().and_then(|w| w.failure_policy)
    };
    let namespace_selector = spec
        .webhook
        .as_ref()
        .and_then(|w| w.namespace_selector.as_ref());
    let selector_value = match namespace_selector {
        Some(selector) => Some(to_json(doc, selector)?),
        None => None,
    };

    for webhook in &mut webhooks {
        set_nested_string(
            webhook,
            &ctx.namespace,
            &["clientConfig", "service", "namespace"],
            doc.asset(),
        )?;

        let is_primary = webhook.get("name").and_then(Value::as_str) == Some(primary);
        if !is_primary {
            continue;
        }
        if let Some(policy) = failure_policy {
            webhook.insert(
                "failurePolicy".to_string(),
                Value::String(policy.as_str().to_string()),
            );
        }
        if let Some(ref selector) = selector_value {
            webhook.insert("namespaceSelector".to_string(), selector.clone());
        }
    }

    doc.set_map_slice(webhooks, &WEBHOOKS_PATH)
}

// ============================================================================
// RBAC overrides
// ============================================================================

/// Remove the `ClusterRole` rules that grant mutation access.
///
/// Two predicates, each removing at most the first matching rule: one for the
/// mutation API group, one for the named mutating webhook configuration. A
/// manifest with neither rule passes through unchanged.
fn prune_mutation_rbac_rules(doc: &mut ManifestDocument) -> Result<(), FieldError> {
    let mut rules = doc.get_map_slice(&RULES_PATH)?;

    if let Some(index) = rules
        .iter()
        .position(|rule| string_slice_contains(rule, "apiGroups", MUTATION_API_GROUP))
    {
        rules.remove(index);
    }
    if let Some(index) = rules.iter().position(|rule| {
        string_slice_contains(rule, "resourceNames", MUTATING_WEBHOOK_CONFIGURATION_NAME)
    }) {
        rules.remove(index);
    }

    doc.set_map_slice(rules, &RULES_PATH)
}

fn apply_subjects_namespace(
    doc: &mut ManifestDocument,
    namespace: &str,
) -> Result<(), FieldError> {
    let mut subjects = doc.get_map_slice(&SUBJECTS_PATH)?;
    for subject in &mut subjects {
        subject.insert(
            "namespace".to_string(),
            Value::String(namespace.to_string()),
        );
    }
    doc.set_map_slice(subjects, &SUBJECTS_PATH)
}

// ============================================================================
// Helpers
// ============================================================================

/// Run `f` over the manager container and write the containers slice back.
fn update_manager_container<F>(doc: &mut ManifestDocument, mut f: F) -> Result<(), FieldError>
where
    F: FnMut(&mut JsonObject) -> Result<(), FieldError>,
{
    let mut containers = doc.get_map_slice(&CONTAINERS_PATH)?;
    let mut found = false;
    for container in &mut containers {
        if container.get("name").and_then(Value::as_str) == Some(MANAGER_CONTAINER_NAME) {
            found = true;
            f(container)?;
        }
    }
    if !found {
        return Err(FieldError::PathNotFound {
            asset: doc.asset().to_string(),
            path: format!("spec.template.spec.containers[{MANAGER_CONTAINER_NAME}]"),
        });
    }
    doc.set_map_slice(containers, &CONTAINERS_PATH)
}

/// Run `f` over the manager container's argument list and write it back.
fn update_manager_args<F>(doc: &mut ManifestDocument, mut f: F) -> Result<(), FieldError>
where
    F: FnMut(&mut Vec<String>),
{
    let asset = doc.asset().to_string();
    update_manager_container(doc, |container| {
        let mut args = read_string_slice(container, "args", &asset)?;
        f(&mut args);
        container.insert(
            "args".to_string(),
            Value::Array(args.into_iter().map(Value::String).collect()),
        );
        Ok(())
    })
}

fn read_string_slice(
    object: &JsonObject,
    key: &str,
    asset: &str,
) -> Result<Vec<String>, FieldError> {
    let Some(value) = object.get(key) else {
        return Err(FieldError::PathNotFound {
            asset: asset.to_string(),
            path: key.to_string(),
        });
    };
    let items = value.as_array().ok_or_else(|| FieldError::TypeMismatch {
        asset: asset.to_string(),
        path: key.to_string(),
        expected: "string sequence",
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| FieldError::TypeMismatch {
                    asset: asset.to_string(),
                    path: key.to_string(),
                    expected: "string sequence",
                })
        })
        .collect()
}

fn string_slice_contains(object: &JsonObject, key: &str, needle: &str) -> bool {
    object
        .get(key)
        .and_then(Value::as_array)
        .is_some_and(|items| {
            items
                .iter()
                .any(|item| item.as_str() == Some(needle))
        })
}

fn set_nested_string(
    object: &mut JsonObject,
    value: &str,
    path: &[&str],
    asset: &str,
) -> Result<(), FieldError> {
    let mut current = object;
    for (depth, segment) in path.iter().enumerate() {
        if depth == path.len() - 1 {
            current.insert((*segment).to_string(), Value::String(value.to_string()));
            return Ok(());
        }
        current = current
            .get_mut(*segment)
            .ok_or_else(|| FieldError::PathNotFound {
                asset: asset.to_string(),
                path: path[..=depth].join("."),
            })?
            .as_object_mut()
            .ok_or_else(|| FieldError::TypeMismatch {
                asset: asset.to_string(),
                path: path[..=depth].join("."),
                expected: "mapping",
            })?;
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(doc: &ManifestDocument, value: &T) -> Result<Value, FieldError> {
    serde_json::to_value(value).map_err(|e| FieldError::Malformed {
        asset: doc.asset().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[path = "overrides_tests.rs"]
mod overrides_tests;
