// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Reconciliation driver for the `Gatekeeper` resource.
//!
//! One pass walks a fixed sequence: delete the assets disabled by the spec,
//! probe webhook Deployment readiness, apply the foundational assets in
//! catalog order, then apply the webhook configurations. Webhook
//! configurations are applied even while the Deployment is still rolling
//! out, but with the enforcement entry's failure policy forced to `Ignore`,
//! and the pass ends with a requeue so the real policy lands once the
//! rollout finishes.

use crate::assets::{self, select_assets};
use crate::constants::{
    DEPLOYMENT_PENDING_REQUEUE_SECS, GATEKEEPER_CR_NAME, KIND_GATEKEEPER,
};
use crate::context::Context;
use crate::crd::{Condition, Gatekeeper, GatekeeperStatus};
use crate::overrides::{apply_overrides, OverrideContext};
use crate::reconcilers::resources;
use anyhow::Result;
use chrono::Utc;
use kube::api::{Patch, PatchParams};
use kube::{Api, ResourceExt};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Desired state is fully applied; wait for the next spec change.
    Converged,

    /// Desired state is applied provisionally; run again after the delay.
    Requeue(Duration),
}

/// Readiness of the webhook Deployment as observed this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// All desired replicas report ready.
    Ready,

    /// Deployment absent, status unpopulated, or replicas still rolling out.
    Pending,
}

/// Reconcile one `Gatekeeper` resource.
///
/// Resources whose name is not the accepted singleton name are logged and
/// ignored; returning success avoids a requeue storm on misnamed resources.
///
/// # Errors
///
/// Returns an error on structural manifest failures or cluster API errors
/// other than "not found"; the caller requeues with backoff.
pub async fn reconcile_gatekeeper(ctx: &Context, gatekeeper: &Gatekeeper) -> Result<Outcome> {
    let name = gatekeeper.name_any();
    if name != GATEKEEPER_CR_NAME {
        warn!(
            "Ignoring {} '{}': only '{}' is reconciled",
            KIND_GATEKEEPER, name, GATEKEEPER_CR_NAME
        );
        return Ok(Outcome::Converged);
    }

    info!("Reconciling {} '{}'", KIND_GATEKEEPER, name);
    let selection = select_assets(&gatekeeper.spec);
    debug!(
        delete = ?selection.delete,
        apply = ?selection.apply,
        webhook_apply = ?selection.webhook_apply,
        "Computed asset selection"
    );

    // Deletion runs first so a disabled feature's leftovers are gone before
    // the remaining set is applied.
    let delete_ctx = OverrideContext {
        namespace: ctx.namespace.clone(),
        webhook_deployment_pending: false,
    };
    for asset in &selection.delete {
        let mut doc = assets::load(asset)?;
        apply_overrides(&mut doc, &gatekeeper.spec, &delete_ctx)?;
        resources::delete(&ctx.client, &doc).await?;
    }

    let readiness = probe_webhook_deployment(ctx).await?;
    let pending = readiness == Readiness::Pending;
    if pending {
        info!("Webhook Deployment not ready yet, webhook failure policy forced to Ignore");
    }

    let override_ctx = OverrideContext {
        namespace: ctx.namespace.clone(),
        webhook_deployment_pending: pending,
    };

    for asset in &selection.apply {
        let Some(asset) = effective_asset(asset, ctx) else {
            continue;
        };
        let mut doc = assets::load(asset)?;
        apply_overrides(&mut doc, &gatekeeper.spec, &override_ctx)?;
        resources::upsert(&ctx.client, &doc, gatekeeper).await?;
    }

    for asset in &selection.webhook_apply {
        let mut doc = assets::load(asset)?;
        apply_overrides(&mut doc, &gatekeeper.spec, &override_ctx)?;
        resources::upsert(&ctx.client, &doc, gatekeeper).await?;
    }

    let outcome = if pending {
        Outcome::Requeue(Duration::from_secs(DEPLOYMENT_PENDING_REQUEUE_SECS))
    } else {
        Outcome::Converged
    };

    update_status(ctx, gatekeeper, outcome).await?;
    Ok(outcome)
}

/// Resolve platform-specific asset substitutions.
///
/// On plain Kubernetes the operator reuses its own namespace, so the bundled
/// Namespace asset is skipped. On OpenShift the Role asset swaps to the
/// OpenShift catalog variant.
fn effective_asset(asset: &'static str, ctx: &Context) -> Option<&'static str> {
    if asset == assets::NAMESPACE_ASSET && !ctx.platform.is_openshift() {
        return None;
    }
    if asset == assets::ROLE_ASSET && ctx.platform.is_openshift() {
        return Some(assets::OPENSHIFT_ROLE_ASSET);
    }
    Some(asset)
}

/// Fetch the webhook Deployment and evaluate its rollout state.
///
/// An absent Deployment is an expected first-pass transition, not an error.
async fn probe_webhook_deployment(ctx: &Context) -> Result<Readiness> {
    let mut doc = assets::load(assets::WEBHOOK_DEPLOYMENT_ASSET)?;
    doc.set_string(&ctx.namespace, &["metadata", "namespace"])?;

    let Some(live) = resources::fetch(&ctx.client, &doc).await? else {
        debug!("Webhook Deployment not found, treating as pending");
        return Ok(Readiness::Pending);
    };
    Ok(evaluate_deployment_readiness(live.data.get("status")))
}

/// Decide readiness from a Deployment status block.
///
/// `readyReplicas` must be present; `replicas` is read leniently and
/// defaults to zero when absent. Ready means the two are equal.
#[must_use]
pub fn evaluate_deployment_readiness(status: Option<&Value>) -> Readiness {
    let Some(status) = status else {
        return Readiness::Pending;
    };
    let Some(ready_replicas) = status.get("readyReplicas").and_then(Value::as_i64) else {
        return Readiness::Pending;
    };
    let replicas = status.get("replicas").and_then(Value::as_i64).unwrap_or(0);
    if replicas == ready_replicas {
        Readiness::Ready
    } else {
        Readiness::Pending
    }
}

/// Patch the resource status to reflect the pass outcome, skipping the write
/// when nothing changed.
async fn update_status(ctx: &Context, gatekeeper: &Gatekeeper, outcome: Outcome) -> Result<()> {
    let (status, reason, message) = match outcome {
        Outcome::Converged => ("True", "Reconciled", "All assets applied"),
        Outcome::Requeue(_) => (
            "False",
            "RolloutPending",
            "Waiting for the webhook Deployment to become ready",
        ),
    };

    let unchanged = gatekeeper.status.as_ref().is_some_and(|current| {
        current.observed_generation == gatekeeper.metadata.generation
            && current.conditions.first().is_some_and(|condition| {
                condition.r#type == "Ready"
                    && condition.status == status
                    && condition.reason.as_deref() == Some(reason)
            })
    });
    if unchanged {
        return Ok(());
    }

    let new_status = GatekeeperStatus {
        observed_generation: gatekeeper.metadata.generation,
        conditions: vec![Condition {
            r#type: "Ready".to_string(),
            status: status.to_string(),
            reason: Some(reason.to_string()),
            message: Some(message.to_string()),
            last_transition_time: Some(Utc::now().to_rfc3339()),
        }],
    };

    let api: Api<Gatekeeper> = Api::all(ctx.client.clone());
    api.patch_status(
        &gatekeeper.name_any(),
        &PatchParams::default(),
        &Patch::Merge(json!({ "status": new_status })),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
#[path = "gatekeeper_tests.rs"]
mod gatekeeper_tests;
