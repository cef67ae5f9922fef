// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Cluster CRUD for manifest documents.
//!
//! Assets are written to the cluster as dynamic (untyped) objects. The
//! catalog is fixed, so the kind-to-API mapping is a static table rather
//! than runtime discovery. Updates are read-modify-write: the live object is
//! fetched first, server-managed fields are retained, then a replace is
//! issued. "Not found" on get and delete is an expected transition, never an
//! error.

use crate::constants::{API_GROUP_VERSION, KIND_GATEKEEPER};
use crate::crd::Gatekeeper;
use crate::manifest::ManifestDocument;
use crate::metrics::record_cluster_operation;
use anyhow::{bail, Context as _, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::{DeleteParams, DynamicObject, PostParams};
use kube::core::{ApiResource, GroupVersionKind};
use kube::{Api, Client, ResourceExt};
use serde_json::Value;
use tracing::{debug, info};

/// One row of the fixed kind-to-API table.
struct KnownKind {
    kind: &'static str,
    group: &'static str,
    version: &'static str,
    plural: &'static str,
    namespaced: bool,
}

/// Every kind present in the embedded catalog.
static KNOWN_KINDS: &[KnownKind] = &[
    KnownKind {
        kind: "Namespace",
        group: "",
        version: "v1",
        plural: "namespaces",
        namespaced: false,
    },
    KnownKind {
        kind: "CustomResourceDefinition",
        group: "apiextensions.k8s.io",
        version: "v1",
        plural: "customresourcedefinitions",
        namespaced: false,
    },
    KnownKind {
        kind: "Deployment",
        group: "apps",
        version: "v1",
        plural: "deployments",
        namespaced: true,
    },
    KnownKind {
        kind: "ClusterRole",
        group: "rbac.authorization.k8s.io",
        version: "v1",
        plural: "clusterroles",
        namespaced: false,
    },
    KnownKind {
        kind: "ClusterRoleBinding",
        group: "rbac.authorization.k8s.io",
        version: "v1",
        plural: "clusterrolebindings",
        namespaced: false,
    },
    KnownKind {
        kind: "Role",
        group: "rbac.authorization.k8s.io",
        version: "v1",
        plural: "roles",
        namespaced: true,
    },
    KnownKind {
        kind: "RoleBinding",
        group: "rbac.authorization.k8s.io",
        version: "v1",
        plural: "rolebindings",
        namespaced: true,
    },
    KnownKind {
        kind: "Secret",
        group: "",
        version: "v1",
        plural: "secrets",
        namespaced: true,
    },
    KnownKind {
        kind: "Service",
        group: "",
        version: "v1",
        plural: "services",
        namespaced: true,
    },
    KnownKind {
        kind: "ServiceAccount",
        group: "",
        version: "v1",
        plural: "serviceaccounts",
        namespaced: true,
    },
    KnownKind {
        kind: "ValidatingWebhookConfiguration",
        group: "admissionregistration.k8s.io",
        version: "v1",
        plural: "validatingwebhookconfigurations",
        namespaced: false,
    },
    KnownKind {
        kind: "MutatingWebhookConfiguration",
        group: "admissionregistration.k8s.io",
        version: "v1",
        plural: "mutatingwebhookconfigurations",
        namespaced: false,
    },
    KnownKind {
        kind: "PodSecurityPolicy",
        group: "policy",
        version: "v1beta1",
        plural: "podsecuritypolicies",
        namespaced: false,
    },
];

/// Whether a catalog kind is namespaced.
///
/// # Errors
///
/// Returns an error for a kind missing from the table.
pub fn is_namespaced_kind(kind: &str) -> Result<bool> {
    let known = lookup_kind(kind)?;
    Ok(known.namespaced)
}

fn lookup_kind(kind: &str) -> Result<&'static KnownKind> {
    KNOWN_KINDS
        .iter()
        .find(|known| known.kind == kind)
        .with_context(|| format!("kind '{kind}' is not in the known-kind table"))
}

/// Build a dynamic API handle for the document's kind and namespace.
fn api_for(client: &Client, doc: &ManifestDocument) -> Result<Api<DynamicObject>> {
    let kind = doc.kind()?;
    let known = lookup_kind(&kind)?;
    let gvk = GroupVersionKind::gvk(known.group, known.version, known.kind);
    let resource = ApiResource::from_gvk_with_plural(&gvk, known.plural);
    if known.namespaced {
        let namespace = doc
            .namespace()
            .with_context(|| format!("namespaced kind '{kind}' has no metadata.namespace"))?;
        Ok(Api::namespaced_with(client.clone(), &namespace, &resource))
    } else {
        Ok(Api::all_with(client.clone(), &resource))
    }
}

fn to_dynamic(doc: &ManifestDocument) -> Result<DynamicObject> {
    serde_json::from_value(doc.as_value().clone())
        .with_context(|| format!("asset '{}' is not a valid cluster object", doc.asset()))
}

fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(api_err) if api_err.code == 404)
}

/// Controller owner reference pointing at the governing `Gatekeeper`.
///
/// Every managed object carries this reference so cluster garbage collection
/// removes the installation when the custom resource is deleted.
#[must_use]
pub fn owner_reference(gatekeeper: &Gatekeeper) -> OwnerReference {
    OwnerReference {
        api_version: API_GROUP_VERSION.to_string(),
        kind: KIND_GATEKEEPER.to_string(),
        name: gatekeeper.name_any(),
        uid: gatekeeper.metadata.uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// Copy server-managed fields from the live object into the desired one.
///
/// The resource version is always carried forward (the API server rejects
/// updates without a current one). For Services, a live cluster IP is copied
/// into a desired spec that leaves it unset; allocated cluster IPs are
/// immutable and must not be dropped on update. This is deliberately a short
/// whitelist, not a deep merge — every other field is owned by the catalog
/// and overwritten each pass.
pub fn retain_cluster_fields(desired: &mut DynamicObject, live: &DynamicObject) {
    desired
        .metadata
        .resource_version
        .clone_from(&live.metadata.resource_version);

    if desired.types.as_ref().map(|t| t.kind.as_str()) == Some("Service") {
        let live_cluster_ip = live
            .data
            .pointer("/spec/clusterIP")
            .and_then(Value::as_str)
            .map(str::to_string);
        let desired_unset = desired
            .data
            .pointer("/spec/clusterIP")
            .and_then(Value::as_str)
            .is_none_or(str::is_empty);
        if let (Some(cluster_ip), true) = (live_cluster_ip, desired_unset) {
            if let Some(spec) = desired
                .data
                .pointer_mut("/spec")
                .and_then(Value::as_object_mut)
            {
                spec.insert("clusterIP".to_string(), Value::String(cluster_ip));
            }
        }
    }
}

/// Create or update the cluster object described by `doc`.
///
/// The live object is fetched first; if present, server fields are retained
/// and a replace is issued, otherwise the object is created. Both paths stamp
/// the controller owner reference before writing.
///
/// # Errors
///
/// Propagates any cluster API error other than "not found" on the initial
/// get, wrapped with the object's identity.
pub async fn upsert(client: &Client, doc: &ManifestDocument, owner: &Gatekeeper) -> Result<()> {
    let api = api_for(client, doc)?;
    let mut desired = to_dynamic(doc)?;
    desired.metadata.owner_references = Some(vec![owner_reference(owner)]);

    let kind = doc.kind()?;
    let name = doc.name()?;

    let live = match api.get(&name).await {
        Ok(live) => Some(live),
        Err(err) if is_not_found(&err) => None,
        Err(err) => {
            return Err(err).with_context(|| format!("failed to fetch {kind} '{name}'"));
        }
    };

    match live {
        Some(live) => {
            retain_cluster_fields(&mut desired, &live);
            debug!(kind = %kind, name = %name, "Updating existing object");
            api.replace(&name, &PostParams::default(), &desired)
                .await
                .with_context(|| format!("failed to update {kind} '{name}'"))?;
            record_cluster_operation(&kind, "update");
            info!("Updated {} '{}'", kind, name);
        }
        None => {
            debug!(kind = %kind, name = %name, "Creating object");
            api.create(&PostParams::default(), &desired)
                .await
                .with_context(|| format!("failed to create {kind} '{name}'"))?;
            record_cluster_operation(&kind, "create");
            info!("Created {} '{}'", kind, name);
        }
    }

    Ok(())
}

/// Delete the cluster object described by `doc`. Already-absent objects are
/// treated as success.
///
/// # Errors
///
/// Propagates any cluster API error other than "not found".
pub async fn delete(client: &Client, doc: &ManifestDocument) -> Result<()> {
    let api = api_for(client, doc)?;
    let kind = doc.kind()?;
    let name = doc.name()?;

    match api.delete(&name, &DeleteParams::default()).await {
        Ok(_) => {
            record_cluster_operation(&kind, "delete");
            info!("Deleted {} '{}'", kind, name);
            Ok(())
        }
        Err(err) if is_not_found(&err) => {
            debug!(kind = %kind, name = %name, "Object already absent, nothing to delete");
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("failed to delete {kind} '{name}'")),
    }
}

/// Fetch the live object for `doc`, if any.
///
/// # Errors
///
/// Propagates any cluster API error other than "not found".
pub async fn fetch(client: &Client, doc: &ManifestDocument) -> Result<Option<DynamicObject>> {
    let api = api_for(client, doc)?;
    let name = doc.name()?;
    match api.get(&name).await {
        Ok(live) => Ok(Some(live)),
        Err(err) if is_not_found(&err) => Ok(None),
        Err(err) => {
            let kind = doc.kind()?;
            Err(err).with_context(|| format!("failed to fetch {kind} '{name}'"))
        }
    }
}

/// Verify the table covers every kind the catalog ships. Exposed for tests.
///
/// # Errors
///
/// Returns an error naming the first uncovered kind.
pub fn verify_catalog_coverage(kinds: &[String]) -> Result<()> {
    for kind in kinds {
        if lookup_kind(kind).is_err() {
            bail!("catalog kind '{kind}' is missing from the known-kind table");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod resources_tests;
