// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `resources.rs`

use super::*;
use crate::assets;
use crate::crd::GatekeeperSpec;
use serde_json::json;

fn dynamic(value: Value) -> DynamicObject {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_known_kind_table_covers_the_catalog() {
    let kinds: Vec<String> = assets::catalog_names()
        .iter()
        .map(|name| assets::load(name).unwrap().kind().unwrap())
        .collect();
    verify_catalog_coverage(&kinds).unwrap();
}

#[test]
fn test_is_namespaced_kind() {
    assert!(is_namespaced_kind("Deployment").unwrap());
    assert!(is_namespaced_kind("Secret").unwrap());
    assert!(!is_namespaced_kind("ClusterRole").unwrap());
    assert!(!is_namespaced_kind("ValidatingWebhookConfiguration").unwrap());
    assert!(is_namespaced_kind("StatefulSet").is_err());
}

#[test]
fn test_owner_reference_marks_the_gatekeeper_as_controller() {
    let mut gatekeeper = Gatekeeper::new("gatekeeper", GatekeeperSpec::default());
    gatekeeper.metadata.uid = Some("abc-123".to_string());

    let reference = owner_reference(&gatekeeper);
    assert_eq!(reference.api_version, "operator.gatekeeper.sh/v1alpha1");
    assert_eq!(reference.kind, "Gatekeeper");
    assert_eq!(reference.name, "gatekeeper");
    assert_eq!(reference.uid, "abc-123");
    assert_eq!(reference.controller, Some(true));
    assert_eq!(reference.block_owner_deletion, Some(true));
}

#[test]
fn test_retain_copies_resource_version_from_live() {
    let mut desired = dynamic(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": "gatekeeper-audit", "namespace": "ns"},
    }));
    let live = dynamic(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": "gatekeeper-audit", "namespace": "ns", "resourceVersion": "42"},
    }));

    retain_cluster_fields(&mut desired, &live);
    assert_eq!(desired.metadata.resource_version.as_deref(), Some("42"));
}

#[test]
fn test_retain_copies_allocated_cluster_ip_into_unset_service_spec() {
    let mut desired = dynamic(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {"name": "gatekeeper-webhook-service", "namespace": "ns"},
        "spec": {"ports": [{"port": 443}]},
    }));
    let live = dynamic(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {"name": "gatekeeper-webhook-service", "namespace": "ns", "resourceVersion": "7"},
        "spec": {"clusterIP": "10.0.0.5"},
    }));

    retain_cluster_fields(&mut desired, &live);
    assert_eq!(
        desired.data.pointer("/spec/clusterIP").and_then(Value::as_str),
        Some("10.0.0.5")
    );
}

#[test]
fn test_retain_keeps_an_explicitly_requested_cluster_ip() {
    let mut desired = dynamic(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {"name": "svc", "namespace": "ns"},
        "spec": {"clusterIP": "10.0.0.7"},
    }));
    let live = dynamic(json!({
        "apiVersion": "v1",
        "kind": "Service",
        "metadata": {"name": "svc", "namespace": "ns"},
        "spec": {"clusterIP": "10.0.0.5"},
    }));

    retain_cluster_fields(&mut desired, &live);
    assert_eq!(
        desired.data.pointer("/spec/clusterIP").and_then(Value::as_str),
        Some("10.0.0.7")
    );
}

#[test]
fn test_retain_does_not_touch_cluster_ip_on_other_kinds() {
    let mut desired = dynamic(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": "d", "namespace": "ns"},
        "spec": {},
    }));
    let live = dynamic(json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": "d", "namespace": "ns"},
        "spec": {"clusterIP": "10.0.0.5"},
    }));

    retain_cluster_fields(&mut desired, &live);
    assert!(desired.data.pointer("/spec/clusterIP").is_none());
}
