// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `manifest.rs`

use super::*;
use serde_json::json;

fn sample_document() -> ManifestDocument {
    ManifestDocument::from_value(
        "sample.yaml",
        json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {
                "name": "gatekeeper-audit",
                "namespace": "gatekeeper-system",
            },
            "spec": {
                "replicas": 1,
                "template": {
                    "spec": {
                        "containers": [
                            {"name": "manager", "args": ["--operation=audit"]},
                        ],
                    },
                },
            },
        }),
    )
}

#[test]
fn test_from_yaml_parses_mapping() {
    let doc = ManifestDocument::from_yaml("a.yaml", "kind: Namespace\nmetadata:\n  name: ns\n")
        .unwrap();
    assert_eq!(doc.kind().unwrap(), "Namespace");
    assert_eq!(doc.name().unwrap(), "ns");
}

#[test]
fn test_from_yaml_rejects_non_mapping() {
    let err = ManifestDocument::from_yaml("a.yaml", "- just\n- a\n- list\n").unwrap_err();
    assert!(matches!(err, FieldError::Malformed { .. }));
}

#[test]
fn test_get_string_and_i64() {
    let doc = sample_document();
    assert_eq!(doc.get_string(&["metadata", "name"]).unwrap(), "gatekeeper-audit");
    assert_eq!(doc.get_i64(&["spec", "replicas"]).unwrap(), 1);
}

#[test]
fn test_missing_path_is_path_not_found() {
    let doc = sample_document();
    let err = doc.get_string(&["metadata", "labels", "app"]).unwrap_err();
    match err {
        FieldError::PathNotFound { asset, path } => {
            assert_eq!(asset, "sample.yaml");
            assert_eq!(path, "metadata.labels");
        }
        other => panic!("expected PathNotFound, got {other:?}"),
    }
}

#[test]
fn test_wrong_shape_is_type_mismatch() {
    let doc = sample_document();
    let err = doc.get_string(&["spec", "replicas"]).unwrap_err();
    match err {
        FieldError::TypeMismatch { path, expected, .. } => {
            assert_eq!(path, "spec.replicas");
            assert_eq!(expected, "string");
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn test_traversing_through_scalar_is_type_mismatch() {
    let doc = sample_document();
    let err = doc.get_string(&["spec", "replicas", "nested"]).unwrap_err();
    assert!(matches!(err, FieldError::TypeMismatch { .. }));
}

#[test]
fn test_set_creates_intermediate_mappings() {
    let mut doc = sample_document();
    doc.set_string("bar", &["metadata", "labels", "foo"]).unwrap();
    assert_eq!(doc.get_string(&["metadata", "labels", "foo"]).unwrap(), "bar");
}

#[test]
fn test_set_overwrites_in_place() {
    let mut doc = sample_document();
    doc.set_i64(4, &["spec", "replicas"]).unwrap();
    assert_eq!(doc.get_i64(&["spec", "replicas"]).unwrap(), 4);
}

#[test]
fn test_get_map_slice_returns_copies() {
    let mut doc = sample_document();
    let path = ["spec", "template", "spec", "containers"];
    let mut containers = doc.get_map_slice(&path).unwrap();
    containers[0].insert("image".to_string(), json!("example/image:v1"));

    // Mutating the copy does not touch the document until written back
    assert!(doc.get(&["spec", "template", "spec", "containers"]).unwrap()[0]
        .get("image")
        .is_none());

    doc.set_map_slice(containers, &path).unwrap();
    assert_eq!(
        doc.as_value()
            .pointer("/spec/template/spec/containers/0/image")
            .and_then(serde_json::Value::as_str),
        Some("example/image:v1")
    );
}

#[test]
fn test_get_string_slice() {
    let doc = sample_document();
    let args = doc
        .get_string_slice(&["spec", "template", "spec", "containers"])
        .unwrap_err();
    assert!(matches!(args, FieldError::TypeMismatch { .. }));

    let doc = ManifestDocument::from_value("a.yaml", json!({"args": ["--a=1", "--b=2"]}));
    assert_eq!(
        doc.get_string_slice(&["args"]).unwrap(),
        vec!["--a=1".to_string(), "--b=2".to_string()]
    );
}

#[test]
fn test_get_object_copies_nested_mapping() {
    let doc = sample_document();
    let metadata = doc.get_object(&["metadata"]).unwrap();
    assert_eq!(
        metadata.get("name").and_then(serde_json::Value::as_str),
        Some("gatekeeper-audit")
    );
}
