// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `metrics.rs`

use super::*;

#[test]
fn test_record_reconciliation_increments_counter() {
    let before = RECONCILIATION_TOTAL.with_label_values(&["success"]).get();
    record_reconciliation("success", Duration::from_millis(25));
    let after = RECONCILIATION_TOTAL.with_label_values(&["success"]).get();
    assert!((after - before - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_record_cluster_operation_increments_labeled_counter() {
    let before = CLUSTER_OPERATIONS_TOTAL
        .with_label_values(&["Deployment", "create"])
        .get();
    record_cluster_operation("Deployment", "create");
    let after = CLUSTER_OPERATIONS_TOTAL
        .with_label_values(&["Deployment", "create"])
        .get();
    assert!((after - before - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_render_exposes_namespaced_metric_names() {
    record_reconciliation("error", Duration::from_millis(5));
    record_cluster_operation("Service", "update");
    let output = render();
    assert!(output.contains("gatekeeper_operator_reconciliations_total"));
    assert!(output.contains("gatekeeper_operator_reconciliation_duration_seconds"));
    assert!(output.contains("gatekeeper_operator_cluster_operations_total"));
}
