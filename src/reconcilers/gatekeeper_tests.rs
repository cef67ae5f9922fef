// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `gatekeeper.rs`

use super::*;
use serde_json::json;

#[test]
fn test_absent_status_is_pending() {
    assert_eq!(evaluate_deployment_readiness(None), Readiness::Pending);
}

#[test]
fn test_unpopulated_status_is_pending() {
    let status = json!({});
    assert_eq!(evaluate_deployment_readiness(Some(&status)), Readiness::Pending);
}

#[test]
fn test_missing_ready_replicas_is_pending() {
    let status = json!({"replicas": 3});
    assert_eq!(evaluate_deployment_readiness(Some(&status)), Readiness::Pending);
}

#[test]
fn test_all_replicas_ready() {
    let status = json!({"replicas": 3, "readyReplicas": 3});
    assert_eq!(evaluate_deployment_readiness(Some(&status)), Readiness::Ready);
}

#[test]
fn test_partial_rollout_is_pending() {
    let status = json!({"replicas": 3, "readyReplicas": 2});
    assert_eq!(evaluate_deployment_readiness(Some(&status)), Readiness::Pending);
}

#[test]
fn test_replicas_field_defaults_to_zero() {
    // A scaled-to-zero Deployment reports neither field populated beyond
    // readyReplicas; zero ready against a defaulted zero counts as ready.
    let status = json!({"readyReplicas": 0});
    assert_eq!(evaluate_deployment_readiness(Some(&status)), Readiness::Ready);

    let status = json!({"readyReplicas": 1});
    assert_eq!(evaluate_deployment_readiness(Some(&status)), Readiness::Pending);
}

#[test]
fn test_outcome_carries_the_requeue_delay() {
    let outcome = Outcome::Requeue(Duration::from_secs(5));
    assert_ne!(outcome, Outcome::Converged);
    match outcome {
        Outcome::Requeue(delay) => assert_eq!(delay, Duration::from_secs(5)),
        Outcome::Converged => unreachable!(),
    }
}
