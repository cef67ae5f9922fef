// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `context.rs`

use super::*;

#[test]
fn test_platform_openshift_query() {
    assert!(Platform::OpenShift.is_openshift());
    assert!(!Platform::Kubernetes.is_openshift());
}

#[test]
fn test_platform_equality() {
    assert_eq!(Platform::Kubernetes, Platform::Kubernetes);
    assert_ne!(Platform::Kubernetes, Platform::OpenShift);
}
