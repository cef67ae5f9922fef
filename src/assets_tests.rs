// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `assets.rs`

use super::*;
use crate::crd::{GatekeeperSpec, Mode};

fn spec(validating: Option<Mode>, mutating: Option<Mode>) -> GatekeeperSpec {
    GatekeeperSpec {
        validating_webhook: validating,
        mutating_webhook: mutating,
        ..Default::default()
    }
}

#[test]
fn test_every_catalog_asset_loads() {
    for name in catalog_names() {
        let doc = load(name).unwrap_or_else(|e| panic!("asset '{name}' failed to load: {e}"));
        assert!(!doc.kind().unwrap().is_empty());
        assert!(!doc.name().unwrap().is_empty());
    }
}

#[test]
fn test_unknown_asset_is_an_error() {
    assert!(load("no-such-asset.yaml").is_err());
}

#[test]
fn test_defaults_select_validating_but_not_mutating() {
    let selection = select_assets(&spec(None, None));

    assert!(selection.webhook_apply.contains(&VALIDATING_WEBHOOK_ASSET));
    assert!(!selection.webhook_apply.contains(&MUTATING_WEBHOOK_ASSET));
    assert!(!selection.apply.contains(&ASSIGN_CRD_ASSET));
    assert!(!selection.apply.contains(&ASSIGN_METADATA_CRD_ASSET));

    assert_eq!(
        selection.delete,
        vec![ASSIGN_CRD_ASSET, ASSIGN_METADATA_CRD_ASSET, MUTATING_WEBHOOK_ASSET]
    );
}

#[test]
fn test_both_enabled_selects_full_catalog() {
    let selection = select_assets(&spec(Some(Mode::Enabled), Some(Mode::Enabled)));

    assert!(selection.delete.is_empty());
    assert!(selection.apply.contains(&ASSIGN_CRD_ASSET));
    assert!(selection.apply.contains(&ASSIGN_METADATA_CRD_ASSET));
    assert_eq!(
        selection.webhook_apply,
        vec![VALIDATING_WEBHOOK_ASSET, MUTATING_WEBHOOK_ASSET]
    );
}

#[test]
fn test_both_disabled_moves_all_webhook_assets_to_delete() {
    let selection = select_assets(&spec(Some(Mode::Disabled), Some(Mode::Disabled)));

    assert!(selection.webhook_apply.is_empty());
    assert_eq!(
        selection.delete,
        vec![
            VALIDATING_WEBHOOK_ASSET,
            ASSIGN_CRD_ASSET,
            ASSIGN_METADATA_CRD_ASSET,
            MUTATING_WEBHOOK_ASSET,
        ]
    );
}

#[test]
fn test_partition_is_disjoint_and_complete_for_all_toggle_combinations() {
    let modes = [None, Some(Mode::Enabled), Some(Mode::Disabled)];
    // The OpenShift Role variant substitutes for the plain Role at apply time
    // and is never selected directly.
    let full_catalog: Vec<&str> = catalog_names()
        .into_iter()
        .filter(|name| *name != OPENSHIFT_ROLE_ASSET)
        .collect();

    for validating in modes {
        for mutating in modes {
            let selection = select_assets(&spec(validating, mutating));

            for asset in &selection.delete {
                assert!(
                    !selection.apply.contains(asset) && !selection.webhook_apply.contains(asset),
                    "asset '{asset}' is in both delete and apply lists"
                );
            }

            let mut union: Vec<&str> = Vec::new();
            union.extend(&selection.delete);
            union.extend(&selection.apply);
            union.extend(&selection.webhook_apply);

            let mut sorted_union = union.clone();
            sorted_union.sort_unstable();
            sorted_union.dedup();
            assert_eq!(sorted_union.len(), union.len(), "duplicate asset selected");

            let mut expected = full_catalog.clone();
            expected.sort_unstable();
            assert_eq!(sorted_union, expected, "partition does not cover the catalog");
        }
    }
}

#[test]
fn test_apply_order_puts_namespace_first_and_deployments_before_service() {
    let selection = select_assets(&spec(Some(Mode::Enabled), Some(Mode::Enabled)));
    assert_eq!(selection.apply.first(), Some(&NAMESPACE_ASSET));

    let audit_pos = selection
        .apply
        .iter()
        .position(|a| *a == AUDIT_DEPLOYMENT_ASSET)
        .unwrap();
    let namespace_pos = selection
        .apply
        .iter()
        .position(|a| *a == NAMESPACE_ASSET)
        .unwrap();
    assert!(namespace_pos < audit_pos);
}
