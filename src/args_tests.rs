// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `args.rs`

use super::*;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[test]
fn test_parse_arg_splits_on_first_equals() {
    assert_eq!(parse_arg("--log-level=DEBUG"), ("log-level", Some("DEBUG")));
    assert_eq!(
        parse_arg("--exempt-namespace=gatekeeper-system"),
        ("exempt-namespace", Some("gatekeeper-system"))
    );
    // Only the first '=' separates key from value
    assert_eq!(parse_arg("--key=a=b"), ("key", Some("a=b")));
}

#[test]
fn test_parse_arg_without_value() {
    assert_eq!(parse_arg("--logtostderr"), ("logtostderr", None));
}

#[test]
fn test_parse_arg_without_dashes() {
    assert_eq!(parse_arg("log-level=INFO"), ("log-level", Some("INFO")));
}

#[test]
fn test_format_arg() {
    assert_eq!(format_arg("audit-interval", "3600"), "--audit-interval=3600");
}

#[test]
fn test_upsert_replaces_existing_key_in_place() {
    let mut list = args(&[
        "--operation=webhook",
        "--exempt-namespace=gatekeeper-system",
        "--logtostderr",
    ]);
    upsert_arg(&mut list, "exempt-namespace", "custom-ns");
    assert_eq!(
        list,
        args(&[
            "--operation=webhook",
            "--exempt-namespace=custom-ns",
            "--logtostderr",
        ])
    );
}

#[test]
fn test_upsert_appends_new_key_at_end() {
    let mut list = args(&["--operation=audit", "--logtostderr"]);
    upsert_arg(&mut list, "audit-interval", "60");
    assert_eq!(
        list,
        args(&["--operation=audit", "--logtostderr", "--audit-interval=60"])
    );
}

#[test]
fn test_upsert_preserves_untouched_argument_order() {
    let mut list = args(&["--a=1", "--b=2", "--c=3"]);
    upsert_arg(&mut list, "b", "20");
    assert_eq!(list, args(&["--a=1", "--b=20", "--c=3"]));
}

#[test]
fn test_upsert_is_idempotent() {
    let mut list = args(&["--a=1"]);
    upsert_arg(&mut list, "log-level", "DEBUG");
    let once = list.clone();
    upsert_arg(&mut list, "log-level", "DEBUG");
    assert_eq!(list, once);
}

#[test]
fn test_lookup_arg() {
    let list = args(&["--operation=audit", "--audit-interval=60"]);
    assert_eq!(lookup_arg(&list, "audit-interval"), Some("60"));
    assert_eq!(lookup_arg(&list, "missing"), None);
}
