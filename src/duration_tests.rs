// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `duration.rs`

use super::*;

#[test]
fn test_parse_single_units() {
    assert_eq!(parse_duration_seconds("90s").unwrap(), 90);
    assert_eq!(parse_duration_seconds("5m").unwrap(), 300);
    assert_eq!(parse_duration_seconds("1h").unwrap(), 3600);
}

#[test]
fn test_parse_compound_durations() {
    assert_eq!(parse_duration_seconds("1h30m").unwrap(), 5400);
    assert_eq!(parse_duration_seconds("2m30s").unwrap(), 150);
}

#[test]
fn test_milliseconds_round_to_whole_seconds() {
    assert_eq!(parse_duration_seconds("1500ms").unwrap(), 2);
    assert_eq!(parse_duration_seconds("400ms").unwrap(), 0);
    assert_eq!(parse_duration_seconds("500ms").unwrap(), 1);
}

#[test]
fn test_invalid_durations_are_rejected() {
    assert!(parse_duration_seconds("").is_err());
    assert!(parse_duration_seconds("10").is_err());
    assert!(parse_duration_seconds("10x").is_err());
    assert!(parse_duration_seconds("h").is_err());
}
