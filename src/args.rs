// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Codec for `--key=value` container arguments.
//!
//! The managed Deployments configure the Gatekeeper binary through flag-style
//! arguments in the manager container spec. Overrides update these strings
//! with upsert semantics: an existing key keeps its position and gets a new
//! value, a new key is appended at the end. Untouched arguments are never
//! reordered, which keeps repeated override application byte-stable.

/// Split an argument into its key and optional value at the first `=`.
///
/// The leading `--` is stripped from the key. Arguments without `=`
/// (e.g. `--logtostderr`) yield `None` for the value.
#[must_use]
pub fn parse_arg(arg: &str) -> (&str, Option<&str>) {
    let trimmed = arg.strip_prefix("--").unwrap_or(arg);
    match trimmed.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (trimmed, None),
    }
}

/// Render a key and value as a `--key=value` argument string.
#[must_use]
pub fn format_arg(key: &str, value: &str) -> String {
    format!("--{key}={value}")
}

/// Update an argument list in place with upsert semantics.
///
/// If an argument with `key` already exists its value is replaced without
/// moving it; otherwise a new `--key=value` entry is appended.
pub fn upsert_arg(args: &mut Vec<String>, key: &str, value: &str) {
    for arg in args.iter_mut() {
        let (existing_key, _) = parse_arg(arg);
        if existing_key == key {
            *arg = format_arg(key, value);
            return;
        }
    }
    args.push(format_arg(key, value));
}

/// Look up the value of `key` in an argument list.
#[must_use]
pub fn lookup_arg<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter().find_map(|arg| {
        let (existing_key, value) = parse_arg(arg);
        if existing_key == key {
            value
        } else {
            None
        }
    })
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod args_tests;
