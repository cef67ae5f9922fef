// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Parsing for Go-style duration strings.
//!
//! The `auditInterval` spec field uses the same duration syntax as the
//! Gatekeeper binary itself (e.g. "90s", "5m", "1h", "1h30m"). The rendered
//! container argument is the total number of whole seconds, rounded.

use anyhow::{bail, Context, Result};

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_HOUR: u64 = 3_600_000;

/// Parse a Go-style duration string and return whole seconds, rounded.
///
/// Supported units: `ms`, `s`, `m`, `h`. Components may be chained
/// ("1h30m") and are summed.
///
/// # Examples
///
/// ```
/// use gatekeeper_operator::duration::parse_duration_seconds;
///
/// assert_eq!(parse_duration_seconds("1h").unwrap(), 3600);
/// assert_eq!(parse_duration_seconds("1h30m").unwrap(), 5400);
/// assert_eq!(parse_duration_seconds("1500ms").unwrap(), 2);
/// assert!(parse_duration_seconds("10").is_err());
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, a component is missing its unit,
/// a unit is unsupported, or the total overflows.
pub fn parse_duration_seconds(duration_str: &str) -> Result<u64> {
    if duration_str.is_empty() {
        bail!("duration string cannot be empty");
    }

    let mut total_millis: u64 = 0;
    let mut rest = duration_str;

    while !rest.is_empty() {
        let digits_end = rest
            .chars()
            .position(|c| !c.is_ascii_digit())
            .with_context(|| {
                format!("duration '{duration_str}' must end with a unit (ms, s, m, or h)")
            })?;
        if digits_end == 0 {
            bail!("duration '{duration_str}' has a unit without a value");
        }

        let (value_str, tail) = rest.split_at(digits_end);
        let value: u64 = value_str
            .parse()
            .context("duration value must be a non-negative integer")?;

        let unit_end = tail
            .chars()
            .position(|c| c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit, remainder) = tail.split_at(unit_end);

        let millis = match unit {
            "ms" => value,
            "s" => value
                .checked_mul(MILLIS_PER_SECOND)
                .context("duration value too large (overflow)")?,
            "m" => value
                .checked_mul(MILLIS_PER_MINUTE)
                .context("duration value too large (overflow)")?,
            "h" => value
                .checked_mul(MILLIS_PER_HOUR)
                .context("duration value too large (overflow)")?,
            _ => bail!(
                "unsupported duration unit '{unit}' in '{duration_str}'. Use 'ms', 's', 'm', or 'h'"
            ),
        };

        total_millis = total_millis
            .checked_add(millis)
            .context("duration value too large (overflow)")?;
        rest = remainder;
    }

    // Round to whole seconds, half up.
    Ok((total_millis + MILLIS_PER_SECOND / 2) / MILLIS_PER_SECOND)
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod duration_tests;
