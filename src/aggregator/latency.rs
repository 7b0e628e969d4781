//! Artificial latency directive.
//!
//! Callers can ask a node to stall before fanning out by sending a
//! `latency` header holding a duration string such as `250ms`, `1.5s` or
//! `1h2m3s`.
//!
//! # Grammar
//! ```text
//! duration := sign? ( "0" | ( number unit )+ )
//! number   := digits ( "." digits? )? | "." digits
//! unit     := "ns" | "us" | "µs" | "μs" | "ms" | "s" | "m" | "h"
//! ```
//!
//! Negative durations parse but produce no delay.

use axum::http::HeaderMap;
use std::time::Duration;
use thiserror::Error;

/// Request header carrying the latency directive.
pub const LATENCY_HEADER: &str = "latency";

/// Largest representable duration, in nanoseconds.
const MAX_NANOS: u128 = i64::MAX as u128;

/// Fraction digits past this add nothing at nanosecond resolution.
const MAX_FRACTION_DIGITS: usize = 18;

/// Errors parsing a latency directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LatencyError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("latency header is not valid text")]
    NotText,
}

/// Read the latency directive from request headers.
///
/// Returns `Ok(None)` when the header is absent or empty.
pub fn from_headers(headers: &HeaderMap) -> Result<Option<Duration>, LatencyError> {
    let Some(value) = headers.get(LATENCY_HEADER) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| LatencyError::NotText)?;
    if raw.is_empty() {
        return Ok(None);
    }
    parse_duration(raw).map(Some)
}

/// Parse a duration string.
pub fn parse_duration(input: &str) -> Result<Duration, LatencyError> {
    let invalid = || LatencyError::Invalid(input.to_string());

    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, after_int) = rest.split_at(int_len);
        rest = after_int;

        let mut frac_digits = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            frac_digits = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid());
        }

        let unit_len = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(LatencyError::MissingUnit(input.to_string()));
        }
        let (unit, after_unit) = rest.split_at(unit_len);
        rest = after_unit;

        let scale = unit_nanos(unit).ok_or_else(|| LatencyError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let whole = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse::<u128>().map_err(|_| invalid())?
        };
        let mut component = whole.checked_mul(scale).ok_or_else(invalid)?;

        let frac_digits = &frac_digits[..frac_digits.len().min(MAX_FRACTION_DIGITS)];
        if !frac_digits.is_empty() {
            let numerator = frac_digits.parse::<u128>().map_err(|_| invalid())?;
            let denominator = 10u128.pow(frac_digits.len() as u32);
            component += numerator * scale / denominator;
        }

        total = total.checked_add(component).ok_or_else(invalid)?;
        if total > MAX_NANOS {
            return Err(invalid());
        }
    }

    if negative {
        return Ok(Duration::ZERO);
    }
    Ok(Duration::from_nanos(total as u64))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}
