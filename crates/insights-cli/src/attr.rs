// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Parsing `KEY=VALUE` attribute arguments.

use chrono::{DateTime, TimeDelta};
use insights::AttributeValue;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttrParseError {
	#[error("expected KEY=VALUE, got {0:?}")]
	MissingSeparator(String),

	#[error("attribute name is empty in {0:?}")]
	EmptyName(String),
}

/// Splits `KEY=VALUE` at the first `=` and infers the value's type.
pub fn parse_attribute(arg: &str) -> Result<(String, AttributeValue), AttrParseError> {
	let (name, raw) = arg
		.split_once('=')
		.ok_or_else(|| AttrParseError::MissingSeparator(arg.to_string()))?;
	let name = name.trim();
	if name.is_empty() {
		return Err(AttrParseError::EmptyName(arg.to_string()));
	}
	Ok((name.to_string(), infer_value(raw)))
}

/// Picks the most specific type a raw value parses as.
///
/// Order: bool, integer, finite float, RFC 3339 timestamp, duration with a
/// `ns`/`us`/`ms`/`s` suffix, and finally string.
pub fn infer_value(raw: &str) -> AttributeValue {
	match raw {
		"true" => return AttributeValue::Bool(true),
		"false" => return AttributeValue::Bool(false),
		_ => {}
	}
	if let Ok(v) = raw.parse::<i64>() {
		return AttributeValue::Int(v);
	}
	if let Ok(v) = raw.parse::<f64>() {
		if v.is_finite() {
			return AttributeValue::Float64(v);
		}
	}
	if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
		return AttributeValue::from(ts);
	}
	if let Some(d) = parse_duration(raw) {
		return AttributeValue::Duration(d);
	}
	AttributeValue::String(raw.to_string())
}

fn parse_duration(raw: &str) -> Option<TimeDelta> {
	// Longer suffixes first so "ms" is not read as "s".
	let (digits, unit) = ["ns", "us", "ms", "s"]
		.iter()
		.find_map(|unit| raw.strip_suffix(unit).map(|digits| (digits, *unit)))?;
	let n: i64 = digits.parse().ok()?;
	match unit {
		"ns" => Some(TimeDelta::nanoseconds(n)),
		"us" => Some(TimeDelta::microseconds(n)),
		"ms" => TimeDelta::try_milliseconds(n),
		_ => TimeDelta::try_seconds(n),
	}
}
