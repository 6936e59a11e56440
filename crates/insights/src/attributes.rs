// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Event attributes and their wire coercion.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde::Serialize;

/// A single attribute value accepted by the insert API.
///
/// Timestamps and durations have no JSON representation of their own: they
/// are sent as Unix seconds and as whole milliseconds respectively.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
	Int(i64),
	Bool(bool),
	String(String),
	Float32(f32),
	Float64(f64),
	Timestamp(DateTime<Utc>),
	/// Signed, nanosecond precision.
	Duration(TimeDelta),
}

/// The JSON shape of a coerced attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum WireValue {
	Int(i64),
	Bool(bool),
	String(String),
	Float32(f32),
	Float64(f64),
}

impl AttributeValue {
	/// Short type name used in error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			AttributeValue::Int(_) => "int",
			AttributeValue::Bool(_) => "bool",
			AttributeValue::String(_) => "string",
			AttributeValue::Float32(_) => "float32",
			AttributeValue::Float64(_) => "float64",
			AttributeValue::Timestamp(_) => "timestamp",
			AttributeValue::Duration(_) => "duration",
		}
	}

	/// Converts the value to its wire form.
	///
	/// Returns `None` for NaN and infinite floats, which JSON cannot carry.
	pub(crate) fn coerce(&self) -> Option<WireValue> {
		let wire = match self {
			AttributeValue::Int(v) => WireValue::Int(*v),
			AttributeValue::Bool(v) => WireValue::Bool(*v),
			AttributeValue::String(v) => WireValue::String(v.clone()),
			AttributeValue::Float32(v) if v.is_finite() => WireValue::Float32(*v),
			AttributeValue::Float64(v) if v.is_finite() => WireValue::Float64(*v),
			AttributeValue::Float32(_) | AttributeValue::Float64(_) => return None,
			AttributeValue::Timestamp(ts) => WireValue::Int(ts.timestamp()),
			AttributeValue::Duration(d) => WireValue::Int(round_to_millis(*d)),
		};
		Some(wire)
	}
}

const NANOS_PER_MILLI: i128 = 1_000_000;

/// Rounds a duration to whole milliseconds, halves away from zero.
pub(crate) fn round_to_millis(duration: TimeDelta) -> i64 {
	// num_seconds() and subsec_nanos() share a sign, so the sum is exact.
	let nanos = i128::from(duration.num_seconds()) * 1_000_000_000
		+ i128::from(duration.subsec_nanos());
	let mut millis = nanos / NANOS_PER_MILLI;
	let remainder = nanos % NANOS_PER_MILLI;
	if remainder.abs() * 2 >= NANOS_PER_MILLI {
		millis += remainder.signum();
	}
	millis as i64
}

impl fmt::Display for AttributeValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AttributeValue::Int(v) => write!(f, "{v}"),
			AttributeValue::Bool(v) => write!(f, "{v}"),
			AttributeValue::String(v) => write!(f, "{v}"),
			AttributeValue::Float32(v) => write!(f, "{v}"),
			AttributeValue::Float64(v) => write!(f, "{v}"),
			AttributeValue::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
			AttributeValue::Duration(v) => write!(f, "{v}"),
		}
	}
}

macro_rules! int_conversions {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for AttributeValue {
				fn from(value: $ty) -> Self {
					AttributeValue::Int(i64::from(value))
				}
			}
		)*
	};
}

int_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for AttributeValue {
	fn from(value: bool) -> Self {
		AttributeValue::Bool(value)
	}
}

impl From<String> for AttributeValue {
	fn from(value: String) -> Self {
		AttributeValue::String(value)
	}
}

impl From<&str> for AttributeValue {
	fn from(value: &str) -> Self {
		AttributeValue::String(value.to_string())
	}
}

impl From<f32> for AttributeValue {
	fn from(value: f32) -> Self {
		AttributeValue::Float32(value)
	}
}

impl From<f64> for AttributeValue {
	fn from(value: f64) -> Self {
		AttributeValue::Float64(value)
	}
}

impl<Tz: TimeZone> From<DateTime<Tz>> for AttributeValue {
	fn from(value: DateTime<Tz>) -> Self {
		AttributeValue::Timestamp(value.with_timezone(&Utc))
	}
}

impl From<TimeDelta> for AttributeValue {
	fn from(value: TimeDelta) -> Self {
		AttributeValue::Duration(value)
	}
}

impl From<std::time::Duration> for AttributeValue {
	/// Durations beyond chrono's range saturate at [`TimeDelta::MAX`].
	fn from(value: std::time::Duration) -> Self {
		AttributeValue::Duration(TimeDelta::from_std(value).unwrap_or(TimeDelta::MAX))
	}
}

/// The attributes of one event, ordered by name.
///
/// ```
/// use insights::Attributes;
///
/// let attributes = Attributes::new()
///     .insert("host", "web-1")
///     .insert("healthy", true)
///     .insert("load", 0.72);
/// assert_eq!(attributes.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
	inner: BTreeMap<String, AttributeValue>,
}

impl Attributes {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an attribute, replacing any previous value under the same name.
	pub fn insert<K, V>(mut self, name: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<AttributeValue>,
	{
		self.set(name, value);
		self
	}

	/// In-place form of [`insert`](Attributes::insert).
	pub fn set<K, V>(&mut self, name: K, value: V)
	where
		K: Into<String>,
		V: Into<AttributeValue>,
	{
		self.inner.insert(name.into(), value.into());
	}

	/// Merges `other` into `self`; values from `other` win.
	pub fn merge(mut self, other: Attributes) -> Self {
		self.inner.extend(other.inner);
		self
	}

	pub fn get(&self, name: &str) -> Option<&AttributeValue> {
		self.inner.get(name)
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Iterates attributes in name order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
		self.inner.iter().map(|(k, v)| (k.as_str(), v))
	}
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
	K: Into<String>,
	V: Into<AttributeValue>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut attributes = Attributes::new();
		for (name, value) in iter {
			attributes.set(name, value);
		}
		attributes
	}
}

impl<K, V> Extend<(K, V)> for Attributes
where
	K: Into<String>,
	V: Into<AttributeValue>,
{
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		for (name, value) in iter {
			self.set(name, value);
		}
	}
}

impl IntoIterator for Attributes {
	type Item = (String, AttributeValue);
	type IntoIter = std::collections::btree_map::IntoIter<String, AttributeValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.inner.into_iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::FixedOffset;
	use proptest::prelude::*;

	#[test]
	fn duration_rounds_to_milliseconds() {
		let d = AttributeValue::from(TimeDelta::nanoseconds(3_123_456));
		assert_eq!(d.coerce(), Some(WireValue::Int(3)));
	}

	#[test]
	fn duration_halves_round_away_from_zero() {
		assert_eq!(round_to_millis(TimeDelta::microseconds(1_500)), 2);
		assert_eq!(round_to_millis(TimeDelta::microseconds(-1_500)), -2);
		assert_eq!(round_to_millis(TimeDelta::nanoseconds(2_499_999)), 2);
		assert_eq!(round_to_millis(TimeDelta::nanoseconds(-2_499_999)), -2);
		assert_eq!(round_to_millis(TimeDelta::zero()), 0);
	}

	#[test]
	fn duration_with_whole_seconds() {
		assert_eq!(round_to_millis(TimeDelta::milliseconds(61_250)), 61_250);
		assert_eq!(
			round_to_millis(TimeDelta::seconds(2) + TimeDelta::nanoseconds(999_600)),
			2_001
		);
	}

	#[test]
	fn std_duration_converts() {
		let d = AttributeValue::from(std::time::Duration::from_micros(42_700));
		assert_eq!(d.coerce(), Some(WireValue::Int(43)));
	}

	#[test]
	fn timestamp_becomes_unix_seconds() {
		let ts = DateTime::parse_from_rfc3339("2006-01-02T15:04:05-07:00").unwrap();
		let value = AttributeValue::from(ts);
		assert_eq!(value.coerce(), Some(WireValue::Int(1_136_239_445)));
	}

	#[test]
	fn timestamp_keeps_instant_across_zones() {
		let offset = FixedOffset::east_opt(9 * 3600).unwrap();
		let tokyo = offset.with_ymd_and_hms(2006, 1, 3, 7, 4, 5).unwrap();
		assert_eq!(
			AttributeValue::from(tokyo).coerce(),
			Some(WireValue::Int(1_136_239_445))
		);
	}

	#[test]
	fn pre_epoch_timestamp_floors() {
		let ts = Utc.timestamp_opt(-1, 500_000_000).unwrap();
		assert_eq!(AttributeValue::from(ts).coerce(), Some(WireValue::Int(-1)));
	}

	#[test]
	fn scalars_pass_through() {
		assert_eq!(AttributeValue::from(3).coerce(), Some(WireValue::Int(3)));
		assert_eq!(
			AttributeValue::from(true).coerce(),
			Some(WireValue::Bool(true))
		);
		assert_eq!(
			AttributeValue::from("foo").coerce(),
			Some(WireValue::String("foo".to_string()))
		);
		assert_eq!(
			AttributeValue::from(3.2f32).coerce(),
			Some(WireValue::Float32(3.2))
		);
		assert_eq!(
			AttributeValue::from(3.2).coerce(),
			Some(WireValue::Float64(3.2))
		);
	}

	#[test]
	fn non_finite_floats_do_not_coerce() {
		assert_eq!(AttributeValue::from(f64::NAN).coerce(), None);
		assert_eq!(AttributeValue::from(f64::INFINITY).coerce(), None);
		assert_eq!(AttributeValue::from(f32::NEG_INFINITY).coerce(), None);
	}

	#[test]
	fn float32_serializes_with_single_precision() {
		let json = serde_json::to_string(&WireValue::Float32(3.2)).unwrap();
		assert_eq!(json, "3.2");
	}

	#[test]
	fn kind_names() {
		assert_eq!(AttributeValue::from(1u8).kind(), "int");
		assert_eq!(AttributeValue::from(f64::NAN).kind(), "float64");
		assert_eq!(AttributeValue::from(TimeDelta::zero()).kind(), "duration");
	}

	#[test]
	fn insert_replaces_and_iterates_in_name_order() {
		let attributes = Attributes::new()
			.insert("b", 1)
			.insert("a", 2)
			.insert("b", 3);

		let names: Vec<&str> = attributes.iter().map(|(k, _)| k).collect();
		assert_eq!(names, vec!["a", "b"]);
		assert_eq!(attributes.get("b"), Some(&AttributeValue::Int(3)));
	}

	#[test]
	fn merge_prefers_other() {
		let merged = Attributes::new()
			.insert("a", 1)
			.insert("b", 2)
			.merge(Attributes::new().insert("b", "two").insert("c", false));

		assert_eq!(merged.len(), 3);
		assert_eq!(
			merged.get("b"),
			Some(&AttributeValue::String("two".to_string()))
		);
	}

	#[test]
	fn collects_from_pairs() {
		let attributes: Attributes = vec![("x", 1), ("y", 2)].into_iter().collect();
		assert_eq!(attributes.len(), 2);
		assert!(!attributes.is_empty());
	}

	proptest! {
		#[test]
		fn rounding_is_within_half_a_millisecond(nanos in -10_000_000_000i64..10_000_000_000i64) {
			let millis = round_to_millis(TimeDelta::nanoseconds(nanos));
			let error = i128::from(millis) * NANOS_PER_MILLI - i128::from(nanos);
			prop_assert!(error.abs() * 2 <= NANOS_PER_MILLI);
		}

		#[test]
		fn whole_milliseconds_are_exact(millis in -1_000_000_000i64..1_000_000_000i64) {
			prop_assert_eq!(round_to_millis(TimeDelta::milliseconds(millis)), millis);
		}

		#[test]
		fn timestamps_match_chrono_unix_seconds(secs in -2_000_000_000i64..4_000_000_000i64, nanos in 0u32..1_000_000_000) {
			let ts = Utc.timestamp_opt(secs, nanos).unwrap();
			prop_assert_eq!(AttributeValue::from(ts).coerce(), Some(WireValue::Int(secs)));
		}
	}
}
