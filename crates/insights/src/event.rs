// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Insert request body encoding.

use std::collections::BTreeMap;

use tracing::{trace, warn};

use crate::attributes::{Attributes, WireValue};
use crate::error::{InsightsError, Result};

/// Maximum attributes per event, `eventType` included.
pub const MAX_ATTRIBUTES: usize = 255;

pub(crate) const EVENT_TYPE_KEY: &str = "eventType";

/// Builds the JSON body for a single event.
///
/// Coercion stops at the first unrepresentable value. The attribute limit is
/// checked afterwards, against the merged map, so an `eventType` attribute
/// replaces the event type instead of adding a key.
pub(crate) fn encode(event_type: &str, attributes: &Attributes) -> Result<Vec<u8>> {
	let mut body: BTreeMap<&str, WireValue> = BTreeMap::new();
	body.insert(EVENT_TYPE_KEY, WireValue::String(event_type.to_string()));

	for (name, value) in attributes.iter() {
		let wire = value.coerce().ok_or_else(|| {
			warn!(attribute = %name, kind = value.kind(), "Attribute has no JSON representation");
			InsightsError::InvalidAttribute {
				name: name.to_string(),
				value: value.to_string(),
				kind: value.kind(),
			}
		})?;
		body.insert(name, wire);
	}

	if body.len() > MAX_ATTRIBUTES {
		warn!(count = body.len(), max = MAX_ATTRIBUTES, "Event exceeds attribute limit");
		return Err(InsightsError::TooManyAttributes { count: body.len() });
	}

	let encoded = serde_json::to_vec(&body).map_err(InsightsError::Encode)?;
	trace!(body = %String::from_utf8_lossy(&encoded), "Encoded event");
	Ok(encoded)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{DateTime, TimeDelta};
	use proptest::prelude::*;
	use serde_json::Value;

	fn sample_attributes() -> Attributes {
		let ts = DateTime::parse_from_rfc3339("2006-01-02T15:04:05-07:00").unwrap();
		Attributes::new()
			.insert("bool", true)
			.insert("duration", TimeDelta::nanoseconds(3_123_456))
			.insert("float", 3.2)
			.insert("int", 3)
			.insert("string", "foo")
			.insert("time", ts)
	}

	#[test]
	fn encodes_sorted_object_with_event_type() {
		let body = encode("hello", &sample_attributes()).unwrap();
		assert_eq!(
			String::from_utf8(body).unwrap(),
			r#"{"bool":true,"duration":3,"eventType":"hello","float":3.2,"int":3,"string":"foo","time":1136239445}"#
		);
	}

	#[test]
	fn empty_attributes_still_send_event_type() {
		let body = encode("Ping", &Attributes::new()).unwrap();
		assert_eq!(body, br#"{"eventType":"Ping"}"#);
	}

	#[test]
	fn event_type_attribute_overrides_argument() {
		let attributes = Attributes::new().insert("eventType", "Override");
		let body = encode("Original", &attributes).unwrap();
		assert_eq!(body, br#"{"eventType":"Override"}"#);
	}

	#[test]
	fn first_invalid_attribute_is_reported() {
		let attributes = Attributes::new()
			.insert("a_ok", 1)
			.insert("b_bad", f64::NAN)
			.insert("c_bad", f32::INFINITY);

		match encode("hello", &attributes) {
			Err(InsightsError::InvalidAttribute { name, value, kind }) => {
				assert_eq!(name, "b_bad");
				assert_eq!(value, "NaN");
				assert_eq!(kind, "float64");
			}
			other => panic!("expected InvalidAttribute, got {other:?}"),
		}
	}

	#[test]
	fn limit_counts_event_type() {
		let at_limit: Attributes = (0..MAX_ATTRIBUTES - 1).map(|i| (format!("attr{i}"), i as i64)).collect();
		let body = encode("hello", &at_limit).unwrap();
		let decoded: Value = serde_json::from_slice(&body).unwrap();
		assert_eq!(decoded.as_object().unwrap().len(), MAX_ATTRIBUTES);

		let over_limit = at_limit.insert("one_more", true);
		assert!(matches!(
			encode("hello", &over_limit),
			Err(InsightsError::TooManyAttributes { count: 256 })
		));
	}

	#[test]
	fn invalid_attribute_wins_over_limit() {
		let mut attributes: Attributes = (0..300).map(|i| (format!("attr{i:03}"), i as i64)).collect();
		attributes.set("aaa", f64::NAN);

		assert!(matches!(
			encode("hello", &attributes),
			Err(InsightsError::InvalidAttribute { .. })
		));
	}

	proptest! {
		#[test]
		fn body_is_event_type_plus_coerced_attributes(
			values in proptest::collection::btree_map("[a-z]{1,12}", any::<i64>(), 0..254usize)
		) {
			prop_assume!(!values.contains_key(EVENT_TYPE_KEY));
			let attributes: Attributes = values.clone().into_iter().collect();

			let body = encode("Prop", &attributes).unwrap();
			let decoded: Value = serde_json::from_slice(&body).unwrap();
			let object = decoded.as_object().unwrap();

			prop_assert_eq!(object.len(), values.len() + 1);
			prop_assert_eq!(object.get(EVENT_TYPE_KEY), Some(&Value::from("Prop")));
			for (name, value) in &values {
				prop_assert_eq!(object.get(name), Some(&Value::from(*value)));
			}
		}
	}
}
