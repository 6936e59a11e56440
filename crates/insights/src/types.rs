// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Response types for the query API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The standard envelope returned by the query endpoint.
///
/// Result rows vary with the NRQL (`average`, `count`, `events`, ...), so
/// they are kept as raw JSON. Callers that know the shape of their query
/// should decode into their own type instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
	#[serde(default)]
	pub results: Vec<Value>,

	/// Present for `FACET` queries.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub facets: Option<Vec<Value>>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Value>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub performance_stats: Option<Value>,
}

impl QueryResponse {
	/// Looks up `field` in the `index`-th result row.
	pub fn result_field(&self, index: usize, field: &str) -> Option<&Value> {
		self.results.get(index)?.get(field)
	}
}
