// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Endpoint URL construction.

const INSERT_PATH: &str = "v1/accounts/{account}/events";
const QUERY_PATH: &str = "v1/accounts/{account}/query";

pub(crate) fn insert_url(base_url: &str, account_id: &str) -> String {
	format!("{base_url}/{}", INSERT_PATH.replace("{account}", account_id))
}

pub(crate) fn query_url(base_url: &str, account_id: &str, nrql: &str) -> String {
	format!(
		"{base_url}/{}?nrql={}",
		QUERY_PATH.replace("{account}", account_id),
		query_escape(nrql)
	)
}

/// Escapes a value for a URL query string.
///
/// Only `A-Z a-z 0-9 - _ . ~` are left alone, spaces become `+`, everything
/// else is percent-encoded (so `*` is sent as `%2A`).
pub(crate) fn query_escape(value: &str) -> String {
	// A literal '%' is itself encoded, so every "%20" here came from a space.
	urlencoding::encode(value).replace("%20", "+")
}
