// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Client configuration.
//!
//! A [`ClientConfig`] can only be obtained through
//! [`ClientConfigBuilder::build`], which validates it, so a constructed
//! [`InsightsClient`](crate::InsightsClient) never sends a request to a
//! malformed URL.

use std::env;
use std::time::Duration;

use insights_common_config::load_secret_env;
use insights_common_secret::SecretString;
use tracing::debug;
use url::Url;

use crate::error::{InsightsError, Result};

pub const DEFAULT_INSERT_URL: &str = "https://insights-collector.newrelic.com";
pub const DEFAULT_QUERY_URL: &str = "https://insights-api.newrelic.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ACCOUNT_ID_ENV: &str = "INSIGHTS_ACCOUNT_ID";
pub const INSERT_KEY_ENV: &str = "INSIGHTS_INSERT_KEY";
pub const QUERY_KEY_ENV: &str = "INSIGHTS_QUERY_KEY";
pub const INSERT_URL_ENV: &str = "INSIGHTS_INSERT_URL";
pub const QUERY_URL_ENV: &str = "INSIGHTS_QUERY_URL";

/// Validated, immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	account_id: String,
	insert_key: Option<SecretString>,
	query_key: Option<SecretString>,
	insert_base_url: String,
	query_base_url: String,
	timeout: Duration,
	external_auth: bool,
}

impl ClientConfig {
	pub fn builder(account_id: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(account_id)
	}

	/// Reads the whole configuration from `INSIGHTS_*` environment variables.
	///
	/// Keys honour the `_FILE` convention of
	/// [`load_secret_env`](insights_common_config::load_secret_env).
	pub fn from_env() -> Result<Self> {
		let account_id = env::var(ACCOUNT_ID_ENV)
			.map_err(|_| InsightsError::InvalidConfig(format!("{ACCOUNT_ID_ENV} is not set")))?;

		let mut builder = Self::builder(account_id).with_env_credentials()?;
		if let Ok(url) = env::var(INSERT_URL_ENV) {
			builder = builder.insert_base_url(url);
		}
		if let Ok(url) = env::var(QUERY_URL_ENV) {
			builder = builder.query_base_url(url);
		}
		builder.build()
	}

	pub fn account_id(&self) -> &str {
		&self.account_id
	}

	pub fn insert_key(&self) -> Option<&SecretString> {
		self.insert_key.as_ref()
	}

	pub fn query_key(&self) -> Option<&SecretString> {
		self.query_key.as_ref()
	}

	/// Base URL for inserts, without a trailing slash.
	pub fn insert_base_url(&self) -> &str {
		&self.insert_base_url
	}

	/// Base URL for queries, without a trailing slash.
	pub fn query_base_url(&self) -> &str {
		&self.query_base_url
	}

	/// Request timeout applied by the default transport.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// True when credentials are added by the transport instead.
	pub fn external_auth(&self) -> bool {
		self.external_auth
	}
}

/// Builder for [`ClientConfig`]. Later calls override earlier ones.
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
	account_id: String,
	insert_key: Option<SecretString>,
	query_key: Option<SecretString>,
	insert_base_url: String,
	query_base_url: String,
	timeout: Duration,
	external_auth: bool,
}

impl ClientConfigBuilder {
	pub fn new(account_id: impl Into<String>) -> Self {
		Self {
			account_id: account_id.into(),
			insert_key: None,
			query_key: None,
			insert_base_url: DEFAULT_INSERT_URL.to_string(),
			query_base_url: DEFAULT_QUERY_URL.to_string(),
			timeout: DEFAULT_TIMEOUT,
			external_auth: false,
		}
	}

	pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
		self.account_id = account_id.into();
		self
	}

	/// Sets the key sent as `X-Insert-Key` on publish.
	pub fn insert_key(mut self, key: impl Into<SecretString>) -> Self {
		self.insert_key = Some(key.into());
		self
	}

	/// Sets the key sent as `X-Query-Key` on query.
	pub fn query_key(mut self, key: impl Into<SecretString>) -> Self {
		self.query_key = Some(key.into());
		self
	}

	pub fn insert_base_url(mut self, url: impl Into<String>) -> Self {
		self.insert_base_url = url.into();
		self
	}

	pub fn query_base_url(mut self, url: impl Into<String>) -> Self {
		self.query_base_url = url.into();
		self
	}

	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Declares that the transport injects credentials itself, e.g. a
	/// [`HeaderInjectingTransport`](crate::HeaderInjectingTransport).
	pub fn external_auth(mut self, enabled: bool) -> Self {
		self.external_auth = enabled;
		self
	}

	/// Fills in whichever keys are present in the environment.
	pub fn with_env_credentials(mut self) -> Result<Self> {
		if let Some(key) = load_secret_env(INSERT_KEY_ENV)? {
			self.insert_key = Some(key);
		}
		if let Some(key) = load_secret_env(QUERY_KEY_ENV)? {
			self.query_key = Some(key);
		}
		Ok(self)
	}

	pub fn build(self) -> Result<ClientConfig> {
		validate_account_id(&self.account_id)?;

		let insert_key = self.insert_key.filter(|k| !k.is_empty());
		let query_key = self.query_key.filter(|k| !k.is_empty());
		if insert_key.is_none() && query_key.is_none() && !self.external_auth {
			return Err(InsightsError::InvalidConfig(
				"an insert key or a query key is required unless external auth is enabled".to_string(),
			));
		}

		if self.timeout.is_zero() {
			return Err(InsightsError::InvalidConfig(
				"timeout must be greater than zero".to_string(),
			));
		}

		let insert_base_url = normalize_base_url("insert", &self.insert_base_url)?;
		let query_base_url = normalize_base_url("query", &self.query_base_url)?;

		debug!(
			account_id = %self.account_id,
			insert_key = ?insert_key,
			query_key = ?query_key,
			insert_base_url = %insert_base_url,
			query_base_url = %query_base_url,
			"Built Insights client configuration"
		);

		Ok(ClientConfig {
			account_id: self.account_id,
			insert_key,
			query_key,
			insert_base_url,
			query_base_url,
			timeout: self.timeout,
			external_auth: self.external_auth,
		})
	}
}

fn validate_account_id(account_id: &str) -> Result<()> {
	if account_id.trim().is_empty() {
		return Err(InsightsError::InvalidConfig(
			"account id is required".to_string(),
		));
	}
	if account_id
		.chars()
		.any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '%'))
	{
		return Err(InsightsError::InvalidConfig(format!(
			"account id {account_id:?} is not a valid path segment"
		)));
	}
	Ok(())
}

fn normalize_base_url(which: &str, raw: &str) -> Result<String> {
	let trimmed = raw.trim().trim_end_matches('/');
	let url = Url::parse(trimmed)
		.map_err(|e| InsightsError::InvalidConfig(format!("invalid {which} base URL {raw:?}: {e}")))?;

	if !matches!(url.scheme(), "http" | "https") {
		return Err(InsightsError::InvalidConfig(format!(
			"{which} base URL must be http or https, got {:?}",
			url.scheme()
		)));
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(InsightsError::InvalidConfig(format!(
			"{which} base URL must not carry a query or fragment"
		)));
	}
	// `Url::parse` percent-encodes characters that requests later reject.
	http::Uri::try_from(trimmed)
		.map_err(|e| InsightsError::InvalidConfig(format!("invalid {which} base URL {raw:?}: {e}")))?;

	Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn invalid(result: Result<ClientConfig>) -> String {
		match result {
			Err(InsightsError::InvalidConfig(msg)) => msg,
			other => panic!("expected InvalidConfig, got {other:?}"),
		}
	}

	#[test]
	fn defaults() {
		let config = ClientConfig::builder("1").insert_key("insert-abc").build().unwrap();

		assert_eq!(config.account_id(), "1");
		assert_eq!(config.insert_base_url(), DEFAULT_INSERT_URL);
		assert_eq!(config.query_base_url(), DEFAULT_QUERY_URL);
		assert_eq!(config.timeout(), Duration::from_secs(10));
		assert!(config.query_key().is_none());
		assert!(!config.external_auth());
	}

	#[test]
	fn later_calls_override_earlier_ones() {
		let config = ClientConfig::builder("1")
			.insert_key("first")
			.insert_key("second")
			.account_id("2")
			.build()
			.unwrap();

		assert_eq!(config.account_id(), "2");
		assert_eq!(config.insert_key().unwrap().expose(), "second");
	}

	#[test]
	fn trailing_slashes_are_trimmed() {
		let config = ClientConfig::builder("1")
			.query_key("q")
			.insert_base_url("http://localhost:8080/")
			.query_base_url("https://example.com/insights//")
			.build()
			.unwrap();

		assert_eq!(config.insert_base_url(), "http://localhost:8080");
		assert_eq!(config.query_base_url(), "https://example.com/insights");
	}

	#[test]
	fn rejects_missing_account_id() {
		let msg = invalid(ClientConfig::builder("  ").insert_key("k").build());
		assert_eq!(msg, "account id is required");
	}

	#[test]
	fn rejects_account_id_that_breaks_the_path() {
		for bad in ["1/2", "1?x", "1#", "1 2", "1%2F"] {
			invalid(ClientConfig::builder(bad).insert_key("k").build());
		}
	}

	#[test]
	fn rejects_missing_credentials() {
		invalid(ClientConfig::builder("1").build());
		invalid(ClientConfig::builder("1").insert_key("").query_key("").build());
	}

	#[test]
	fn external_auth_allows_missing_credentials() {
		let config = ClientConfig::builder("1").external_auth(true).build().unwrap();
		assert!(config.external_auth());
		assert!(config.insert_key().is_none());
	}

	#[test]
	fn rejects_bad_urls() {
		invalid(ClientConfig::builder("1").insert_key("k").insert_base_url("not a url").build());
		invalid(ClientConfig::builder("1").insert_key("k").query_base_url("ftp://example.com").build());
		invalid(
			ClientConfig::builder("1")
				.insert_key("k")
				.query_base_url("https://example.com?x=1")
				.build(),
		);
	}

	#[test]
	fn rejects_urls_that_requests_cannot_carry() {
		let msg = invalid(
			ClientConfig::builder("1")
				.insert_key("k")
				.insert_base_url("http://127.0.0.1:1/a b")
				.build(),
		);
		assert!(msg.starts_with("invalid insert base URL"), "{msg}");
	}

	#[test]
	fn rejects_zero_timeout() {
		let msg = invalid(ClientConfig::builder("1").insert_key("k").timeout(Duration::ZERO).build());
		assert_eq!(msg, "timeout must be greater than zero");
	}

	#[test]
	fn debug_never_shows_keys() {
		let config = ClientConfig::builder("1")
			.insert_key("insert-abc")
			.query_key("query-abc")
			.build()
			.unwrap();
		let output = format!("{config:?}");

		assert!(!output.contains("insert-abc"));
		assert!(!output.contains("query-abc"));
		assert!(output.contains("[REDACTED]"));
	}

	#[test]
	fn from_env_reads_all_variables() {
		// The only test touching INSIGHTS_* variables, so no cross-test races.
		env::set_var(ACCOUNT_ID_ENV, "42");
		env::set_var(INSERT_KEY_ENV, "insert-env");
		env::remove_var(format!("{INSERT_KEY_ENV}_FILE"));
		env::remove_var(QUERY_KEY_ENV);
		env::remove_var(format!("{QUERY_KEY_ENV}_FILE"));
		env::set_var(INSERT_URL_ENV, "http://127.0.0.1:9999/");
		env::remove_var(QUERY_URL_ENV);

		let config = ClientConfig::from_env().unwrap();
		assert_eq!(config.account_id(), "42");
		assert_eq!(config.insert_key().unwrap().expose(), "insert-env");
		assert!(config.query_key().is_none());
		assert_eq!(config.insert_base_url(), "http://127.0.0.1:9999");
		assert_eq!(config.query_base_url(), DEFAULT_QUERY_URL);

		env::remove_var(ACCOUNT_ID_ENV);
		assert!(matches!(
			ClientConfig::from_env(),
			Err(InsightsError::InvalidConfig(_))
		));

		env::remove_var(INSERT_KEY_ENV);
		env::remove_var(INSERT_URL_ENV);
	}
}
