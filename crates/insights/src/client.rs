// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Insights API client implementation.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Request, StatusCode};
use insights_common_secret::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument, trace};

use crate::attributes::Attributes;
use crate::config::ClientConfig;
use crate::error::{InsightsError, Result};
use crate::event;
use crate::query::{insert_url, query_url};
use crate::transport::{sensitive_header, HttpTransport, ReqwestTransport};

const INSERT_KEY_HEADER: &str = "X-Insert-Key";
const QUERY_KEY_HEADER: &str = "X-Query-Key";
const APPLICATION_JSON: &str = "application/json";

/// Client for the Insights insert and query APIs.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct InsightsClient {
	config: ClientConfig,
	transport: Arc<dyn HttpTransport>,
}

impl InsightsClient {
	/// Creates a client over the default reqwest transport, using the
	/// configured timeout.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let transport = ReqwestTransport::new(config.timeout()).map_err(|e| {
			error!(error = %e, "Failed to create HTTP client");
			InsightsError::HttpClient(e)
		})?;
		Ok(Self::with_transport(config, transport))
	}

	/// Creates a client over a caller-supplied transport.
	pub fn with_transport(config: ClientConfig, transport: impl HttpTransport + 'static) -> Self {
		Self {
			config,
			transport: Arc::new(transport),
		}
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Inserts one event of type `event_type`.
	///
	/// Nothing is sent if an attribute cannot be encoded or the event has
	/// more than [`MAX_ATTRIBUTES`](crate::MAX_ATTRIBUTES) attributes,
	/// `eventType` included. Only `200 OK` counts as success.
	#[instrument(skip_all, fields(event_type = %event_type, attribute_count = attributes.len()))]
	pub async fn publish(&self, event_type: &str, attributes: &Attributes) -> Result<()> {
		let insert_key = self.credential(self.config.insert_key(), "insert key")?;
		let body = event::encode(event_type, attributes)?;

		let url = insert_url(self.config.insert_base_url(), self.config.account_id());
		let mut builder = Request::post(url).header(CONTENT_TYPE, APPLICATION_JSON);
		if let Some(key) = insert_key {
			builder = builder.header(INSERT_KEY_HEADER, key_header(key)?);
		}
		let request = builder.body(body)?;

		self.execute(request).await?;
		debug!("Event published");
		Ok(())
	}

	/// Runs an NRQL query and decodes the JSON response into `T`.
	///
	/// Use [`QueryResponse`](crate::QueryResponse) when there is no
	/// dedicated type for the query.
	#[instrument(skip_all, fields(nrql = %nrql))]
	pub async fn query<T>(&self, nrql: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let query_key = self.credential(self.config.query_key(), "query key")?;

		let url = query_url(self.config.query_base_url(), self.config.account_id(), nrql);
		let mut builder = Request::get(url).header(CONTENT_TYPE, APPLICATION_JSON);
		if let Some(key) = query_key {
			builder = builder.header(QUERY_KEY_HEADER, key_header(key)?);
		}
		let request = builder.body(Vec::new())?;

		let body = self.execute(request).await?;
		serde_json::from_slice(&body).map_err(|source| {
			let body = String::from_utf8_lossy(&body).into_owned();
			error!(error = %source, "Failed to decode Insights query response");
			InsightsError::Decode { source, body }
		})
	}

	/// [`query`](InsightsClient::query) into an untyped JSON value.
	pub async fn query_raw(&self, nrql: &str) -> Result<Value> {
		self.query(nrql).await
	}

	fn credential<'a>(
		&self,
		key: Option<&'a SecretString>,
		name: &'static str,
	) -> Result<Option<&'a SecretString>> {
		match key {
			Some(key) => Ok(Some(key)),
			None if self.config.external_auth() => {
				trace!(credential = name, "Leaving credential to the transport");
				Ok(None)
			}
			None => {
				error!(credential = name, "Credential not configured");
				Err(InsightsError::MissingCredential(name))
			}
		}
	}

	/// Sends the request and returns the body of a `200 OK` response.
	async fn execute(&self, request: Request<Vec<u8>>) -> Result<Bytes> {
		debug!(method = %request.method(), uri = %request.uri(), "Sending request to Insights");

		let response = self.transport.send(request).await?;

		let status = response.status();
		debug!(status = %status, "Received response from Insights");

		let body = response.into_body();
		if status != StatusCode::OK {
			let body = String::from_utf8_lossy(&body).into_owned();
			error!(status = status.as_u16(), body = %body, "Insights API error");
			return Err(InsightsError::UnexpectedStatus {
				status: status.as_u16(),
				body,
			});
		}

		trace!(body = %String::from_utf8_lossy(&body), "Response body");
		Ok(body)
	}
}

fn key_header(key: &SecretString) -> Result<HeaderValue> {
	sensitive_header(key).map_err(|e| InsightsError::InvalidRequest(e.into()))
}

impl fmt::Debug for InsightsClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InsightsClient")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}
