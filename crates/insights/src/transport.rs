// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The HTTP seam between [`InsightsClient`](crate::InsightsClient) and the
//! network.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, InvalidHeaderValue};
use http::{HeaderMap, Request, Response};
use insights_common_secret::SecretString;
use thiserror::Error;
use tracing::{debug, error};

/// Errors raised by an [`HttpTransport`].
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("request timed out")]
	Timeout,

	#[error("network error: {0}")]
	Network(#[source] reqwest::Error),

	#[error("could not read body: {0}")]
	Body(#[source] reqwest::Error),

	#[error("{0}")]
	Other(String),
}

impl TransportError {
	fn from_send(e: reqwest::Error) -> Self {
		if e.is_timeout() {
			error!("Request timed out");
			return TransportError::Timeout;
		}
		error!(error = %e, "Network error during Insights request");
		TransportError::Network(e)
	}

	fn from_body(e: reqwest::Error) -> Self {
		if e.is_timeout() {
			error!("Timed out reading response body");
			return TransportError::Timeout;
		}
		error!(error = %e, "Failed to read response body");
		TransportError::Body(e)
	}
}

/// Sends one HTTP request and returns the complete response.
///
/// Implementations must drain the response body before returning. This is
/// the place to swap in test doubles or alternative authentication.
#[async_trait]
pub trait HttpTransport: Send + Sync {
	async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Bytes>, TransportError>;
}

#[async_trait]
impl<T> HttpTransport for Arc<T>
where
	T: HttpTransport + ?Sized,
{
	async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Bytes>, TransportError> {
		(**self).send(request).await
	}
}

/// Production transport backed by [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	/// Builds a transport with the standard User-Agent and request timeout.
	pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
		let client = insights_common_http::new_client_with_timeout(timeout)?;
		Ok(Self { client })
	}

	/// Wraps an existing client, keeping whatever settings it carries.
	pub fn from_client(client: reqwest::Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
	async fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Bytes>, TransportError> {
		let request = reqwest::Request::try_from(request).map_err(|e| {
			error!(error = %e, "Could not convert request");
			TransportError::Other(format!("invalid request: {e}"))
		})?;

		let response = self
			.client
			.execute(request)
			.await
			.map_err(TransportError::from_send)?;

		let status = response.status();
		let headers = response.headers().clone();
		let body = response.bytes().await.map_err(TransportError::from_body)?;

		let mut out = Response::new(body);
		*out.status_mut() = status;
		*out.headers_mut() = headers;
		Ok(out)
	}
}

/// Sets fixed headers on every request before handing it to `inner`.
///
/// Lets credentials come from somewhere other than
/// [`ClientConfig`](crate::ClientConfig); pair it with
/// [`ClientConfigBuilder::external_auth`](crate::ClientConfigBuilder::external_auth).
/// Injected headers replace any the client already set.
///
/// ```
/// use insights::{HeaderInjectingTransport, ReqwestTransport, SecretString};
/// use std::time::Duration;
///
/// let key = SecretString::from("NRIQ-...");
/// let transport = HeaderInjectingTransport::new(ReqwestTransport::new(Duration::from_secs(10))?)
///     .with_secret_header("X-Query-Key", &key)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct HeaderInjectingTransport<T> {
	inner: T,
	headers: HeaderMap,
}

impl<T> HeaderInjectingTransport<T> {
	pub fn new(inner: T) -> Self {
		Self {
			inner,
			headers: HeaderMap::new(),
		}
	}

	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);
		self
	}

	/// Adds a header whose value is marked sensitive and never printed.
	pub fn with_secret_header(self, name: &str, secret: &SecretString) -> Result<Self, http::Error> {
		let name = HeaderName::from_bytes(name.as_bytes())?;
		let value = sensitive_header(secret)?;
		Ok(self.with_header(name, value))
	}
}

impl<T> fmt::Debug for HeaderInjectingTransport<T>
where
	T: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HeaderInjectingTransport")
			.field("inner", &self.inner)
			.field("headers", &self.headers.keys().collect::<Vec<_>>())
			.finish()
	}
}

#[async_trait]
impl<T> HttpTransport for HeaderInjectingTransport<T>
where
	T: HttpTransport,
{
	async fn send(&self, mut request: Request<Vec<u8>>) -> Result<Response<Bytes>, TransportError> {
		for (name, value) in &self.headers {
			request.headers_mut().insert(name.clone(), value.clone());
		}
		debug!(injected = self.headers.len(), "Injected transport headers");
		self.inner.send(request).await
	}
}

/// Converts a secret into a header value flagged as sensitive.
pub(crate) fn sensitive_header(secret: &SecretString) -> Result<HeaderValue, InvalidHeaderValue> {
	let mut value = HeaderValue::from_str(secret.expose())?;
	value.set_sensitive(true);
	Ok(value)
}
