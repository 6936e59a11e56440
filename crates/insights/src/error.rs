// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the Insights client.

use insights_common_config::SecretEnvError;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by [`InsightsClient`](crate::InsightsClient) and its
/// configuration.
///
/// No error poisons the client; every call is independent.
#[derive(Debug, Error)]
pub enum InsightsError {
	/// Configuration was rejected before a client was built.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// A credential could not be read from the environment.
	#[error("could not load credentials: {0}")]
	Env(#[from] SecretEnvError),

	/// The default reqwest client could not be constructed.
	#[error("could not build HTTP client: {0}")]
	HttpClient(#[source] reqwest::Error),

	/// The operation needs a key that was never configured.
	#[error("no {0} configured")]
	MissingCredential(&'static str),

	/// The HTTP request could not be assembled.
	#[error("could not create request: {0}")]
	InvalidRequest(#[from] http::Error),

	/// The transport failed before a response arrived.
	#[error("could not make the request: {0}")]
	Transport(#[from] TransportError),

	/// The service answered with something other than 200 OK.
	#[error("request unsuccessful: {status} - {body}")]
	UnexpectedStatus { status: u16, body: String },

	/// An attribute value has no JSON representation.
	#[error("could not cast {value} of type {kind} to valid attributes (attribute {name:?})")]
	InvalidAttribute {
		name: String,
		value: String,
		kind: &'static str,
	},

	/// The event carries more attributes than the service accepts.
	#[error("too many attributes")]
	TooManyAttributes { count: usize },

	/// The event body could not be serialized.
	#[error("could not marshal the body: {0}")]
	Encode(#[source] serde_json::Error),

	/// A 200 response body did not decode into the requested type.
	#[error("could not unmarshal {body}: {source}")]
	Decode {
		#[source]
		source: serde_json::Error,
		body: String,
	},
}

impl InsightsError {
	/// Returns the HTTP status for [`InsightsError::UnexpectedStatus`].
	pub fn status(&self) -> Option<u16> {
		match self {
			InsightsError::UnexpectedStatus { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Result type alias for Insights operations.
pub type Result<T> = std::result::Result<T, InsightsError>;
