// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! New Relic Insights API client.
//!
//! Two operations, both a single HTTP round trip:
//!
//! - [`InsightsClient::publish`] inserts one custom event
//! - [`InsightsClient::query`] runs an NRQL query and decodes the JSON result
//!
//! ```no_run
//! use insights::{Attributes, ClientConfig, InsightsClient, QueryResponse};
//!
//! # async fn run() -> insights::Result<()> {
//! let config = ClientConfig::builder("1234567")
//!     .insert_key("NRII-...")
//!     .query_key("NRIQ-...")
//!     .build()?;
//! let client = InsightsClient::new(config)?;
//!
//! let attributes = Attributes::new()
//!     .insert("route", "/checkout")
//!     .insert("status", 200)
//!     .insert("elapsed", std::time::Duration::from_millis(42));
//! client.publish("PageView", &attributes).await?;
//!
//! let response: QueryResponse = client
//!     .query("SELECT average(elapsed) FROM PageView")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod client;
pub mod config;
pub mod error;
mod event;
mod query;
pub mod transport;
pub mod types;

pub use attributes::{AttributeValue, Attributes};
pub use client::InsightsClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{InsightsError, Result};
pub use event::MAX_ATTRIBUTES;
pub use insights_common_secret::SecretString;
pub use transport::{HeaderInjectingTransport, HttpTransport, ReqwestTransport, TransportError};
pub use types::QueryResponse;
