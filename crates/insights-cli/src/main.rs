// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! `insights` command-line tool.
//!
//! Credentials come from `INSIGHTS_INSERT_KEY` / `INSIGHTS_QUERY_KEY` (or their
//! `_FILE` variants), optionally via a `.env` file in the working directory.

mod attr;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use insights::config::{INSERT_KEY_ENV, QUERY_KEY_ENV};
use insights::{Attributes, ClientConfig, InsightsClient};
use insights_common_config::require_secret_env;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::attr::parse_attribute;

#[derive(Parser, Debug)]
#[command(name = "insights", version, about = "Publish events to and query New Relic Insights", long_about = None)]
struct Args {
	/// Insights account id
	#[arg(long, env = "INSIGHTS_ACCOUNT_ID")]
	account_id: String,

	/// Override the insert API base URL
	#[arg(long, env = "INSIGHTS_INSERT_URL")]
	insert_url: Option<String>,

	/// Override the query API base URL
	#[arg(long, env = "INSIGHTS_QUERY_URL")]
	query_url: Option<String>,

	/// Request timeout in seconds
	#[arg(long, default_value_t = 10)]
	timeout_secs: u64,

	/// Emit logs as JSON
	#[arg(long)]
	json: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Publish a single event
	Insert {
		/// Event type, e.g. "PageView"
		event_type: String,

		/// Attribute as KEY=VALUE; the value type is inferred
		#[arg(long = "attr", short = 'a', value_name = "KEY=VALUE")]
		attributes: Vec<String>,

		/// Add the current time under KEY
		#[arg(long, value_name = "KEY")]
		now: Vec<String>,
	},

	/// Run an NRQL query and print the JSON result
	Query {
		/// NRQL query string
		nrql: String,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	// Before parsing, so env-backed flags see .env values.
	dotenvy::dotenv().ok();

	let args = Args::parse();
	init_tracing(args.json);

	let config = build_config(&args)?;
	let client = InsightsClient::new(config).context("could not create Insights client")?;

	match args.command {
		Command::Insert {
			event_type,
			attributes,
			now,
		} => {
			let attributes = collect_attributes(&attributes, &now)?;
			client
				.publish(&event_type, &attributes)
				.await
				.with_context(|| format!("could not publish {event_type} event"))?;
			info!(event_type = %event_type, attribute_count = attributes.len(), "Published event");
		}
		Command::Query { nrql } => {
			let result = client
				.query_raw(&nrql)
				.await
				.context("query failed")?;
			println!("{}", serde_json::to_string_pretty(&result)?);
		}
	}

	Ok(())
}

fn init_tracing(json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let registry = tracing_subscriber::registry().with(filter);

	if json {
		registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init();
	}
}

/// Builds the configuration, requiring only the key the subcommand uses.
fn build_config(args: &Args) -> Result<ClientConfig> {
	let builder = ClientConfig::builder(&args.account_id).timeout(Duration::from_secs(args.timeout_secs));
	let mut builder = match args.command {
		Command::Insert { .. } => builder.insert_key(require_secret_env(INSERT_KEY_ENV)?),
		Command::Query { .. } => builder.query_key(require_secret_env(QUERY_KEY_ENV)?),
	};

	if let Some(url) = &args.insert_url {
		builder = builder.insert_base_url(url);
	}
	if let Some(url) = &args.query_url {
		builder = builder.query_base_url(url);
	}

	let config = builder.build()?;
	debug!(?config, "Loaded configuration");
	Ok(config)
}

fn collect_attributes(raw: &[String], now_keys: &[String]) -> Result<Attributes> {
	let mut attributes = Attributes::new();
	for arg in raw {
		let (name, value) = parse_attribute(arg)?;
		attributes.set(name, value);
	}

	let now = chrono::Utc::now();
	for key in now_keys {
		attributes.set(key.as_str(), now);
	}
	Ok(attributes)
}
