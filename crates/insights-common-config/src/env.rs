// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Loading credentials from the process environment.
//!
//! Insert and query keys can be given directly (`INSIGHTS_INSERT_KEY=...`) or
//! through a mounted file (`INSIGHTS_INSERT_KEY_FILE=/run/secrets/insert_key`),
//! the convention used by Docker and Kubernetes secrets.

use std::path::PathBuf;
use std::{env, fs};

use insights_common_secret::SecretString;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Load a secret using the `VAR` / `VAR_FILE` convention.
///
/// `VAR_FILE` wins over `VAR`. File contents have a single trailing newline
/// stripped. Returns `Ok(None)` when neither variable is set.
///
/// ```no_run
/// use insights_common_config::load_secret_env;
///
/// if let Some(key) = load_secret_env("INSIGHTS_INSERT_KEY")? {
///     println!("insert key: {key}"); // prints "[REDACTED]"
/// }
/// # Ok::<(), insights_common_config::SecretEnvError>(())
/// ```
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|source| SecretEnvError::Io {
			path: path.clone(),
			source,
		})?;

		debug!(var = %file_var, path = %path.display(), "Loaded secret from file");
		let secret = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(SecretString::new(secret)));
	}

	if let Ok(value) = env::var(var) {
		debug!(var = %var, "Loaded secret from environment");
		return Ok(Some(SecretString::new(value)));
	}

	Ok(None)
}

/// Like [`load_secret_env`], but a missing secret is an error.
pub fn require_secret_env(var: &str) -> Result<SecretString, RequiredSecretError> {
	load_secret_env(var)?.ok_or_else(|| RequiredSecretError::Missing {
		var: var.to_string(),
		file_var: format!("{var}_FILE"),
	})
}

#[derive(Debug, Error)]
pub enum RequiredSecretError {
	#[error("required secret not found: set either {var} or {file_var}")]
	Missing { var: String, file_var: String },

	#[error(transparent)]
	Load(#[from] SecretEnvError),
}
