// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration primitives shared by the Insights crates.
//!
//! - [`SecretString`]: redacting credential wrapper (re-exported from
//!   [`insights_common_secret`])
//! - [`load_secret_env`] / [`require_secret_env`]: read a credential from
//!   `VAR` or from the file named by `VAR_FILE`

pub mod env;

pub use insights_common_secret::{Secret, SecretString, REDACTED};

pub use env::{load_secret_env, require_secret_env, RequiredSecretError, SecretEnvError};
