// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wrapper for Insights credentials that keeps them out of logs.
//!
//! Insert keys and query keys travel through configuration structs that are
//! routinely printed with `{:?}` and recorded in `tracing` spans. [`Secret<T>`]
//! makes that safe:
//!
//! - `Debug` and `Display` render `[REDACTED]`
//! - the inner value is zeroized on drop
//! - the value is only reachable through an explicit [`Secret::expose`]
//!
//! ```
//! use insights_common_secret::SecretString;
//!
//! let insert_key = SecretString::from("NRII-abc123");
//!
//! assert_eq!(format!("{insert_key:?}"), "Secret(\"[REDACTED]\")");
//! assert_eq!(format!("{insert_key}"), "[REDACTED]");
//! assert_eq!(insert_key.expose(), "NRII-abc123");
//! ```

use std::fmt;
use zeroize::Zeroize;

/// Placeholder printed in place of every secret.
pub const REDACTED: &str = "[REDACTED]";

/// A sensitive value that never prints itself.
///
/// There is no `Deref` impl; call sites that need the value must call
/// [`expose`](Secret::expose), which keeps credential use greppable.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// The common case: a secret string such as an API key.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Explicitly access the inner value.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl SecretString {
	/// Returns true if the secret is an empty string.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

// `tracing::Value` is sealed. Structured fields go through Display (`%key`) or
// Debug (`?key`), and both are redacted above.
