// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for bearer tokens, refresh tokens and client credentials.
//!
//! Gateway sessions carry opaque tokens that must reach the identity provider
//! but never a log line. [`Secret<T>`] keeps the value behind an explicit
//! [`Secret::expose`] call, prints `[REDACTED]` through `Debug`, `Display` and
//! `Serialize`, and zeroes its memory on drop.
//!
//! ```
//! use gatehouse_common_secret::SecretString;
//!
//! let token = SecretString::new("at-12345".to_string());
//! assert_eq!(format!("{token}"), "[REDACTED]");
//! assert_eq!(token.expose(), "at-12345");
//! ```

use std::fmt;
use zeroize::Zeroize;

/// Placeholder printed instead of any secret value.
pub const REDACTED: &str = "[REDACTED]";

/// A value that must not be logged or serialized in clear text.
///
/// There is no `Deref`; callers reach the value through [`Secret::expose`] so
/// every use of a raw token is visible at the call site.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// Tokens and credentials are strings in every provider we talk to.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Borrow the wrapped value.
	pub fn expose(&self) -> &T {
		&self.inner
	}

	/// Replace the wrapped value, zeroing the previous one.
	pub fn replace(&mut self, inner: T) {
		self.inner.zeroize();
		self.inner = inner;
	}
}

impl SecretString {
	/// An empty token, as held by sessions that have not been issued one.
	pub fn empty() -> Self {
		Self::new(String::new())
	}

	/// Whether the token is missing.
	///
	/// Identity providers answer an empty bearer token with a generic 401, so
	/// callers check this before spending a round-trip.
	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl Default for SecretString {
	fn default() -> Self {
		Self::empty()
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
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

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Secret<T>
	where
		T: Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}
