// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Gateway session state as seen by identity providers.

use chrono::{DateTime, Utc};
use gatehouse_common_secret::SecretString;

/// A user session owned by the gateway.
///
/// Providers never create or drop sessions; they fill in `email` and `user`
/// and move `expires_on`.
#[derive(Debug, Clone, Default)]
pub struct Session {
	pub access_token: SecretString,
	/// Absent and empty are equivalent.
	pub refresh_token: Option<SecretString>,
	pub email: String,
	/// Directory lookup key (a DN for LDAP-backed providers).
	pub user: String,
	/// `None` means never expires, or not yet set.
	pub expires_on: Option<DateTime<Utc>>,
	pub created_at: Option<DateTime<Utc>>,
}

impl Session {
	pub fn new(access_token: impl Into<SecretString>) -> Self {
		Self {
			access_token: access_token.into(),
			created_at: Some(Utc::now()),
			..Self::default()
		}
	}

	pub fn with_refresh_token(mut self, refresh_token: impl Into<SecretString>) -> Self {
		self.refresh_token = Some(refresh_token.into());
		self
	}

	pub fn with_expires_on(mut self, expires_on: DateTime<Utc>) -> Self {
		self.expires_on = Some(expires_on);
		self
	}

	pub fn with_profile(mut self, email: impl Into<String>, user: impl Into<String>) -> Self {
		self.email = email.into();
		self.user = user.into();
		self
	}

	/// Both identity attributes are known; profile lookups can be skipped.
	pub fn has_profile(&self) -> bool {
		!self.email.is_empty() && !self.user.is_empty()
	}

	pub fn has_refresh_token(&self) -> bool {
		self
			.refresh_token
			.as_ref()
			.is_some_and(|token| !token.is_empty())
	}

	/// Whether an expiry is set and still ahead of `now`.
	pub fn expires_after(&self, now: DateTime<Utc>) -> bool {
		self.expires_on.is_some_and(|expires_on| expires_on > now)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	#[test]
	fn profile_requires_both_fields() {
		let session = Session::new("at");
		assert!(!session.has_profile());
		assert!(!session.clone().with_profile("a@b.c", "").has_profile());
		assert!(!session.clone().with_profile("", "uid=a").has_profile());
		assert!(session.with_profile("a@b.c", "uid=a").has_profile());
	}

	#[test]
	fn empty_refresh_token_counts_as_absent() {
		assert!(!Session::new("at").has_refresh_token());
		assert!(!Session::new("at").with_refresh_token("").has_refresh_token());
		assert!(Session::new("at").with_refresh_token("rt").has_refresh_token());
	}

	#[test]
	fn expiry_checks() {
		let now = Utc::now();
		assert!(!Session::new("at").expires_after(now));
		assert!(Session::new("at")
			.with_expires_on(now + Duration::minutes(5))
			.expires_after(now));
		assert!(!Session::new("at")
			.with_expires_on(now - Duration::minutes(5))
			.expires_after(now));
	}

	#[test]
	fn debug_hides_tokens() {
		let session = Session::new("at-secret-1").with_refresh_token("rt-secret-1");
		let debug = format!("{session:?}");
		assert!(!debug.contains("at-secret-1"));
		assert!(!debug.contains("rt-secret-1"));
	}
}
