// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Directory group authorization.
//!
//! A check is two sequential anonymous round-trips to the directory:
//! `/user/<dn>` for the entry, then `/user/<dn>/groups` for its memberships.
//! Nothing is cached between checks.

use gatehouse_auth_core::{RequestContext, Result};
use serde::Deserialize;

use crate::directory::{Credential, DirectoryClient};

/// A user's directory entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DirectoryEntry {
	#[serde(default)]
	pub cn: String,
	#[serde(default)]
	pub dn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupMembership {
	pub name: String,
}

/// Result of a successful two-step lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryProfile {
	pub entry: DirectoryEntry,
	pub groups: Vec<GroupMembership>,
}

/// Checks directory group membership against a fixed allow-list.
#[derive(Debug, Clone)]
pub struct GroupAuthorizer {
	directory: DirectoryClient,
	allowed_groups: Vec<String>,
}

impl GroupAuthorizer {
	pub fn new(
		directory: DirectoryClient,
		allowed_groups: impl IntoIterator<Item = impl Into<String>>,
	) -> Self {
		Self {
			directory,
			allowed_groups: allowed_groups.into_iter().map(Into::into).collect(),
		}
	}

	pub fn allowed_groups(&self) -> &[String] {
		&self.allowed_groups
	}

	/// Fetch the entry for `user_key`, then its group memberships.
	#[tracing::instrument(skip(self, ctx))]
	pub async fn lookup(&self, ctx: &RequestContext, user_key: &str) -> Result<DirectoryProfile> {
		let entry_path = entry_path(user_key);

		let entry: DirectoryEntry = self
			.directory
			.fetch(ctx, &entry_path, Credential::Anonymous)
			.await?;
		let groups: Vec<GroupMembership> = self
			.directory
			.fetch(ctx, &format!("{entry_path}/groups"), Credential::Anonymous)
			.await?;

		tracing::debug!(cn = %entry.cn, group_count = groups.len(), "directory lookup complete");
		Ok(DirectoryProfile { entry, groups })
	}

	/// First membership, in directory order, whose name is on the allow-list.
	/// Comparison is exact and case-sensitive.
	pub fn first_allowed<'a>(&self, memberships: &'a [GroupMembership]) -> Option<&'a str> {
		memberships
			.iter()
			.map(|membership| membership.name.as_str())
			.find(|name| self.allowed_groups.iter().any(|allowed| allowed == name))
	}

	/// Whether `user_key` belongs to an allowed group.
	///
	/// Directory failures are logged and answered with `false`; an outage
	/// denies access rather than granting it or failing the request.
	#[tracing::instrument(skip(self, ctx))]
	pub async fn is_authorized(&self, ctx: &RequestContext, user_key: &str) -> bool {
		if user_key.is_empty() {
			tracing::debug!("no directory key on session, denying");
			return false;
		}
		if self.allowed_groups.is_empty() {
			tracing::debug!("allow-list is empty, denying");
			return false;
		}

		let profile = match self.lookup(ctx, user_key).await {
			Ok(profile) => profile,
			Err(err) => {
				tracing::warn!(error = %err, "directory lookup failed, denying");
				return false;
			}
		};

		match self.first_allowed(&profile.groups) {
			Some(group) => {
				tracing::debug!(group, "user is in an allowed group");
				true
			}
			None => {
				tracing::debug!("user is in none of the allowed groups");
				false
			}
		}
	}
}

/// `/user/<key>`. `%`, `?` and `#` are escaped so a key cannot spill into
/// the query or fragment.
fn entry_path(user_key: &str) -> String {
	let escaped = user_key
		.replace('%', "%25")
		.replace('?', "%3F")
		.replace('#', "%23");
	format!("/user/{escaped}")
}
