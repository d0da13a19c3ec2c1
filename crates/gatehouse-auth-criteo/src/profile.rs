// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session identity from the SSO tokeninfo endpoint.

use gatehouse_auth_core::{AuthError, RequestContext, Result, Session};
use serde::Deserialize;
use url::Url;

use crate::directory::{Credential, DirectoryClient};

/// Tokeninfo response body. Missing or null fields decode as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenInfo {
	#[serde(default, rename = "mail")]
	pub email: Option<String>,
	#[serde(default, rename = "dn")]
	pub user: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileResolver {
	directory: DirectoryClient,
	profile_url: Url,
}

impl ProfileResolver {
	pub fn new(directory: DirectoryClient, profile_url: Url) -> Self {
		Self {
			directory,
			profile_url,
		}
	}

	/// Fill `session.email` and `session.user` from the tokeninfo endpoint.
	///
	/// A session that already has both is left alone with no request made.
	#[tracing::instrument(skip_all)]
	pub async fn resolve(&self, ctx: &RequestContext, session: &mut Session) -> Result<()> {
		if session.has_profile() {
			return Ok(());
		}
		if session.access_token.is_empty() {
			return Err(AuthError::MissingCredential);
		}

		let info: TokenInfo = self
			.directory
			.get_json(
				ctx,
				self.profile_url.clone(),
				Credential::Bearer(&session.access_token),
			)
			.await?;

		session.email = info.email.unwrap_or_default();
		session.user = info.user.unwrap_or_default();
		if session.email.is_empty() {
			return Err(AuthError::ProfileIncomplete);
		}

		tracing::debug!(email = %session.email, user = %session.user, "resolved session profile");
		Ok(())
	}
}
