// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The capability interface the gateway drives for each identity provider.

use async_trait::async_trait;
use gatehouse_common_http::RequestContext;
use url::Url;

use crate::error::Result;
use crate::session::Session;

/// Static, provider-level settings resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderData {
	pub provider_name: String,
	pub client_id: String,
	pub scope: String,
	pub login_url: Url,
	pub redeem_url: Url,
	pub profile_url: Url,
	/// `None` disables remote token validation.
	pub validate_url: Option<Url>,
}

impl ProviderData {
	/// Browser redirect that starts the authorization-code flow.
	///
	/// Query parameters already on the login URL (such as a realm) are kept.
	pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
		let mut url = self.login_url.clone();

		url
			.query_pairs_mut()
			.append_pair("approval_prompt", "force")
			.append_pair("client_id", &self.client_id)
			.append_pair("redirect_uri", redirect_uri)
			.append_pair("response_type", "code")
			.append_pair("scope", &self.scope)
			.append_pair("state", state);

		url.to_string()
	}
}

/// What the gateway needs from an identity provider.
///
/// Implementations are immutable after construction and shared across
/// concurrent requests.
#[async_trait]
pub trait AuthProvider: Send + Sync {
	fn data(&self) -> &ProviderData;

	/// Fill in `session.email` and `session.user`, skipping the lookup when
	/// both are already set.
	async fn resolve_profile(&self, ctx: &RequestContext, session: &mut Session) -> Result<()>;

	async fn email_address(&self, ctx: &RequestContext, session: &mut Session) -> Result<String> {
		self.resolve_profile(ctx, session).await?;
		Ok(session.email.clone())
	}

	async fn user_name(&self, ctx: &RequestContext, session: &mut Session) -> Result<String> {
		self.resolve_profile(ctx, session).await?;
		Ok(session.user.clone())
	}

	/// Whether the session's access token is still accepted by the provider.
	async fn validate_session(&self, ctx: &RequestContext, session: &Session) -> bool;

	/// Whether the session's user belongs to an allowed group.
	async fn validate_group(&self, ctx: &RequestContext, session: &Session) -> bool;

	/// Returns `Ok(true)` only when new tokens were obtained.
	async fn refresh_session_if_needed(
		&self,
		ctx: &RequestContext,
		session: Option<&mut Session>,
	) -> Result<bool>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn data() -> ProviderData {
		let login_url =
			Url::parse("https://sso.example.com/auth/oauth2/authorize?realm=criteo").unwrap();
		ProviderData {
			provider_name: "Test".to_string(),
			client_id: "gateway".to_string(),
			scope: "cn mail".to_string(),
			redeem_url: login_url.clone(),
			profile_url: login_url.clone(),
			validate_url: None,
			login_url,
		}
	}

	#[test]
	fn authorization_url_keeps_realm_and_adds_params() {
		let url = Url::parse(&data().authorization_url("https://gw.example.com/cb", "xyz")).unwrap();
		let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

		assert_eq!(pairs[0], ("realm".to_string(), "criteo".to_string()));
		assert!(pairs.contains(&("client_id".to_string(), "gateway".to_string())));
		assert!(pairs.contains(&(
			"redirect_uri".to_string(),
			"https://gw.example.com/cb".to_string()
		)));
		assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
		assert!(pairs.contains(&("scope".to_string(), "cn mail".to_string())));
		assert!(pairs.contains(&("state".to_string(), "xyz".to_string())));
	}
}
