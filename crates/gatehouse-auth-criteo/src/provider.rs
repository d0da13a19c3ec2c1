// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Criteo provider: session validation, group checks and refresh.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use gatehouse_auth_core::{
	validate_token, AuthError, AuthProvider, ProviderData, RequestContext, Result, Session,
};

use crate::config::CriteoConfig;
use crate::directory::{criteo_headers, DirectoryClient};
use crate::error::ConfigError;
use crate::groups::GroupAuthorizer;
use crate::profile::ProfileResolver;

/// How far a successful refresh pushes the session expiry.
///
/// No token is exchanged on refresh; the short extension makes the gateway
/// come back and re-check group membership about once a second.
pub const SESSION_HEARTBEAT_SECS: i64 = 1;

#[derive(Debug, Clone)]
pub struct CriteoProvider {
	data: ProviderData,
	http: reqwest::Client,
	profiles: ProfileResolver,
	groups: GroupAuthorizer,
}

impl CriteoProvider {
	/// Build the provider with a fresh HTTP client honouring the configured
	/// request timeout.
	#[tracing::instrument(skip_all, name = "CriteoProvider::new")]
	pub fn new(config: CriteoConfig) -> std::result::Result<Self, ConfigError> {
		config.validate()?;
		let http = gatehouse_common_http::new_client_with_timeout(config.request_timeout)
			.map_err(ConfigError::HttpClient)?;
		Ok(Self::with_client(config, http))
	}

	/// Build the provider around an existing HTTP client.
	pub fn with_client(config: CriteoConfig, http: reqwest::Client) -> Self {
		let directory = DirectoryClient::new(http.clone(), config.directory_url);
		let profiles = ProfileResolver::new(directory.clone(), config.provider.profile_url.clone());
		let groups = GroupAuthorizer::new(directory, config.allowed_groups);

		Self {
			data: config.provider,
			http,
			profiles,
			groups,
		}
	}

	pub fn group_authorizer(&self) -> &GroupAuthorizer {
		&self.groups
	}

	/// Browser redirect to Criteo SSO.
	pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
		self.data.authorization_url(redirect_uri, state)
	}
}

fn heartbeat_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
	(now + chrono::Duration::seconds(SESSION_HEARTBEAT_SECS)).trunc_subsecs(0)
}

#[async_trait]
impl AuthProvider for CriteoProvider {
	fn data(&self) -> &ProviderData {
		&self.data
	}

	async fn resolve_profile(&self, ctx: &RequestContext, session: &mut Session) -> Result<()> {
		self.profiles.resolve(ctx, session).await
	}

	#[tracing::instrument(skip_all, fields(email = %session.email))]
	async fn validate_session(&self, ctx: &RequestContext, session: &Session) -> bool {
		let token = session.access_token.expose();
		let headers = match criteo_headers(token) {
			Ok(headers) => headers,
			Err(err) => {
				tracing::warn!(error = %err, "cannot validate session");
				return false;
			}
		};

		validate_token(ctx, &self.http, self.data.validate_url.as_ref(), token, headers).await
	}

	async fn validate_group(&self, ctx: &RequestContext, session: &Session) -> bool {
		self.groups.is_authorized(ctx, &session.user).await
	}

	/// Re-check group membership once the session expiry has passed.
	///
	/// Skipped (returning `Ok(false)`) when there is no session, no refresh
	/// token, or the expiry is still ahead. Otherwise the user must still be
	/// in an allowed group or the session is reported as
	/// [`AuthError::GroupMembershipLost`] with its expiry untouched. When the
	/// check passes the expiry moves to one second from now, truncated to the
	/// second. Tokens are never exchanged here, so the result is always
	/// `Ok(false)` on success.
	#[tracing::instrument(skip_all)]
	async fn refresh_session_if_needed(
		&self,
		ctx: &RequestContext,
		session: Option<&mut Session>,
	) -> Result<bool> {
		let Some(session) = session else {
			return Ok(false);
		};
		if session.expires_after(Utc::now()) || !session.has_refresh_token() {
			return Ok(false);
		}

		if !self.validate_group(ctx, session).await {
			if ctx.is_done() {
				return Err(AuthError::Cancelled);
			}
			tracing::warn!(email = %session.email, user = %session.user, "user left the allowed groups");
			return Err(AuthError::GroupMembershipLost {
				email: session.email.clone(),
			});
		}

		let previous = session.expires_on;
		let expires_on = heartbeat_expiry(Utc::now());
		session.expires_on = Some(expires_on);

		tracing::info!(
			email = %session.email,
			previous_expiry = ?previous,
			%expires_on,
			"group membership confirmed, session expiry extended"
		);
		Ok(false)
	}
}
