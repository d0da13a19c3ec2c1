// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Criteo provider configuration.
//!
//! A [`CriteoConfigLayer`] is a partial view (all fields optional) read from
//! one source. Layers are merged in precedence order and then finalized into
//! a [`CriteoConfig`], which fills in the Criteo SSO endpoint defaults.

use std::time::Duration;

use gatehouse_auth_core::ProviderData;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const PROVIDER_NAME: &str = "Criteo";
pub const DEFAULT_SCOPE: &str = "cn mail uid dn umsId";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SSO_REALM_QUERY: &str = "realm=criteo";
const AUTHORIZE_PATH: &str = "/auth/oauth2/authorize";
const ACCESS_TOKEN_PATH: &str = "/auth/oauth2/access_token";
const TOKENINFO_PATH: &str = "/auth/oauth2/tokeninfo";

/// Fully resolved Criteo configuration. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteoConfig {
	pub provider: ProviderData,
	/// Base of the directory service; user entries live under `/user/`.
	pub directory_url: Url,
	pub allowed_groups: Vec<String>,
	pub request_timeout: Duration,
}

impl CriteoConfig {
	/// Configuration from the SSO host, directory host and allow-list, with
	/// every endpoint defaulted.
	pub fn new(
		sso_host: impl Into<String>,
		identity_host: impl Into<String>,
		groups: impl IntoIterator<Item = impl Into<String>>,
	) -> Result<Self, ConfigError> {
		CriteoConfigLayer {
			sso_host: Some(sso_host.into()),
			identity_host: Some(identity_host.into()),
			groups: Some(groups.into_iter().map(Into::into).collect()),
			..CriteoConfigLayer::default()
		}
		.finalize()
	}

	/// Check invariants that hand-built configurations can break: every
	/// endpoint is an absolute `http(s)` URL and the request timeout is
	/// non-zero.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.request_timeout.is_zero() {
			return Err(ConfigError::InvalidConfig(
				"request_timeout_secs must be greater than zero".to_string(),
			));
		}

		let endpoints = [
			("login_url", Some(&self.provider.login_url)),
			("redeem_url", Some(&self.provider.redeem_url)),
			("profile_url", Some(&self.provider.profile_url)),
			("validate_url", self.provider.validate_url.as_ref()),
			("identity_url", Some(&self.directory_url)),
		];
		for (field, url) in endpoints {
			let Some(url) = url else { continue };
			if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
				return Err(ConfigError::InvalidConfig(format!(
					"{field} must be an http(s) URL, got {url}"
				)));
			}
		}

		if self.allowed_groups.iter().any(|group| group.trim().is_empty()) {
			return Err(ConfigError::InvalidConfig(
				"allowed groups must not contain blank names".to_string(),
			));
		}
		Ok(())
	}
}

/// Criteo configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CriteoConfigLayer {
	#[serde(default)]
	pub sso_host: Option<String>,
	#[serde(default)]
	pub identity_host: Option<String>,
	#[serde(default)]
	pub groups: Option<Vec<String>>,
	#[serde(default)]
	pub client_id: Option<String>,
	#[serde(default)]
	pub scope: Option<String>,
	#[serde(default)]
	pub login_url: Option<String>,
	#[serde(default)]
	pub redeem_url: Option<String>,
	#[serde(default)]
	pub profile_url: Option<String>,
	#[serde(default)]
	pub validate_url: Option<String>,
	#[serde(default)]
	pub identity_url: Option<String>,
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
}

impl CriteoConfigLayer {
	/// Overlay `other` on top of `self`; set fields in `other` win.
	pub fn merge(&mut self, other: CriteoConfigLayer) {
		macro_rules! overlay {
			($($field:ident),* $(,)?) => {
				$(
					if other.$field.is_some() {
						self.$field = other.$field;
					}
				)*
			};
		}

		overlay!(
			sso_host,
			identity_host,
			groups,
			client_id,
			scope,
			login_url,
			redeem_url,
			profile_url,
			validate_url,
			identity_url,
			request_timeout_secs,
		);
	}

	pub fn finalize(self) -> Result<CriteoConfig, ConfigError> {
		let sso_host = self.sso_host.filter(|host| !host.is_empty());

		let login_url = endpoint("login_url", self.login_url, sso_host.as_deref(), AUTHORIZE_PATH)?;
		let redeem_url =
			endpoint("redeem_url", self.redeem_url, sso_host.as_deref(), ACCESS_TOKEN_PATH)?;
		let profile_url =
			endpoint("profile_url", self.profile_url, sso_host.as_deref(), TOKENINFO_PATH)?;
		let validate_url = match self.validate_url {
			Some(raw) => parse_url("validate_url", &raw)?,
			None => profile_url.clone(),
		};

		let directory_url = match (self.identity_url, self.identity_host) {
			(Some(raw), _) => parse_url("identity_url", &raw)?,
			(None, Some(host)) if !host.is_empty() => {
				parse_url("identity_host", &format!("http://{host}"))?
			}
			_ => return Err(ConfigError::MissingSetting("identity_host")),
		};

		let allowed_groups: Vec<String> = self
			.groups
			.unwrap_or_default()
			.into_iter()
			.map(|group| group.trim().to_string())
			.filter(|group| !group.is_empty())
			.collect();
		if allowed_groups.is_empty() {
			tracing::warn!("no allowed groups configured; every group check will deny");
		}

		let request_timeout = self
			.request_timeout_secs
			.map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs);

		let scope = self
			.scope
			.filter(|scope| !scope.trim().is_empty())
			.unwrap_or_else(|| DEFAULT_SCOPE.to_string());

		let config = CriteoConfig {
			provider: ProviderData {
				provider_name: PROVIDER_NAME.to_string(),
				client_id: self.client_id.unwrap_or_default(),
				scope,
				login_url,
				redeem_url,
				profile_url,
				validate_url: Some(validate_url),
			},
			directory_url,
			allowed_groups,
			request_timeout,
		};
		config.validate()?;
		Ok(config)
	}
}

/// Split a group list written as `"eng, ops"` or `"eng ops"`.
pub fn parse_groups(raw: &str) -> Vec<String> {
	raw
		.split([' ', ','])
		.map(str::trim)
		.filter(|group| !group.is_empty())
		.map(str::to_string)
		.collect()
}

fn endpoint(
	field: &'static str,
	explicit: Option<String>,
	sso_host: Option<&str>,
	path: &str,
) -> Result<Url, ConfigError> {
	match (explicit, sso_host) {
		(Some(raw), _) => parse_url(field, &raw),
		(None, Some(host)) => parse_url(field, &format!("https://{host}{path}?{SSO_REALM_QUERY}")),
		(None, None) => Err(ConfigError::MissingSetting("sso_host")),
	}
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })
}
