// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Criteo SSO authentication and directory-group authorization for Gatehouse.
//!
//! # Flow
//!
//! For each gateway request the provider answers three questions about the
//! user's [`Session`](gatehouse_auth_core::Session):
//!
//! 1. **Who is this?** The SSO `tokeninfo` endpoint maps the bearer token to
//!    an email and a directory DN. The answer is kept on the session, so the
//!    lookup happens once.
//!
//! 2. **Is the token still good?** The same endpoint is probed with the token;
//!    only `200 OK` counts.
//!
//! 3. **Is the user allowed in?** The directory is asked for the user's entry
//!    (`/user/<dn>`) and then its groups (`/user/<dn>/groups`). Any group on
//!    the configured allow-list grants access. Directory errors deny.
//!
//! Once the session expiry passes, [`refresh_session_if_needed`] repeats the
//! group check and either pushes the expiry one second forward or reports the
//! user as having left the allowed groups.
//!
//! # Example
//!
//! ```rust,no_run
//! use gatehouse_auth_core::{AuthProvider, RequestContext, Session};
//! use gatehouse_auth_criteo::{load_config_from_env, CriteoProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = CriteoProvider::new(load_config_from_env()?)?;
//! let ctx = RequestContext::new();
//!
//! let mut session = Session::new("access-token-from-redeem");
//! let email = provider.email_address(&ctx, &mut session).await?;
//! if !provider.validate_group(&ctx, &session).await {
//!     println!("{email} is not in an allowed group");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`refresh_session_if_needed`]: gatehouse_auth_core::AuthProvider::refresh_session_if_needed

mod config;
mod directory;
mod error;
mod groups;
mod profile;
mod provider;
mod sources;

pub use config::{
	parse_groups, CriteoConfig, CriteoConfigLayer, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SCOPE,
	PROVIDER_NAME,
};
pub use directory::{criteo_headers, Credential, DirectoryClient};
pub use error::ConfigError;
pub use groups::{DirectoryEntry, DirectoryProfile, GroupAuthorizer, GroupMembership};
pub use profile::{ProfileResolver, TokenInfo};
pub use provider::{CriteoProvider, SESSION_HEARTBEAT_SECS};
pub use sources::{
	load_config, load_config_from_env, load_from_sources, ConfigSource, DefaultsSource, EnvSource,
	Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};
