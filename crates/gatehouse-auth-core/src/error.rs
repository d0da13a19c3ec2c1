// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types shared by identity providers.

use gatehouse_common_http::Interrupted;
use thiserror::Error;

/// Failures surfaced by provider operations.
///
/// Group authorization never returns these; it folds directory failures into
/// a denial. Everything else propagates to the gateway unchanged.
#[derive(Debug, Error)]
pub enum AuthError {
	/// A call needed an access token and the session had none.
	#[error("missing access token")]
	MissingCredential,

	/// The access token cannot be carried in an HTTP header.
	#[error("access token is not a valid header value")]
	MalformedCredential,

	/// Transport failure talking to the provider or directory.
	#[error("remote service unavailable: {0}")]
	RemoteUnavailable(#[source] reqwest::Error),

	/// The remote answered with a non-success status.
	#[error("remote service returned {status}: {body}")]
	RemoteRejected { status: u16, body: String },

	/// The response body was not the JSON we expected.
	#[error("failed to decode response: {0}")]
	Decode(#[source] serde_json::Error),

	/// Introspection succeeded but returned no email.
	#[error("can't find email in token profile")]
	ProfileIncomplete,

	/// Refresh-time re-check found the user outside every allowed group.
	#[error("{email} is no longer in the group(s)")]
	GroupMembershipLost { email: String },

	/// The caller cancelled the request or its deadline passed.
	#[error("request cancelled")]
	Cancelled,

	/// A provider URL could not be built.
	#[error("invalid URL: {0}")]
	InvalidUrl(String),
}

impl From<Interrupted> for AuthError {
	fn from(_: Interrupted) -> Self {
		AuthError::Cancelled
	}
}

impl From<url::ParseError> for AuthError {
	fn from(err: url::ParseError) -> Self {
		AuthError::InvalidUrl(err.to_string())
	}
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, AuthError>;
