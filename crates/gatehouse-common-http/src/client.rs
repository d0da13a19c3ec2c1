// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Creates a new HTTP client builder with the standard Gatehouse User-Agent.
///
/// Providers customise the builder (timeouts, proxies) and own the error
/// from `build()`.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates an HTTP client with a per-request timeout and the standard
/// User-Agent.
pub fn new_client_with_timeout(timeout: Duration) -> reqwest::Result<Client> {
	builder().timeout(timeout).build()
}

/// Returns the standard Gatehouse User-Agent string.
///
/// Format: `gatehouse/{os}-{arch}/{version}`
pub fn user_agent() -> String {
	format!(
		"gatehouse/{}-{}/{}",
		std::env::consts::OS,
		std::env::consts::ARCH,
		env!("CARGO_PKG_VERSION")
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_has_correct_format() {
		let ua = user_agent();
		let parts: Vec<&str> = ua.split('/').collect();
		assert_eq!(parts.len(), 3);
		assert_eq!(parts[0], "gatehouse");
		assert!(parts[1].contains('-'));
		assert_eq!(parts[2], env!("CARGO_PKG_VERSION"));
	}

	#[test]
	fn client_with_timeout_builds() {
		assert!(new_client_with_timeout(Duration::from_secs(5)).is_ok());
	}
}
