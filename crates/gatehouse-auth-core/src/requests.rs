// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generic request helpers every provider builds on.

use gatehouse_common_http::RequestContext;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AuthError, Result};

/// Send a prepared request and decode its JSON body.
///
/// Transport errors, non-success statuses and malformed bodies are reported
/// as distinct [`AuthError`] variants. The whole exchange, body included,
/// runs under `ctx`.
pub async fn request_json<T>(ctx: &RequestContext, request: reqwest::RequestBuilder) -> Result<T>
where
	T: DeserializeOwned,
{
	let exchange = async {
		let response = request.send().await.map_err(AuthError::RemoteUnavailable)?;
		let status = response.status();
		let body = response.text().await.map_err(AuthError::RemoteUnavailable)?;

		if !status.is_success() {
			tracing::debug!(status = status.as_u16(), "remote returned non-success status");
			return Err(AuthError::RemoteRejected {
				status: status.as_u16(),
				body,
			});
		}

		serde_json::from_str(&body).map_err(AuthError::Decode)
	};

	ctx.run(exchange).await?
}

/// Probe a provider's validation endpoint with an access token.
///
/// Returns `false` without a network call when the token is empty or no
/// validation endpoint is configured. When `headers` is empty the token is
/// sent as an `access_token` query parameter instead. Only a `200 OK`
/// counts as valid.
#[tracing::instrument(skip_all, fields(url = ?validate_url.map(Url::as_str)))]
pub async fn validate_token(
	ctx: &RequestContext,
	http: &reqwest::Client,
	validate_url: Option<&Url>,
	access_token: &str,
	headers: HeaderMap,
) -> bool {
	let Some(validate_url) = validate_url else {
		return false;
	};
	if access_token.is_empty() {
		return false;
	}

	let mut endpoint = validate_url.clone();
	if headers.is_empty() {
		endpoint
			.query_pairs_mut()
			.append_pair("access_token", access_token);
	}

	let request = http.get(endpoint).headers(headers);
	let response = match ctx.run(request.send()).await {
		Ok(Ok(response)) => response,
		Ok(Err(err)) => {
			tracing::warn!(error = %err, "token validation request failed");
			return false;
		}
		Err(interrupted) => {
			tracing::warn!(reason = %interrupted, "token validation interrupted");
			return false;
		}
	};

	let status = response.status();
	if status == reqwest::StatusCode::OK {
		return true;
	}

	let body = ctx
		.run(response.text())
		.await
		.ok()
		.and_then(|body| body.ok())
		.unwrap_or_default();
	tracing::warn!(status = status.as_u16(), body = %body, "token validation rejected");
	false
}

#[cfg(test)]
mod tests {
	use super::*;
	use reqwest::header::{HeaderValue, AUTHORIZATION};
	use serde::Deserialize;
	use wiremock::matchers::{header, method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[derive(Debug, Deserialize, PartialEq)]
	struct Probe {
		value: String,
	}

	fn bearer(token: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(
			AUTHORIZATION,
			HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
		);
		headers
	}

	#[tokio::test]
	async fn request_json_decodes_success() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/probe"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": "ok"})))
			.expect(1)
			.mount(&server)
			.await;

		let http = reqwest::Client::new();
		let probe: Probe = request_json(
			&RequestContext::new(),
			http.get(format!("{}/probe", server.uri())),
		)
		.await
		.unwrap();

		assert_eq!(probe.value, "ok");
	}

	#[tokio::test]
	async fn request_json_distinguishes_status_and_decode_failures() {
		let server = MockServer::start().await;
		Mock::given(path("/denied"))
			.respond_with(ResponseTemplate::new(403).set_body_string("nope"))
			.mount(&server)
			.await;
		Mock::given(path("/garbled"))
			.respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
			.mount(&server)
			.await;

		let http = reqwest::Client::new();
		let ctx = RequestContext::new();

		let denied = request_json::<Probe>(&ctx, http.get(format!("{}/denied", server.uri()))).await;
		assert!(matches!(
			denied,
			Err(AuthError::RemoteRejected { status: 403, ref body }) if body == "nope"
		));

		let garbled = request_json::<Probe>(&ctx, http.get(format!("{}/garbled", server.uri()))).await;
		assert!(matches!(garbled, Err(AuthError::Decode(_))));
	}

	#[tokio::test]
	async fn request_json_reports_transport_failure() {
		// Nothing listens on port 1.
		let http = reqwest::Client::new();
		let result =
			request_json::<Probe>(&RequestContext::new(), http.get("http://127.0.0.1:1/gone")).await;
		assert!(matches!(result, Err(AuthError::RemoteUnavailable(_))));
	}

	#[tokio::test]
	async fn validate_token_accepts_only_200() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/tokeninfo"))
			.and(header("Authorization", "Bearer good"))
			.respond_with(ResponseTemplate::new(200))
			.mount(&server)
			.await;
		Mock::given(method("GET"))
			.and(path("/tokeninfo"))
			.and(header("Authorization", "Bearer stale"))
			.respond_with(ResponseTemplate::new(401))
			.mount(&server)
			.await;

		let http = reqwest::Client::new();
		let ctx = RequestContext::new();
		let url = Url::parse(&format!("{}/tokeninfo", server.uri())).unwrap();

		assert!(validate_token(&ctx, &http, Some(&url), "good", bearer("good")).await);
		assert!(!validate_token(&ctx, &http, Some(&url), "stale", bearer("stale")).await);
	}

	#[tokio::test]
	async fn validate_token_falls_back_to_query_parameter() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/tokeninfo"))
			.and(query_param("access_token", "good"))
			.respond_with(ResponseTemplate::new(200))
			.expect(1)
			.mount(&server)
			.await;

		let http = reqwest::Client::new();
		let url = Url::parse(&format!("{}/tokeninfo", server.uri())).unwrap();

		assert!(validate_token(&RequestContext::new(), &http, Some(&url), "good", HeaderMap::new()).await);
	}

	#[tokio::test]
	async fn validate_token_skips_network_without_token_or_url() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200))
			.expect(0)
			.mount(&server)
			.await;

		let http = reqwest::Client::new();
		let ctx = RequestContext::new();
		let url = Url::parse(&format!("{}/tokeninfo", server.uri())).unwrap();

		assert!(!validate_token(&ctx, &http, Some(&url), "", bearer("")).await);
		assert!(!validate_token(&ctx, &http, None, "good", bearer("good")).await);
	}
}
