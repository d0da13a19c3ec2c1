// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JSON GET client for the Criteo SSO and directory services.

use gatehouse_auth_core::{request_json, AuthError, RequestContext, Result};
use gatehouse_common_secret::SecretString;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use url::Url;

/// How a request authenticates.
#[derive(Debug, Clone, Copy)]
pub enum Credential<'a> {
	/// No `Authorization` header; the directory trusts network-level access.
	Anonymous,
	/// Bearer token, required to be non-empty.
	Bearer(&'a SecretString),
}

/// Headers sent with every token-bearing call to Criteo SSO.
pub fn criteo_headers(access_token: &str) -> Result<HeaderMap> {
	let authorization = HeaderValue::from_str(&format!("Bearer {access_token}"))
		.map_err(|_| AuthError::MalformedCredential)?;

	let mut headers = HeaderMap::new();
	headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
	headers.insert(AUTHORIZATION, authorization);
	Ok(headers)
}

/// Stateless GET-and-decode client rooted at the directory base URL.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
	http: reqwest::Client,
	base_url: Url,
}

impl DirectoryClient {
	pub fn new(http: reqwest::Client, base_url: Url) -> Self {
		Self { http, base_url }
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	pub fn http(&self) -> &reqwest::Client {
		&self.http
	}

	/// `base_url + path`, by string concatenation so the path keeps its
	/// leading segments.
	pub fn resolve(&self, path: &str) -> Result<Url> {
		let base = self.base_url.as_str().trim_end_matches('/');
		Ok(Url::parse(&format!("{base}{path}"))?)
	}

	/// GET `base_url + path` and decode the JSON body.
	pub async fn fetch<T>(
		&self,
		ctx: &RequestContext,
		path: &str,
		credential: Credential<'_>,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let url = self.resolve(path)?;
		self.get_json(ctx, url, credential).await
	}

	/// GET an absolute URL and decode the JSON body.
	///
	/// A bearer credential with an empty token fails with
	/// [`AuthError::MissingCredential`] before any I/O.
	#[tracing::instrument(skip_all, fields(url = %url))]
	pub async fn get_json<T>(
		&self,
		ctx: &RequestContext,
		url: Url,
		credential: Credential<'_>,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut request = self.http.get(url);
		if let Credential::Bearer(token) = credential {
			if token.is_empty() {
				return Err(AuthError::MissingCredential);
			}
			request = request.headers(criteo_headers(token.expose())?);
		}

		tracing::debug!("requesting JSON");
		request_json(ctx, request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::Deserialize;
	use wiremock::matchers::{header, header_exists, method, path};
	use wiremock::{Mock, MockServer, Request, ResponseTemplate};

	#[derive(Debug, Deserialize)]
	struct Echo {
		ok: bool,
	}

	fn client(base: &str) -> DirectoryClient {
		DirectoryClient::new(reqwest::Client::new(), Url::parse(base).unwrap())
	}

	#[test]
	fn resolve_concatenates_paths() {
		let root = client("http://directory.example");
		assert_eq!(
			root.resolve("/user/uid=jdoe,ou=people").unwrap().as_str(),
			"http://directory.example/user/uid=jdoe,ou=people"
		);

		let prefixed = client("http://directory.example/api/");
		assert_eq!(
			prefixed.resolve("/user/jdoe/groups").unwrap().as_str(),
			"http://directory.example/api/user/jdoe/groups"
		);
	}

	#[test]
	fn headers_carry_bearer_and_accept() {
		let headers = criteo_headers("at-1").unwrap();
		assert_eq!(headers[ACCEPT], "application/json");
		assert_eq!(headers[AUTHORIZATION], "Bearer at-1");
	}

	#[test]
	fn control_characters_are_rejected() {
		assert!(matches!(
			criteo_headers("at\n1"),
			Err(AuthError::MalformedCredential)
		));
	}

	#[tokio::test]
	async fn bearer_requests_are_authenticated() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/tokeninfo"))
			.and(header("Authorization", "Bearer at-1"))
			.and(header("Accept", "application/json"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
			.expect(1)
			.mount(&server)
			.await;

		let token = SecretString::from("at-1");
		let url = Url::parse(&format!("{}/tokeninfo", server.uri())).unwrap();
		let echo: Echo = client(&server.uri())
			.get_json(&RequestContext::new(), url, Credential::Bearer(&token))
			.await
			.unwrap();
		assert!(echo.ok);
	}

	#[tokio::test]
	async fn anonymous_requests_carry_no_authorization() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/user/jdoe"))
			.and(header_exists("Authorization"))
			.respond_with(ResponseTemplate::new(401))
			.expect(0)
			.mount(&server)
			.await;
		Mock::given(method("GET"))
			.and(path("/user/jdoe"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
			.expect(1)
			.mount(&server)
			.await;

		let echo: Echo = client(&server.uri())
			.fetch(&RequestContext::new(), "/user/jdoe", Credential::Anonymous)
			.await
			.unwrap();
		assert!(echo.ok);

		let received: Vec<Request> = server.received_requests().await.unwrap();
		assert!(received[0].headers.get("authorization").is_none());
	}

	#[tokio::test]
	async fn empty_bearer_token_never_hits_the_network() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200))
			.expect(0)
			.mount(&server)
			.await;

		let empty = SecretString::empty();
		let result: Result<Echo> = client(&server.uri())
			.fetch(&RequestContext::new(), "/tokeninfo", Credential::Bearer(&empty))
			.await;
		assert!(matches!(result, Err(AuthError::MissingCredential)));
	}
}
