// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration or building the provider.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// A setting with no usable default was not provided.
	#[error("missing required setting: {0}")]
	MissingSetting(&'static str),

	/// A setting was present but unusable.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("invalid URL for {field}: {source}")]
	InvalidUrl {
		field: &'static str,
		source: url::ParseError,
	},

	#[error("failed to read config file {}: {source}", .path.display())]
	FileRead {
		path: PathBuf,
		source: std::io::Error,
	},

	#[error("failed to parse config file {}: {source}", .path.display())]
	TomlParse {
		path: PathBuf,
		source: toml::de::Error,
	},

	#[error("failed to build HTTP client: {0}")]
	HttpClient(#[source] reqwest::Error),
}
