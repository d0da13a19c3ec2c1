// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file and the environment.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::config::{parse_groups, CriteoConfig, CriteoConfigLayer};
use crate::error::ConfigError;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/gatehouse/gatehouse.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<CriteoConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<CriteoConfigLayer, ConfigError> {
		Ok(CriteoConfigLayer::default())
	}
}

/// Shape of the gateway config file; only the `[criteo]` table is ours.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
	#[serde(default)]
	criteo: Option<CriteoConfigLayer>,
}

/// TOML file configuration source. A missing file is not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<CriteoConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(CriteoConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let file: ConfigFile = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!("parsed criteo layer from TOML");
		Ok(file.criteo.unwrap_or_default())
	}
}

/// Environment variable source.
///
/// Convention: `GATEHOUSE_CRITEO_<FIELD>`. Empty values count as unset.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<CriteoConfigLayer, ConfigError> {
		layer_from_vars(|name| std::env::var(name).ok())
	}
}

fn layer_from_vars<F>(lookup: F) -> Result<CriteoConfigLayer, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

	let request_timeout_secs = var("GATEHOUSE_CRITEO_REQUEST_TIMEOUT_SECS")
		.map(|raw| {
			raw.trim().parse::<u64>().map_err(|_| {
				ConfigError::InvalidConfig(format!(
					"GATEHOUSE_CRITEO_REQUEST_TIMEOUT_SECS is not a number: {raw}"
				))
			})
		})
		.transpose()?;

	Ok(CriteoConfigLayer {
		sso_host: var("GATEHOUSE_CRITEO_SSO_HOST"),
		identity_host: var("GATEHOUSE_CRITEO_IDENTITY_HOST"),
		groups: var("GATEHOUSE_CRITEO_GROUPS").map(|raw| parse_groups(&raw)),
		client_id: var("GATEHOUSE_CRITEO_CLIENT_ID"),
		scope: var("GATEHOUSE_CRITEO_SCOPE"),
		login_url: var("GATEHOUSE_CRITEO_LOGIN_URL"),
		redeem_url: var("GATEHOUSE_CRITEO_REDEEM_URL"),
		profile_url: var("GATEHOUSE_CRITEO_PROFILE_URL"),
		validate_url: var("GATEHOUSE_CRITEO_VALIDATE_URL"),
		identity_url: var("GATEHOUSE_CRITEO_IDENTITY_URL"),
		request_timeout_secs,
	})
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`GATEHOUSE_CRITEO_*`)
/// 2. Config file (`config_path`, or `/etc/gatehouse/gatehouse.toml`)
/// 3. Built-in defaults
pub fn load_config(config_path: Option<PathBuf>) -> Result<CriteoConfig, ConfigError> {
	let file = match config_path {
		Some(path) => TomlSource::new(path),
		None => TomlSource::system(),
	};
	let sources: Vec<Box<dyn ConfigSource>> =
		vec![Box::new(DefaultsSource), Box::new(file), Box::new(EnvSource)];

	load_from_sources(sources)
}

/// Load configuration from environment only.
pub fn load_config_from_env() -> Result<CriteoConfig, ConfigError> {
	load_from_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource)])
}

pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<CriteoConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = CriteoConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	let config = merged.finalize()?;
	info!(
		profile_url = %config.provider.profile_url,
		directory_url = %config.directory_url,
		allowed_groups = ?config.allowed_groups,
		"criteo provider configuration loaded"
	);
	Ok(config)
}
