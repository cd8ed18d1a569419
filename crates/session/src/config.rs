// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Extension configuration, assembled from the `Init` arguments and the environment.

use std::{env, path::PathBuf};

use langbridge_library::{Scope, SearchPath};
use langbridge_type::{Error, Result};
use serde::{Deserialize, Serialize};

/// Runtime installation directory.
pub const HOME_ENV: &str = "LANGBRIDGE_HOME";
/// Extra runtime options, passed through untouched.
pub const OPTIONS_ENV: &str = "LANGBRIDGE_OPTIONS";
/// Log filter directives.
pub const LOG_ENV: &str = "LANGBRIDGE_LOG";

const LOG_FILE_NAME: &str = "langbridge.log";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
	/// `key=value` pairs separated by `;`, as given to `Init`
	pub params: String,
	pub extension_path: Option<String>,
	pub public_library_path: Option<String>,
	pub private_library_path: Option<String>,
	pub runtime_home: Option<String>,
	pub options: Option<String>,
	pub log_filter: Option<String>,
}

impl ExtensionConfig {
	/// Configuration from the `Init` arguments alone. Paths are normalized; blank ones are absent.
	pub fn new(
		params: Option<&str>,
		extension_path: Option<&str>,
		public_library_path: Option<&str>,
		private_library_path: Option<&str>,
	) -> Self {
		Self {
			params: params.unwrap_or_default().trim().to_string(),
			extension_path: extension_path.and_then(normalize_path),
			public_library_path: public_library_path.and_then(normalize_path),
			private_library_path: private_library_path.and_then(normalize_path),
			..Self::default()
		}
	}

	/// Fills the environment-driven settings from the process environment.
	pub fn with_env(self) -> Self {
		self.with_env_from(|key| env::var(key).ok())
	}

	pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
		let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
		self.runtime_home = lookup(HOME_ENV).as_deref().and_then(normalize_path);
		self.options = lookup(OPTIONS_ENV);
		self.log_filter = self.param("log").map(str::to_string).or_else(|| lookup(LOG_ENV));
		self
	}

	/// Value of `key` in the `Init` params.
	pub fn param(&self, key: &str) -> Option<&str> {
		self.params
			.split(';')
			.filter_map(|pair| pair.split_once('='))
			.find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
			.map(|(_, v)| v.trim())
			.filter(|v| !v.is_empty())
	}

	fn flag(&self, key: &str) -> bool {
		matches!(self.param(key), Some(v) if v == "1" || v.eq_ignore_ascii_case("true"))
	}

	pub fn log_json(&self) -> bool {
		matches!(self.param("log_format"), Some(v) if v.eq_ignore_ascii_case("json"))
	}

	/// `langbridge.log` under the extension path, when `log_file=true` is set and there is a path.
	pub fn log_file(&self) -> Option<PathBuf> {
		if !self.flag("log_file") {
			return None;
		}
		self.extension_path.as_ref().map(|p| PathBuf::from(p).join(LOG_FILE_NAME))
	}

	pub fn search_path(&self) -> SearchPath {
		SearchPath::new(
			self.private_library_path.as_ref().map(PathBuf::from),
			self.public_library_path.as_ref().map(PathBuf::from),
		)
	}

	/// The scope a library root belongs to: private only when it is the configured private path.
	pub fn scope_of(&self, root: &str) -> Scope {
		match (normalize_path(root), &self.private_library_path) {
			(Some(root), Some(private)) if &root == private => Scope::Private,
			_ => Scope::Public,
		}
	}

	pub fn to_json(&self) -> Result<String> {
		serde_json::to_string(self).map_err(|err| Error::ContractViolation {
			message: format!("serializing configuration: {err}"),
		})
	}
}

/// Backslashes become `/` and trailing separators are trimmed. A root `/` is kept.
pub fn normalize_path(path: &str) -> Option<String> {
	let path = path.trim();
	if path.is_empty() {
		return None;
	}
	let path = path.replace('\\', "/");
	let trimmed = path.trim_end_matches('/');
	if trimmed.is_empty() {
		Some("/".to_string())
	} else {
		Some(trimmed.to_string())
	}
}

#[cfg(test)]
pub mod tests {
	use std::collections::HashMap;

	use super::*;

	#[test]
	fn test_normalize_path() {
		assert_eq!(normalize_path("C:\\libs\\public\\").as_deref(), Some("C:/libs/public"));
		assert_eq!(normalize_path("/var/lib//").as_deref(), Some("/var/lib"));
		assert_eq!(normalize_path("/").as_deref(), Some("/"));
		assert_eq!(normalize_path("  "), None);
	}

	#[test]
	fn test_init_arguments() {
		let config = ExtensionConfig::new(None, Some("/opt/ext/"), Some("/libs/public"), Some("  "));
		assert_eq!(config.params, "");
		assert_eq!(config.extension_path.as_deref(), Some("/opt/ext"));
		assert!(config.private_library_path.is_none());
		assert_eq!(config.search_path(), SearchPath::new(None, Some("/libs/public".into())));
	}

	#[test]
	fn test_environment() {
		let env: HashMap<&str, &str> =
			[(HOME_ENV, "D:\\runtime\\"), (OPTIONS_ENV, "-X utf8"), (LOG_ENV, "debug")].into_iter().collect();
		let config = ExtensionConfig::new(None, None, None, None)
			.with_env_from(|key| env.get(key).map(|v| v.to_string()));
		assert_eq!(config.runtime_home.as_deref(), Some("D:/runtime"));
		assert_eq!(config.options.as_deref(), Some("-X utf8"));
		assert_eq!(config.log_filter.as_deref(), Some("debug"));
	}

	#[test]
	fn test_params_win_over_environment_for_log_filter() {
		let config = ExtensionConfig::new(Some("log=warn; log_format=JSON;log_file=true"), Some("/ext"), None, None)
			.with_env_from(|key| (key == LOG_ENV).then(|| "trace".to_string()));
		assert_eq!(config.log_filter.as_deref(), Some("warn"));
		assert!(config.log_json());
		assert_eq!(config.log_file(), Some(PathBuf::from("/ext/langbridge.log")));
	}

	#[test]
	fn test_scope_of() {
		let config = ExtensionConfig::new(None, None, Some("/libs/public"), Some("/libs/private"));
		assert_eq!(config.scope_of("/libs/private/"), Scope::Private);
		assert_eq!(config.scope_of("\\libs\\private"), Scope::Private);
		assert_eq!(config.scope_of("/libs/public"), Scope::Public);
		assert_eq!(config.scope_of("/elsewhere"), Scope::Public);
	}

	#[test]
	fn test_json() {
		let config = ExtensionConfig::new(Some("a=1"), None, None, None);
		let json = config.to_json().unwrap();
		let back: ExtensionConfig = serde_json::from_str(&json).unwrap();
		assert_eq!(back, config);
	}
}
