// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Builder for the process-wide tracing subscriber

use std::{
	env,
	fs::{self, OpenOptions},
	io,
	path::{Path, PathBuf},
	sync::Mutex,
};

use langbridge_type::{Error, Result};
use tracing::debug;
use tracing_subscriber::{
	EnvFilter, Layer,
	fmt::{self, writer::BoxMakeWriter},
	layer::SubscriberExt,
	util::SubscriberInitExt,
};

/// Environment variable holding filter directives, e.g. `langbridge_session=debug,info`.
pub const LOG_ENV: &str = "LANGBRIDGE_LOG";

pub struct TracingBuilder {
	level: String,
	directives: Option<String>,
	json: bool,
	ansi: bool,
	log_file: Option<PathBuf>,
}

impl TracingBuilder {
	pub fn new() -> Self {
		Self {
			level: "info".to_string(),
			directives: None,
			json: false,
			ansi: false,
			log_file: None,
		}
	}

	/// Level used when neither explicit directives nor [`LOG_ENV`] are set.
	pub fn level(mut self, level: impl Into<String>) -> Self {
		self.level = level.into();
		self
	}

	/// Explicit filter directives; these win over [`LOG_ENV`].
	pub fn directives(mut self, directives: Option<String>) -> Self {
		self.directives = directives.filter(|d| !d.trim().is_empty());
		self
	}

	/// Emit JSON lines instead of plain text.
	pub fn json(mut self, json: bool) -> Self {
		self.json = json;
		self
	}

	pub fn ansi(mut self, ansi: bool) -> Self {
		self.ansi = ansi;
		self
	}

	/// Append to this file instead of writing to stderr. Parent directories are created.
	pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
		self.log_file = Some(path.into());
		self
	}

	pub(crate) fn filter(&self) -> Result<EnvFilter> {
		let directives = match &self.directives {
			Some(directives) => directives.clone(),
			None => env::var(LOG_ENV).ok().filter(|d| !d.trim().is_empty()).unwrap_or_else(|| self.level.clone()),
		};
		EnvFilter::try_new(&directives).map_err(|err| Error::ContractViolation {
			message: format!("invalid log filter '{directives}': {err}"),
		})
	}

	fn writer(&self) -> Result<BoxMakeWriter> {
		let Some(path) = &self.log_file else {
			return Ok(BoxMakeWriter::new(io::stderr));
		};
		Ok(BoxMakeWriter::new(Mutex::new(open_log(path)?)))
	}

	/// Installs the subscriber. Returns `false` when the process already had one, which is left
	/// in place.
	pub fn try_init(self) -> Result<bool> {
		let filter = self.filter()?;
		let writer = self.writer()?;

		let layer = if self.json {
			fmt::layer().json().with_writer(writer).with_current_span(true).boxed()
		} else {
			fmt::layer().with_ansi(self.ansi && self.log_file.is_none()).with_writer(writer).boxed()
		};

		match tracing_subscriber::registry().with(layer).with(filter).try_init() {
			Ok(()) => {
				debug!(json = self.json, file = ?self.log_file, "tracing initialized");
				Ok(true)
			}
			Err(_) => Ok(false),
		}
	}
}

impl Default for TracingBuilder {
	fn default() -> Self {
		Self::new()
	}
}

fn open_log(path: &Path) -> Result<fs::File> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).map_err(|err| Error::io(format!("creating {}", parent.display()), err))?;
	}
	OpenOptions::new()
		.create(true)
		.append(true)
		.open(path)
		.map_err(|err| Error::io(format!("opening log file {}", path.display()), err))
}

#[cfg(test)]
pub mod tests {
	use langbridge_testing::tempdir::temp_dir;

	use super::*;

	#[test]
	fn test_explicit_directives_win() {
		let builder = TracingBuilder::new().level("error").directives(Some("langbridge_session=trace".to_string()));
		assert_eq!(builder.filter().unwrap().to_string(), "langbridge_session=trace");
	}

	#[test]
	fn test_blank_directives_are_ignored() {
		let builder = TracingBuilder::new().directives(Some("  ".to_string()));
		assert!(builder.directives.is_none());
	}

	#[test]
	fn test_invalid_directives_are_rejected() {
		let builder = TracingBuilder::new().directives(Some("langbridge=loud".to_string()));
		assert!(builder.filter().is_err());
	}

	#[test]
	fn test_log_file_parent_is_created() {
		temp_dir(|dir| {
			let path = dir.join("logs").join("extension.log");
			open_log(&path).unwrap();
			assert!(path.exists());
			Ok(())
		})
		.unwrap();
	}
}
