// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Installed packages and the metadata records describing them.
//!
//! An installation is a set of top-level entries under a root plus a
//! `<name>-<version>.dist-info` (or `.egg-info`) directory holding `METADATA`, `RECORD` and
//! optionally `top_level.txt`. Names compare case-insensitively with `-` and `_` interchangeable.

use std::{
	collections::BTreeSet,
	fs, io,
	path::{Path, PathBuf},
};

use langbridge_type::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::scope::Scope;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryInstallation {
	pub name: String,
	pub version: String,
	pub scope: Scope,
	pub root: PathBuf,
	/// The `dist-info`/`egg-info` directory
	pub metadata_dir: PathBuf,
}

/// Pattern source matching `name` with `-` and `_` interchangeable.
fn name_pattern(name: &str) -> String {
	name.split(['-', '_']).map(regex::escape).collect::<Vec<_>>().join("[-_]")
}

fn matcher(pattern: &str) -> Result<Regex> {
	RegexBuilder::new(pattern)
		.case_insensitive(true)
		.build()
		.map_err(|err| Error::library(format!("invalid package name pattern: {err}")))
}

/// Matches `<name>-*dist-info` and `<name>-*egg*` entries.
fn metadata_matcher(name: &str) -> Result<Regex> {
	let name = name_pattern(name);
	matcher(&format!("^{name}-(.*)(dist-info|egg(.*))$"))
}

/// Matches the loader shims a package can leave next to its installation.
fn shim_matcher(name: &str) -> Result<Regex> {
	let name = name_pattern(name);
	matcher(&format!("^({name}-(.*)\\.pth|{name}\\.py)$"))
}

pub fn names_match(a: &str, b: &str) -> bool {
	normalize_name(a) == normalize_name(b)
}

pub fn normalize_name(name: &str) -> String {
	name.to_ascii_lowercase().replace('_', "-")
}

fn read_dir_names(root: &Path) -> Result<Vec<(String, PathBuf)>> {
	let entries = match fs::read_dir(root) {
		Ok(entries) => entries,
		Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
		Err(err) => return Err(Error::io(format!("reading {}", root.display()), err)),
	};

	let mut names = Vec::new();
	for entry in entries {
		let entry = entry.map_err(|err| Error::io(format!("reading {}", root.display()), err))?;
		names.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
	}
	names.sort();
	Ok(names)
}

/// `Name:` and `Version:` headers of a `METADATA` or `PKG-INFO` file.
fn parse_metadata(text: &str) -> (Option<String>, Option<String>) {
	let mut name = None;
	let mut version = None;
	for line in text.lines() {
		if line.is_empty() {
			break;
		}
		if let Some(value) = line.strip_prefix("Name:") {
			name = Some(value.trim().to_string());
		} else if let Some(value) = line.strip_prefix("Version:") {
			version = Some(value.trim().to_string());
		}
	}
	(name, version)
}

/// Version encoded in a metadata directory name: `foo-1.2.dist-info` gives `1.2`.
fn version_from_dir_name(dir_name: &str) -> Option<String> {
	let stem = dir_name.strip_suffix(".dist-info").or_else(|| dir_name.strip_suffix(".egg-info"))?;
	let (_, version) = stem.split_once('-')?;
	let version = version.split('-').next().unwrap_or(version);
	Some(version.to_string())
}

impl LibraryInstallation {
	/// Locates the installation of `name` directly under `root`.
	pub fn find(root: &Path, name: &str, scope: Scope) -> Result<Option<Self>> {
		let metadata = metadata_matcher(name)?;
		for (file_name, path) in read_dir_names(root)? {
			if !path.is_dir() || !metadata.is_match(&file_name) {
				continue;
			}

			let text = fs::read_to_string(path.join("METADATA"))
				.or_else(|_| fs::read_to_string(path.join("PKG-INFO")))
				.unwrap_or_default();
			let (declared_name, declared_version) = parse_metadata(&text);

			if let Some(declared) = &declared_name {
				if !names_match(declared, name) {
					continue;
				}
			}

			let version = declared_version
				.or_else(|| version_from_dir_name(&file_name))
				.unwrap_or_else(|| "unknown".to_string());

			return Ok(Some(Self {
				name: declared_name.unwrap_or_else(|| name.to_string()),
				version,
				scope,
				root: root.to_path_buf(),
				metadata_dir: path,
			}));
		}
		Ok(None)
	}

	/// Top-level names listed in `top_level.txt`.
	pub fn top_level(&self) -> Vec<String> {
		fs::read_to_string(self.metadata_dir.join("top_level.txt"))
			.map(|text| text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
			.unwrap_or_default()
	}

	/// Paths listed in `RECORD`, resolved against the root. Entries escaping the root are ignored.
	pub fn record(&self) -> Vec<PathBuf> {
		let Ok(text) = fs::read_to_string(self.metadata_dir.join("RECORD")) else {
			return Vec::new();
		};
		text.lines()
			.filter_map(|line| line.split(',').next())
			.map(str::trim)
			.filter(|p| !p.is_empty())
			.filter(|p| !Path::new(p).is_absolute() && !p.split(['/', '\\']).any(|c| c == ".."))
			.map(|p| self.root.join(p))
			.collect()
	}

	/// Every file and directory this installation owns: the metadata directory, its top-level
	/// entries and the files its `RECORD` lists.
	pub fn owned_artifacts(&self) -> Vec<PathBuf> {
		let mut artifacts = BTreeSet::new();
		artifacts.insert(self.metadata_dir.clone());
		for top in self.top_level() {
			let dir = self.root.join(&top);
			if dir.exists() {
				artifacts.insert(dir);
			}
			let module = self.root.join(format!("{top}.py"));
			if module.exists() {
				artifacts.insert(module);
			}
		}
		for path in self.record() {
			if path.exists() {
				artifacts.insert(path);
			}
		}
		artifacts.into_iter().collect()
	}
}

/// Loader shims matching `name` directly under `root`: `<name>-*.pth` and `<name>.py`.
pub fn stray_shims(root: &Path, name: &str) -> Result<Vec<PathBuf>> {
	let shim = shim_matcher(name)?;
	Ok(read_dir_names(root)?.into_iter().filter(|(file_name, _)| shim.is_match(file_name)).map(|(_, p)| p).collect())
}

/// Removes a file or directory tree; a path that is already gone is not an error.
pub fn remove_artifact(path: &Path) -> Result<()> {
	let result = if path.is_dir() {
		fs::remove_dir_all(path)
	} else {
		fs::remove_file(path)
	};
	match result {
		Ok(()) => Ok(()),
		Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
		Err(err) => Err(Error::io(format!("removing {}", path.display()), err)),
	}
}
