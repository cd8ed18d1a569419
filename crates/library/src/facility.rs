// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The runtime's own package-installation facility.

use std::{
	ffi::OsString,
	fs,
	path::{Path, PathBuf},
	process::Command,
};

use langbridge_type::{Error, Result};
use tracing::{debug, warn};

use crate::{
	archive::{self, Payload, PayloadKind},
	installation::{LibraryInstallation, remove_artifact},
	scope::Scope,
};

pub trait PackageFacility: Send + Sync {
	/// Installs `payload` so that its top-level entries land directly under `root`.
	fn install(&self, payload: &Payload, root: &Path, scratch: &Path) -> Result<()>;

	/// Removes the package called `name` from `root`.
	fn uninstall(&self, name: &str, root: &Path) -> Result<()>;
}

/// Installs wheel and zip payloads by unpacking them into the root; uninstalls by removing what the
/// package's metadata says it owns.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveFacility;

impl PackageFacility for ArchiveFacility {
	fn install(&self, payload: &Payload, root: &Path, scratch: &Path) -> Result<()> {
		if payload.kind == PayloadKind::Tarball {
			return Err(Error::library(format!(
				"{} is a source archive; only wheel and zip packages can be installed",
				payload.path.display()
			)));
		}

		// the root is only touched once the payload is known to hold a package
		let staging = scratch.join("staging");
		fs::create_dir_all(&staging).map_err(|err| Error::io(format!("creating {}", staging.display()), err))?;
		archive::extract(&payload.path, &staging)?;

		let entries: Vec<PathBuf> = fs::read_dir(&staging)
			.map_err(|err| Error::io(format!("reading {}", staging.display()), err))?
			.filter_map(|e| e.ok().map(|e| e.path()))
			.collect();

		let metadata = entries
			.iter()
			.find(|p| {
				p.is_dir()
					&& p.file_name().and_then(|n| n.to_str()).is_some_and(|n| {
						n.ends_with(".dist-info") || n.ends_with(".egg-info")
					})
			})
			.ok_or_else(|| {
				Error::library(format!("{} does not contain package metadata", payload.path.display()))
			})?;

		let name = staged_package_name(metadata)?;
		if let Some(existing) = LibraryInstallation::find(root, &name, Scope::Public)? {
			debug!(name = %name, version = %existing.version, "replacing installed package");
			for artifact in existing.owned_artifacts() {
				remove_artifact(&artifact)?;
			}
		}

		fs::create_dir_all(root).map_err(|err| Error::io(format!("creating {}", root.display()), err))?;
		for entry in &entries {
			let Some(file_name) = entry.file_name() else {
				continue;
			};
			let target = root.join(file_name);
			remove_artifact(&target)?;
			fs::rename(entry, &target).map_err(|err| Error::io(format!("moving {}", target.display()), err))?;
		}
		Ok(())
	}

	fn uninstall(&self, name: &str, root: &Path) -> Result<()> {
		let installation = LibraryInstallation::find(root, name, Scope::Public)?
			.ok_or_else(|| Error::library(format!("package '{name}' is not installed in {}", root.display())))?;
		for artifact in installation.owned_artifacts() {
			remove_artifact(&artifact)?;
		}
		Ok(())
	}
}

fn staged_package_name(metadata_dir: &Path) -> Result<String> {
	let text = fs::read_to_string(metadata_dir.join("METADATA"))
		.or_else(|_| fs::read_to_string(metadata_dir.join("PKG-INFO")))
		.unwrap_or_default();
	if let Some(name) = text.lines().find_map(|l| l.strip_prefix("Name:")) {
		return Ok(name.trim().to_string());
	}
	metadata_dir
		.file_name()
		.and_then(|n| n.to_str())
		.and_then(|n| n.split_once('-'))
		.map(|(name, _)| name.to_string())
		.ok_or_else(|| Error::library(format!("cannot tell the package name from {}", metadata_dir.display())))
}

/// Delegates to an external package manager command, e.g.
/// `python -m pip install {payload} --no-deps --ignore-installed --no-cache-dir -t {root}`.
///
/// Arguments may contain the placeholders `{payload}`, `{root}` and `{name}`.
#[derive(Debug, Clone)]
pub struct CommandFacility {
	pub program: PathBuf,
	pub install_args: Vec<String>,
	pub uninstall_args: Vec<String>,
	/// Environment variable the root is prepended to for uninstalls so the manager can see it
	pub path_variable: Option<String>,
}

impl CommandFacility {
	pub fn pip(python: impl Into<PathBuf>) -> Self {
		let args = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
		Self {
			program: python.into(),
			install_args: args(&[
				"-m",
				"pip",
				"install",
				"{payload}",
				"--no-deps",
				"--ignore-installed",
				"--no-cache-dir",
				"-t",
				"{root}",
			]),
			uninstall_args: args(&["-m", "pip", "uninstall", "{name}", "-y"]),
			path_variable: Some("PYTHONPATH".to_string()),
		}
	}

	fn expand(args: &[String], payload: &str, root: &str, name: &str) -> Vec<String> {
		args.iter()
			.map(|a| a.replace("{payload}", payload).replace("{root}", root).replace("{name}", name))
			.collect()
	}

	fn run(&self, mut command: Command, what: &str) -> Result<()> {
		debug!(program = %self.program.display(), what, "running package manager");
		let output = command
			.output()
			.map_err(|err| Error::io(format!("running {}", self.program.display()), err))?;
		if output.status.success() {
			return Ok(());
		}

		let stderr = String::from_utf8_lossy(&output.stderr);
		let code = output.status.code().map_or_else(|| "signal".to_string(), |c| c.to_string());
		warn!(what, code = %code, stderr = %stderr.trim(), "package manager failed");
		Err(Error::library(format!("package manager failed to {what} with exit code {code}: {}", stderr.trim())))
	}
}

impl PackageFacility for CommandFacility {
	fn install(&self, payload: &Payload, root: &Path, scratch: &Path) -> Result<()> {
		let mut command = Command::new(&self.program);
		command.args(Self::expand(
			&self.install_args,
			&payload.path.to_string_lossy(),
			&root.to_string_lossy(),
			"",
		));
		command.env("TMPDIR", scratch);
		self.run(command, "install the package")
	}

	fn uninstall(&self, name: &str, root: &Path) -> Result<()> {
		let mut command = Command::new(&self.program);
		command.args(Self::expand(&self.uninstall_args, "", &root.to_string_lossy(), name));
		if let Some(variable) = &self.path_variable {
			let mut value = OsString::from(root.as_os_str());
			if let Some(existing) = std::env::var_os(variable) {
				value.push(if cfg!(windows) {
					";"
				} else {
					":"
				});
				value.push(existing);
			}
			command.env(variable, value);
		}
		self.run(command, "fully uninstall the package")
	}
}

#[cfg(test)]
pub mod tests {
	use super::*;

	#[test]
	fn test_expand_placeholders() {
		let pip = CommandFacility::pip("python3");
		let args = CommandFacility::expand(&pip.install_args, "/tmp/p.whl", "/lib", "");
		assert_eq!(args[3], "/tmp/p.whl");
		assert_eq!(args[8], "/lib");
		let args = CommandFacility::expand(&pip.uninstall_args, "", "/lib", "numpy");
		assert_eq!(args, vec!["-m", "pip", "uninstall", "numpy", "-y"]);
	}

	#[cfg(unix)]
	#[test]
	fn test_failing_command_reports_exit_code() {
		let facility = CommandFacility {
			program: PathBuf::from("false"),
			install_args: Vec::new(),
			uninstall_args: Vec::new(),
			path_variable: None,
		};
		let err = facility.uninstall("x", Path::new("/nonexistent")).unwrap_err();
		assert!(err.to_string().contains("exit code 1"));
	}
}
