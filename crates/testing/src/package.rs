// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Builds package archives the way a host hands them to `InstallExternalLibrary`: a zip whose
//! top level holds one wheel.

use std::{
	fs,
	io::{self, Cursor, Write},
	path::{Path, PathBuf},
};

use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

#[derive(Debug, Clone)]
pub struct PackageBuilder {
	name: String,
	version: String,
	modules: Vec<(String, String)>,
	shims: Vec<String>,
}

fn zip_bytes(entries: &[(String, Vec<u8>)]) -> io::Result<Vec<u8>> {
	let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
	let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
	for (name, contents) in entries {
		writer.start_file(name.as_str(), options).map_err(io::Error::other)?;
		writer.write_all(contents)?;
	}
	Ok(writer.finish().map_err(io::Error::other)?.into_inner())
}

fn write_zip(path: &Path, entries: &[(String, Vec<u8>)]) -> io::Result<PathBuf> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}
	fs::write(path, zip_bytes(entries)?)?;
	Ok(path.to_path_buf())
}

impl PackageBuilder {
	pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			version: version.into(),
			modules: Vec::new(),
			shims: Vec::new(),
		}
	}

	/// Adds a file at `path` (relative to the install root) to the package.
	pub fn module(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
		self.modules.push((path.into(), contents.into()));
		self
	}

	/// Adds a loader shim such as `name-1.0-nspkg.pth` that the package's `RECORD` does not list.
	pub fn shim(mut self, file_name: impl Into<String>) -> Self {
		self.shims.push(file_name.into());
		self
	}

	fn dist_name(&self) -> String {
		self.name.replace('-', "_")
	}

	pub fn dist_info(&self) -> String {
		format!("{}-{}.dist-info", self.dist_name(), self.version)
	}

	pub fn wheel_file_name(&self) -> String {
		format!("{}-{}-py3-none-any.whl", self.dist_name(), self.version)
	}

	fn top_level(&self) -> Vec<String> {
		let mut top = Vec::new();
		for (path, _) in &self.modules {
			let first = path.split('/').next().unwrap_or(path);
			let entry = first.strip_suffix(".py").unwrap_or(first).to_string();
			if !top.contains(&entry) {
				top.push(entry);
			}
		}
		top
	}

	/// Bytes of the wheel: the modules, the shims and a `dist-info` directory.
	pub fn wheel_bytes(&self) -> io::Result<Vec<u8>> {
		let dist_info = self.dist_info();
		let mut entries: Vec<(String, Vec<u8>)> =
			self.modules.iter().map(|(path, contents)| (path.clone(), contents.as_bytes().to_vec())).collect();
		for shim in &self.shims {
			entries.push((shim.clone(), b"import sys\n".to_vec()));
		}

		let metadata = format!("Metadata-Version: 2.1\nName: {}\nVersion: {}\n\n", self.name, self.version);
		let mut record: String = self.modules.iter().map(|(path, _)| format!("{path},,\n")).collect();
		for file in ["METADATA", "top_level.txt", "RECORD"] {
			record.push_str(&format!("{dist_info}/{file},,\n"));
		}
		let top_level: String = self.top_level().iter().map(|t| format!("{t}\n")).collect();

		entries.push((format!("{dist_info}/METADATA"), metadata.into_bytes()));
		entries.push((format!("{dist_info}/top_level.txt"), top_level.into_bytes()));
		entries.push((format!("{dist_info}/RECORD"), record.into_bytes()));
		zip_bytes(&entries)
	}

	/// Writes `<dir>/<name>.zip` holding the wheel at its top level.
	pub fn write_library(&self, dir: &Path) -> io::Result<PathBuf> {
		let wheel = self.wheel_bytes()?;
		write_zip(&dir.join(format!("{}.zip", self.name)), &[(self.wheel_file_name(), wheel)])
	}

	/// Writes an outer archive that holds no payload at all.
	pub fn write_bare_library(&self, dir: &Path) -> io::Result<PathBuf> {
		write_zip(&dir.join(format!("{}.zip", self.name)), &[("README".to_string(), b"nothing here".to_vec())])
	}

	/// Writes an outer archive whose only wheel sits in a subdirectory.
	pub fn write_nested_library(&self, dir: &Path) -> io::Result<PathBuf> {
		let wheel = self.wheel_bytes()?;
		write_zip(&dir.join(format!("{}.zip", self.name)), &[(format!("inner/{}", self.wheel_file_name()), wheel)])
	}
}
