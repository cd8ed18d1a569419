// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Unpacking library archives and locating the package payload inside them.

use std::{
	fs::{self, File},
	io,
	path::{Path, PathBuf},
};

use langbridge_type::{Error, Result};
use tracing::debug;
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
	Wheel,
	Zip,
	Tarball,
}

impl PayloadKind {
	fn of(path: &Path) -> Option<Self> {
		let ext = path.extension()?.to_str()?.to_ascii_lowercase();
		match ext.as_str() {
			"whl" => Some(PayloadKind::Wheel),
			"zip" => Some(PayloadKind::Zip),
			"gz" => Some(PayloadKind::Tarball),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
	pub path: PathBuf,
	pub kind: PayloadKind,
}

/// Extracts every entry of the zip archive at `archive` into `dest`. Entries whose names would
/// escape `dest` are rejected.
pub fn extract(archive: &Path, dest: &Path) -> Result<usize> {
	let file = File::open(archive).map_err(|err| Error::io(format!("opening {}", archive.display()), err))?;
	let mut zip = ZipArchive::new(file)
		.map_err(|err| Error::library(format!("{} is not a valid zip archive: {err}", archive.display())))?;

	for index in 0..zip.len() {
		let mut entry = zip
			.by_index(index)
			.map_err(|err| Error::library(format!("reading entry {index} of {}: {err}", archive.display())))?;
		let Some(relative) = entry.enclosed_name() else {
			return Err(Error::library(format!(
				"archive entry '{}' escapes the extraction directory",
				entry.name()
			)));
		};
		let target = dest.join(relative);

		if entry.is_dir() {
			fs::create_dir_all(&target).map_err(|err| Error::io(format!("creating {}", target.display()), err))?;
			continue;
		}
		if let Some(parent) = target.parent() {
			fs::create_dir_all(parent).map_err(|err| Error::io(format!("creating {}", parent.display()), err))?;
		}
		let mut out =
			File::create(&target).map_err(|err| Error::io(format!("creating {}", target.display()), err))?;
		io::copy(&mut entry, &mut out).map_err(|err| Error::io(format!("writing {}", target.display()), err))?;
	}

	debug!(archive = %archive.display(), entries = zip.len(), "extracted");
	Ok(zip.len())
}

fn walk(dir: &Path, depth: usize, found: &mut Vec<(usize, PathBuf)>) -> Result<()> {
	let entries = fs::read_dir(dir).map_err(|err| Error::io(format!("reading {}", dir.display()), err))?;
	for entry in entries {
		let path = entry.map_err(|err| Error::io(format!("reading {}", dir.display()), err))?.path();
		if path.is_dir() {
			walk(&path, depth + 1, found)?;
		} else if PayloadKind::of(&path).is_some() {
			found.push((depth, path));
		}
	}
	Ok(())
}

/// Finds the single package payload at the top of `dir`.
///
/// Fails when there is none, when there is more than one, or when the only archives are nested in
/// subdirectories.
pub fn locate_payload(dir: &Path) -> Result<Payload> {
	let mut found = Vec::new();
	walk(dir, 0, &mut found)?;

	let (top, nested): (Vec<_>, Vec<_>) = found.into_iter().partition(|(depth, _)| *depth == 0);
	match top.as_slice() {
		[(_, path)] => {
			let kind = PayloadKind::of(path)
				.ok_or_else(|| Error::library(format!("{} is not a package payload", path.display())))?;
			Ok(Payload {
				path: path.clone(),
				kind,
			})
		}
		[] if !nested.is_empty() => Err(Error::library(format!(
			"package archive only contains nested archives: {}",
			nested.iter().map(|(_, p)| p.display().to_string()).collect::<Vec<_>>().join(", ")
		))),
		[] => Err(Error::library(
			"could not find the package inside the archive; an external library must be a package inside a zip",
		)),
		many => Err(Error::library(format!(
			"package archive is ambiguous: found {} payloads ({})",
			many.len(),
			many.iter()
				.filter_map(|(_, p)| p.file_name())
				.map(|n| n.to_string_lossy().into_owned())
				.collect::<Vec<_>>()
				.join(", ")
		))),
	}
}
