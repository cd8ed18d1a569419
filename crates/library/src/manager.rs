// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fs, path::Path, sync::Arc};

use langbridge_type::{Error, Result};
use tracing::{debug, info, instrument, warn};

use crate::{
	archive,
	facility::{ArchiveFacility, PackageFacility},
	installation::{LibraryInstallation, remove_artifact, stray_shims},
	scope::Scope,
};

/// Installs and uninstalls packages in one scope root at a time.
#[derive(Clone)]
pub struct LibraryManager {
	facility: Arc<dyn PackageFacility>,
}

impl Default for LibraryManager {
	fn default() -> Self {
		Self::new(ArchiveFacility)
	}
}

impl LibraryManager {
	pub fn new(facility: impl PackageFacility + 'static) -> Self {
		Self {
			facility: Arc::new(facility),
		}
	}

	/// Unpacks `archive` into a temporary area under `root`, installs the single payload found in
	/// it and removes the temporary area whether or not that worked.
	#[instrument(name = "library::install", level = "debug", skip_all, fields(name = %name, scope = %scope))]
	pub fn install(&self, name: &str, archive: &Path, scope: Scope, root: &Path) -> Result<LibraryInstallation> {
		fs::create_dir_all(root).map_err(|err| Error::io(format!("creating {}", root.display()), err))?;
		let scratch = tempfile::Builder::new()
			.prefix("tmp")
			.tempdir_in(root)
			.map_err(|err| Error::io(format!("creating a temporary folder in {}", root.display()), err))?;

		let result = self.install_from(name, archive, scope, root, scratch.path());

		let scratch_path = scratch.path().to_path_buf();
		if let Err(err) = scratch.close() {
			warn!(path = %scratch_path.display(), error = %err, "removing temporary folder failed");
		}
		result
	}

	fn install_from(
		&self,
		name: &str,
		archive_path: &Path,
		scope: Scope,
		root: &Path,
		scratch: &Path,
	) -> Result<LibraryInstallation> {
		let unpacked = scratch.join("archive");
		fs::create_dir_all(&unpacked).map_err(|err| Error::io(format!("creating {}", unpacked.display()), err))?;
		archive::extract(archive_path, &unpacked)?;

		let payload = archive::locate_payload(&unpacked)?;
		debug!(payload = %payload.path.display(), kind = ?payload.kind, "installing payload");
		self.facility.install(&payload, root, scratch)?;

		let installation = LibraryInstallation::find(root, name, scope)?.ok_or_else(|| {
			Error::library(format!("package '{name}' was not found in {} after installation", root.display()))
		})?;
		info!(version = %installation.version, root = %root.display(), "installed");
		Ok(installation)
	}

	/// Uninstalls through the facility; when that fails or leaves the package behind, deletes what
	/// the package's metadata said it owned plus any loader shims carrying its name.
	///
	/// The artifact list is taken before the facility runs since a partial uninstall may already have
	/// removed the metadata describing it.
	#[instrument(name = "library::uninstall", level = "debug", skip_all, fields(name = %name, scope = %scope))]
	pub fn uninstall(&self, name: &str, scope: Scope, root: &Path) -> Result<()> {
		let artifacts = match LibraryInstallation::find(root, name, scope)? {
			Some(installation) => installation.owned_artifacts(),
			None => Vec::new(),
		};

		let facility_error = match self.facility.uninstall(name, root) {
			Ok(()) => match LibraryInstallation::find(root, name, scope)? {
				None => return Ok(()),
				Some(_) => Error::library(format!("package '{name}' is still installed after uninstall")),
			},
			Err(err) => err,
		};

		if !root.exists() {
			return Err(facility_error);
		}

		warn!(error = %facility_error, "failed to fully uninstall, deleting files manually");
		for artifact in artifacts.iter().chain(stray_shims(root, name)?.iter()) {
			remove_artifact(artifact)?;
		}
		Ok(())
	}
}
