// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{path::Path, sync::Arc};

use dashmap::DashMap;
use langbridge_abi::{data::ColumnSlice, session::SessionKey};
use langbridge_library::{LibraryInstallation, LibraryManager};
use langbridge_marshal::ColumnDescriptor;
use langbridge_param::ParamDeclaration;
use langbridge_runtime::{Runtime, RuntimeHandle, UnitId};
use langbridge_type::{Result, contract_violation};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
	config::ExtensionConfig,
	session::{Session, SessionSpec},
};

/// Process-wide extension state: the started runtime, the open sessions and the library manager.
pub struct Extension {
	config: ExtensionConfig,
	runtime: RuntimeHandle,
	sessions: DashMap<SessionKey, Arc<Mutex<Session>>>,
	libraries: LibraryManager,
}

impl Extension {
	/// Starts `runtime` with the configured package search path.
	#[instrument(name = "extension::init", level = "debug", skip_all, fields(runtime = runtime.name()))]
	pub fn init(config: ExtensionConfig, mut runtime: Box<dyn Runtime>) -> Result<Self> {
		runtime.initialize(config.search_path())?;
		match config.to_json() {
			Ok(json) => info!(config = %json, "extension initialized"),
			Err(err) => warn!(error = %err, "extension initialized; configuration not printable"),
		}
		Ok(Self {
			config,
			runtime: RuntimeHandle::from_boxed(runtime),
			sessions: DashMap::new(),
			libraries: LibraryManager::default(),
		})
	}

	pub fn with_libraries(mut self, libraries: LibraryManager) -> Self {
		self.libraries = libraries;
		self
	}

	pub fn config(&self) -> &ExtensionConfig {
		&self.config
	}

	pub fn runtime(&self) -> &RuntimeHandle {
		&self.runtime
	}

	pub fn session_count(&self) -> usize {
		self.sessions.len()
	}

	/// Binds the script and opens a session. A session already open under `key` is replaced.
	#[instrument(name = "extension::init_session", level = "debug", skip_all, fields(session = %key, columns = spec.column_count, params = spec.param_count))]
	pub fn init_session(&self, key: SessionKey, spec: SessionSpec) -> Result<()> {
		let unit = self.bind(&spec.script)?;
		let session = Session::new(key, spec, unit);
		if self.sessions.insert(key, Arc::new(Mutex::new(session))).is_some() {
			warn!(session = %key, "session was already open and has been replaced");
		}
		Ok(())
	}

	/// Resolves `script`; after a first failure the partial unit is detached and the lookup retried
	/// once.
	fn bind(&self, script: &str) -> Result<UnitId> {
		match self.runtime.resolve(script) {
			Ok(unit) => Ok(unit),
			Err(err) => {
				warn!(error = %err, "binding script failed, retrying");
				self.runtime.detach(script);
				self.runtime.resolve(script)
			}
		}
	}

	pub fn session(&self, key: SessionKey) -> Result<Arc<Mutex<Session>>> {
		self.sessions
			.get(&key)
			.map(|entry| entry.value().clone())
			.ok_or_else(|| contract_violation!("session {key} is not open"))
	}

	/// Runs `f` with the session locked.
	pub fn with_session<R>(&self, key: SessionKey, f: impl FnOnce(&mut Session) -> Result<R>) -> Result<R> {
		let session = self.session(key)?;
		let mut session = session.lock();
		f(&mut session)
	}

	pub fn init_column(&self, key: SessionKey, descriptor: ColumnDescriptor) -> Result<()> {
		self.with_session(key, |session| session.init_column(descriptor))
	}

	pub fn init_param(
		&self,
		key: SessionKey,
		declaration: ParamDeclaration,
		value: Option<&[u8]>,
		indicator: i32,
	) -> Result<()> {
		self.with_session(key, |session| session.init_param(declaration, value, indicator))
	}

	pub fn execute(&self, key: SessionKey, row_count: usize, inputs: &[ColumnSlice<'_>]) -> Result<u16> {
		self.with_session(key, |session| session.execute(&self.runtime, row_count, inputs))
	}

	/// Drops the session and everything it owns. Unknown sessions are ignored.
	#[instrument(name = "extension::cleanup_session", level = "debug", skip(self))]
	pub fn cleanup_session(&self, key: SessionKey) {
		match self.sessions.remove(&key) {
			Some(_) => debug!("session released"),
			None => debug!("no such session, nothing to release"),
		}
	}

	#[instrument(name = "extension::install_library", level = "debug", skip(self, archive, root))]
	pub fn install_library(&self, name: &str, archive: &Path, root: &Path) -> Result<LibraryInstallation> {
		let scope = self.config.scope_of(&root.to_string_lossy());
		let installation = self.libraries.install(name, archive, scope, root)?;
		info!(name = %installation.name, version = %installation.version, %scope, "library installed");
		Ok(installation)
	}

	#[instrument(name = "extension::uninstall_library", level = "debug", skip(self, root))]
	pub fn uninstall_library(&self, name: &str, root: &Path) -> Result<()> {
		let scope = self.config.scope_of(&root.to_string_lossy());
		self.libraries.uninstall(name, scope, root)?;
		info!(%scope, "library uninstalled");
		Ok(())
	}

	/// Releases every session and stops the runtime.
	#[instrument(name = "extension::shutdown", level = "debug", skip_all)]
	pub fn shutdown(&self) -> Result<()> {
		let open = self.sessions.len();
		if open > 0 {
			warn!(open, "releasing sessions still open at shutdown");
		}
		self.sessions.clear();
		self.runtime.lock().shutdown()?;
		Ok(())
	}
}

#[cfg(test)]
pub mod tests {
	use langbridge_abi::session::SessionId;
	use langbridge_runtime::ScriptRuntime;
	use langbridge_type::{ErrorKind, TypeTag};

	use super::*;

	fn extension() -> Extension {
		Extension::init(ExtensionConfig::default(), Box::new(ScriptRuntime::with_builtins())).unwrap()
	}

	#[test]
	fn test_unknown_script_fails_after_retry() {
		let extension = extension();
		let key = SessionKey::new(SessionId::new(), 0);
		let err = extension.init_session(key, SessionSpec::new("missing", 0, 0)).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NativeRuntimeFailure);
		assert_eq!(extension.session_count(), 0);
	}

	#[test]
	fn test_calls_before_init_session_are_violations() {
		let extension = extension();
		let key = SessionKey::new(SessionId::new(), 0);
		let err = extension.init_column(key, ColumnDescriptor::new(0, "x", TypeTag::Int32, 4)).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::ContractViolation);
		assert_eq!(extension.execute(key, 0, &[]).unwrap_err().kind(), ErrorKind::ContractViolation);
	}

	#[test]
	fn test_sessions_are_keyed_by_task() {
		let extension = extension();
		let id = SessionId::new();
		extension.init_session(SessionKey::new(id, 0), SessionSpec::new("identity", 0, 0)).unwrap();
		extension.init_session(SessionKey::new(id, 1), SessionSpec::new("identity", 0, 0).task_count(2)).unwrap();
		assert_eq!(extension.session_count(), 2);

		extension.cleanup_session(SessionKey::new(id, 0));
		extension.cleanup_session(SessionKey::new(id, 0));
		assert_eq!(extension.session_count(), 1);
		assert!(extension.session(SessionKey::new(id, 1)).is_ok());
	}

	#[test]
	fn test_reopening_a_session_replaces_it() {
		let extension = extension();
		let key = SessionKey::new(SessionId::new(), 0);
		extension.init_session(key, SessionSpec::new("identity", 0, 0)).unwrap();
		extension.execute(key, 0, &[]).unwrap();
		extension.init_session(key, SessionSpec::new("count", 0, 0)).unwrap();

		extension.with_session(key, |session| {
			assert_eq!(session.spec().script, "count");
			assert_eq!(session.batches(), 0);
			Ok(())
		})
		.unwrap();
	}

	#[test]
	fn test_shutdown_releases_sessions() {
		let extension = extension();
		let handle = extension.runtime().clone();
		extension.init_session(SessionKey::new(SessionId::new(), 0), SessionSpec::new("identity", 0, 0)).unwrap();
		extension.shutdown().unwrap();
		assert!(handle.resolve("identity").is_err());
	}
}
