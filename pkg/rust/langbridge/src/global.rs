// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The process-wide extension and what `Init` builds it from.

use std::sync::Arc;

use langbridge_runtime::{ScriptRuntime, UnitRegistry, script::builtin};
use langbridge_session::{Extension, ExtensionConfig};
use langbridge_sub_tracing::TracingBuilder;
use langbridge_type::{Result, contract_violation};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

static EXTENSION: Lazy<RwLock<Option<Arc<Extension>>>> = Lazy::new(|| RwLock::new(None));

static UNITS: Lazy<Mutex<UnitRegistry>> = Lazy::new(|| {
	let mut registry = UnitRegistry::default();
	builtin::register(&mut registry);
	Mutex::new(registry)
});

/// Adds units to the registry the next `Init` starts its runtime with. The builtin units are
/// always present.
pub fn register_units(f: impl FnOnce(&mut UnitRegistry)) {
	f(&mut UNITS.lock());
}

/// Installs logging and starts the extension. A running extension is shut down and replaced.
pub(crate) fn start(config: ExtensionConfig) -> Result<()> {
	let mut tracing = TracingBuilder::new().directives(config.log_filter.clone()).json(config.log_json());
	if let Some(file) = config.log_file() {
		tracing = tracing.log_file(file);
	}
	if !tracing.try_init()? {
		debug!("a tracing subscriber was already installed");
	}

	let runtime = ScriptRuntime::new(UNITS.lock().clone());
	let extension = Arc::new(Extension::init(config, Box::new(runtime))?);

	let previous = EXTENSION.write().replace(extension);
	if let Some(previous) = previous {
		warn!("Init called on a running extension; the previous one is shut down");
		previous.shutdown()?;
	}
	Ok(())
}

/// Shuts the extension down. Without one this does nothing.
pub(crate) fn stop() -> Result<()> {
	let extension = EXTENSION.write().take();
	match extension {
		Some(extension) => extension.shutdown(),
		None => {
			debug!("cleanup without a running extension");
			Ok(())
		}
	}
}

pub(crate) fn extension() -> Result<Arc<Extension>> {
	current().ok_or_else(|| contract_violation!("Init has not been called"))
}

pub(crate) fn current() -> Option<Arc<Extension>> {
	EXTENSION.read().clone()
}
