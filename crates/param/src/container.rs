// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use langbridge_runtime::ParamMap;
use langbridge_type::{Error, Result, contract_violation, return_contract_violation};
use tracing::debug;

use crate::parameter::{ParamDeclaration, Parameter};

/// Parameters of one session, in dense id slots with a name index.
#[derive(Debug, Default)]
pub struct ParamContainer {
	slots: Vec<Option<Parameter>>,
	ids: HashMap<String, u16>,
}

impl ParamContainer {
	pub fn new(count: u16) -> Self {
		Self {
			slots: (0..count).map(|_| None).collect(),
			ids: HashMap::with_capacity(count as usize),
		}
	}

	/// Number of declared slots.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Number of parameters added so far.
	pub fn initialized(&self) -> usize {
		self.ids.len()
	}

	/// Deep-copies and stores one parameter. Nothing changes when it is rejected.
	pub fn add(&mut self, declaration: ParamDeclaration, value: Option<&[u8]>, indicator: i32) -> Result<()> {
		let id = declaration.id;
		let Some(slot) = self.slots.get(id as usize) else {
			return_contract_violation!("parameter id {id} is out of range; {} parameters were declared", self.len());
		};
		if slot.is_some() {
			return_contract_violation!("parameter {id} was already initialized");
		}
		if let Some(existing) = self.ids.get(&declaration.name) {
			return_contract_violation!("parameter name '{}' is already used by parameter {existing}", declaration.name);
		}

		let parameter = Parameter::new(declaration, value, indicator)?;
		debug!(id, name = parameter.name(), tag = %parameter.declaration.tag, null = parameter.is_null(), "parameter added");
		self.ids.insert(parameter.name().to_string(), id);
		self.slots[id as usize] = Some(parameter);
		Ok(())
	}

	pub fn get(&self, id: u16) -> Result<&Parameter> {
		match self.slots.get(id as usize) {
			None => Err(out_of_range(id, self.len())),
			Some(None) => Err(Error::UninitializedParameter {
				id,
			}),
			Some(Some(parameter)) => Ok(parameter),
		}
	}

	pub fn by_name(&self, name: &str) -> Option<&Parameter> {
		let id = self.ids.get(name)?;
		self.slots.get(*id as usize)?.as_ref()
	}

	/// The parameters as the runtime sees them: name to value in id order, `None` for NULL.
	pub fn create_native_map(&self) -> Result<ParamMap> {
		let mut map = ParamMap::with_capacity(self.ids.len());
		for parameter in self.slots.iter().flatten() {
			map.insert(parameter.name().to_string(), parameter.to_native()?);
		}
		Ok(map)
	}

	/// Reads output parameter `id` back from `map`, replacing its value, and returns the new value
	/// bytes and indicator.
	pub fn extract_output(&mut self, id: u16, map: &ParamMap) -> Result<(&[u8], i32)> {
		let len = self.len();
		let parameter = match self.slots.get_mut(id as usize) {
			None => return Err(out_of_range(id, len)),
			Some(None) => {
				return Err(Error::UninitializedParameter {
					id,
				});
			}
			Some(Some(parameter)) => parameter,
		};

		if !parameter.declaration.direction.is_output() {
			return Err(Error::NotAnOutputParameter {
				id,
				name: parameter.name().to_string(),
			});
		}
		let value = map.get(parameter.name()).ok_or_else(|| Error::MissingOutputParameter {
			name: parameter.name().to_string(),
		})?;

		parameter.assign(value)?;
		Ok((parameter.bytes(), parameter.indicator()))
	}
}

fn out_of_range(id: u16, len: usize) -> Error {
	contract_violation!("parameter id {id} is out of range; {len} parameters were declared")
}
