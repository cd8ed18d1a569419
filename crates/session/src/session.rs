// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use langbridge_abi::{
	constants::{DEFAULT_INPUT_DATA_NAME, DEFAULT_OUTPUT_DATA_NAME},
	data::{ColumnSlice, ResultPointers},
	session::SessionKey,
};
use langbridge_marshal::{ColumnDescriptor, OutputColumn, from_native, output_tag, scalar, to_native};
use langbridge_param::{ParamContainer, ParamDeclaration};
use langbridge_runtime::{Frame, Invocation, ParamMap, RuntimeHandle, UnitId};
use langbridge_type::{Error, Result, return_contract_violation};
use tracing::{debug, info, instrument, warn};

use crate::state::SessionState;

/// What `InitSession` declares about a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSpec {
	pub task_count: u16,
	pub script: String,
	pub column_count: u16,
	pub param_count: u16,
	pub input_name: String,
	pub output_name: String,
}

impl SessionSpec {
	pub fn new(script: impl Into<String>, column_count: u16, param_count: u16) -> Self {
		Self {
			task_count: 1,
			script: script.into(),
			column_count,
			param_count,
			input_name: DEFAULT_INPUT_DATA_NAME.to_string(),
			output_name: DEFAULT_OUTPUT_DATA_NAME.to_string(),
		}
	}

	pub fn task_count(mut self, task_count: u16) -> Self {
		self.task_count = task_count;
		self
	}

	/// Overrides the table names; absent or blank names keep the defaults.
	pub fn data_names(mut self, input: Option<&str>, output: Option<&str>) -> Self {
		if let Some(input) = input.map(str::trim).filter(|n| !n.is_empty()) {
			self.input_name = input.to_string();
		}
		if let Some(output) = output.map(str::trim).filter(|n| !n.is_empty()) {
			self.output_name = output.to_string();
		}
		self
	}
}

/// One unit of work: a bound script, its declared schema and parameters, and the results of the
/// last batch.
pub struct Session {
	key: SessionKey,
	spec: SessionSpec,
	unit: UnitId,
	state: SessionState,
	columns: Vec<Option<ColumnDescriptor>>,
	params: ParamContainer,
	/// Parameter map as the runtime left it after the last batch
	native_params: ParamMap,
	output: Vec<OutputColumn>,
	output_rows: usize,
	pointers: ResultPointers,
	batches: u64,
}

impl Session {
	pub(crate) fn new(key: SessionKey, spec: SessionSpec, unit: UnitId) -> Self {
		let state = if spec.column_count == 0 {
			SessionState::SchemaBound
		} else {
			SessionState::Open
		};
		Self {
			key,
			columns: vec![None; spec.column_count as usize],
			params: ParamContainer::new(spec.param_count),
			spec,
			unit,
			state,
			native_params: ParamMap::new(),
			output: Vec::new(),
			output_rows: 0,
			pointers: ResultPointers::default(),
			batches: 0,
		}
	}

	pub fn key(&self) -> SessionKey {
		self.key
	}

	pub fn spec(&self) -> &SessionSpec {
		&self.spec
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	/// Number of batches executed so far.
	pub fn batches(&self) -> u64 {
		self.batches
	}

	pub fn column(&self, id: u16) -> Option<&ColumnDescriptor> {
		self.columns.get(id as usize)?.as_ref()
	}

	pub fn params(&self) -> &ParamContainer {
		&self.params
	}

	#[instrument(name = "session::init_column", level = "debug", skip_all, fields(session = %self.key, id = descriptor.id, name = %descriptor.name, tag = %descriptor.tag))]
	pub fn init_column(&mut self, descriptor: ColumnDescriptor) -> Result<()> {
		let id = descriptor.id;
		let Some(slot) = self.columns.get(id as usize) else {
			return_contract_violation!(
				"column id {id} is out of range; {} columns were declared",
				self.spec.column_count
			);
		};
		if slot.is_some() {
			return_contract_violation!("column {id} was already initialized");
		}
		scalar::validate_size(descriptor.tag, descriptor.size)?;

		self.columns[id as usize] = Some(descriptor);
		if self.columns.iter().all(Option::is_some) && self.state == SessionState::Open {
			debug!("schema bound");
			self.state = SessionState::SchemaBound;
		}
		Ok(())
	}

	#[instrument(name = "session::init_param", level = "debug", skip_all, fields(session = %self.key, id = declaration.id, name = %declaration.name))]
	pub fn init_param(&mut self, declaration: ParamDeclaration, value: Option<&[u8]>, indicator: i32) -> Result<()> {
		self.params.add(declaration, value, indicator)
	}

	/// Runs one batch and returns the number of output columns.
	///
	/// The previous batch's output is released first, so a failed batch leaves no results behind.
	#[instrument(name = "session::execute", level = "debug", skip_all, fields(session = %self.key, rows = row_count, batch = self.batches))]
	pub fn execute(&mut self, runtime: &RuntimeHandle, row_count: usize, inputs: &[ColumnSlice<'_>]) -> Result<u16> {
		if !self.state.can_execute() {
			let missing: Vec<usize> =
				self.columns.iter().enumerate().filter(|(_, c)| c.is_none()).map(|(i, _)| i).collect();
			return_contract_violation!("execute before every input column was initialized; missing {missing:?}");
		}
		if inputs.len() != self.columns.len() {
			return_contract_violation!(
				"execute got {} input columns, {} were declared",
				inputs.len(),
				self.columns.len()
			);
		}

		self.release_output();

		let mut columns = Vec::with_capacity(inputs.len());
		for (descriptor, slice) in self.columns.iter().flatten().zip(inputs) {
			if slice.row_count != row_count {
				return_contract_violation!(
					"column '{}' has {} rows, the batch has {row_count}",
					descriptor.name,
					slice.row_count
				);
			}
			columns.push(to_native(descriptor, *slice)?);
		}

		let mut params = self.params.create_native_map()?;
		let outcome = runtime.invoke(
			self.unit,
			Invocation {
				input_name: &self.spec.input_name,
				output_name: &self.spec.output_name,
				input: Frame::new(columns),
				params: &mut params,
			},
		)?;

		for line in outcome.stdout.lines() {
			info!(target: "langbridge::script", session = %self.key, "{line}");
		}
		for line in outcome.stderr.lines() {
			warn!(target: "langbridge::script", session = %self.key, "{line}");
		}

		let frame = outcome.output.unwrap_or_default();
		let mut output = Vec::with_capacity(frame.len());
		for column in frame.iter() {
			output.push(from_native(column, output_tag(column)?)?);
		}
		let rows = output.first().map_or(0, OutputColumn::row_count);
		if let Some(ragged) = output.iter().find(|c| c.row_count() != rows) {
			return Err(Error::NativeRuntimeFailure {
				class: "ValueError".to_string(),
				message: format!(
					"output column '{}' has {} rows, expected {rows}",
					ragged.name,
					ragged.row_count()
				),
				trace: None,
			});
		}
		let count = u16::try_from(output.len())
			.map_err(|_| Error::unsupported(format!("{} output columns", output.len())))?;

		self.native_params = params;
		self.output = output;
		self.output_rows = rows;
		self.pointers = ResultPointers::new(self.output.iter().map(|c| &c.buffer));
		self.state = SessionState::Executed;
		self.batches += 1;
		debug!(columns = count, rows, "batch done");
		Ok(count)
	}

	fn release_output(&mut self) {
		self.pointers = ResultPointers::default();
		self.output.clear();
		self.output_rows = 0;
		self.native_params.clear();
		if self.state == SessionState::Executed {
			self.state = SessionState::SchemaBound;
		}
	}

	fn require_results(&self, call: &str) -> Result<()> {
		if !self.state.has_results() {
			return_contract_violation!("{call} before a successful execute");
		}
		Ok(())
	}

	pub fn result_column(&self, id: u16) -> Result<&OutputColumn> {
		self.require_results("result column")?;
		match self.output.get(id as usize) {
			Some(column) => Ok(column),
			None => {
				return_contract_violation!("result column {id} is out of range; the batch produced {}", self.output.len())
			}
		}
	}

	/// Output columns of the last batch.
	pub fn output(&self) -> Result<&[OutputColumn]> {
		self.require_results("results")?;
		Ok(&self.output)
	}

	/// Row count and the per-column pointer arrays of the last batch. The pointers stay valid until
	/// the next execute or cleanup.
	pub fn results(&self) -> Result<(usize, &ResultPointers)> {
		self.require_results("results")?;
		Ok((self.output_rows, &self.pointers))
	}

	/// Converts output parameter `id` back from the runtime's parameter map.
	pub fn output_param(&mut self, id: u16) -> Result<(&[u8], i32)> {
		self.require_results("output parameter")?;
		self.params.extract_output(id, &self.native_params)
	}
}
