// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	fmt::{Display, Formatter},
	io,
};

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used at the call boundary to pick log levels and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	ContractViolation,
	UnsupportedType,
	NativeRuntimeFailure,
	LibraryOperationFailure,
	MissingOutputParameter,
	NotAnOutputParameter,
	UninitializedParameter,
	MalformedBuffer,
}

impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			ErrorKind::ContractViolation => f.write_str("contract violation"),
			ErrorKind::UnsupportedType => f.write_str("unsupported type"),
			ErrorKind::NativeRuntimeFailure => f.write_str("native runtime failure"),
			ErrorKind::LibraryOperationFailure => f.write_str("library operation failure"),
			ErrorKind::MissingOutputParameter => f.write_str("missing output parameter"),
			ErrorKind::NotAnOutputParameter => f.write_str("not an output parameter"),
			ErrorKind::UninitializedParameter => f.write_str("uninitialized parameter"),
			ErrorKind::MalformedBuffer => f.write_str("malformed buffer"),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	ContractViolation {
		message: String,
	},

	#[error("unsupported type: {what}")]
	UnsupportedType {
		what: String,
	},

	#[error("{class}: {message}{}", render_trace(.trace))]
	NativeRuntimeFailure {
		class: String,
		message: String,
		trace: Option<String>,
	},

	#[error("{message}")]
	LibraryOperationFailure {
		message: String,
	},

	#[error("{context}: {source}")]
	Io {
		context: String,
		#[source]
		source: io::Error,
	},

	#[error("output parameter '{name}' was not found in the runtime's parameter map")]
	MissingOutputParameter {
		name: String,
	},

	#[error("parameter {id} ('{name}') was not initialized as an output parameter")]
	NotAnOutputParameter {
		id: u16,
		name: String,
	},

	#[error("parameter {id} was never initialized")]
	UninitializedParameter {
		id: u16,
	},

	#[error("malformed buffer: {message}")]
	MalformedBuffer {
		message: String,
	},
}

fn render_trace(trace: &Option<String>) -> String {
	match trace {
		Some(trace) => format!("\n{trace}"),
		None => String::new(),
	}
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::ContractViolation {
				..
			} => ErrorKind::ContractViolation,
			Error::UnsupportedType {
				..
			} => ErrorKind::UnsupportedType,
			Error::NativeRuntimeFailure {
				..
			} => ErrorKind::NativeRuntimeFailure,
			Error::LibraryOperationFailure {
				..
			}
			| Error::Io {
				..
			} => ErrorKind::LibraryOperationFailure,
			Error::MissingOutputParameter {
				..
			} => ErrorKind::MissingOutputParameter,
			Error::NotAnOutputParameter {
				..
			} => ErrorKind::NotAnOutputParameter,
			Error::UninitializedParameter {
				..
			} => ErrorKind::UninitializedParameter,
			Error::MalformedBuffer {
				..
			} => ErrorKind::MalformedBuffer,
		}
	}

	pub fn unsupported(what: impl Into<String>) -> Self {
		Error::UnsupportedType {
			what: what.into(),
		}
	}

	pub fn malformed(message: impl Into<String>) -> Self {
		Error::MalformedBuffer {
			message: message.into(),
		}
	}

	pub fn library(message: impl Into<String>) -> Self {
		Error::LibraryOperationFailure {
			message: message.into(),
		}
	}

	pub fn io(context: impl Into<String>, source: io::Error) -> Self {
		Error::Io {
			context: context.into(),
			source,
		}
	}
}

/// Builds an [`Error::ContractViolation`] from a format string.
#[macro_export]
macro_rules! contract_violation {
	($($arg:tt)*) => {
		$crate::error::Error::ContractViolation {
			message: format!($($arg)*),
		}
	};
}

/// Returns early with an [`Error::ContractViolation`].
#[macro_export]
macro_rules! return_contract_violation {
	($($arg:tt)*) => {
		return Err($crate::contract_violation!($($arg)*))
	};
}

#[cfg(test)]
pub mod tests {
	use super::*;

	#[test]
	fn test_kind_of_io_error_is_library_failure() {
		let err = Error::io("extracting archive", io::Error::new(io::ErrorKind::NotFound, "gone"));
		assert_eq!(err.kind(), ErrorKind::LibraryOperationFailure);
		assert_eq!(err.to_string(), "extracting archive: gone");
	}

	#[test]
	fn test_native_failure_message_includes_trace() {
		let err = Error::NativeRuntimeFailure {
			class: "ValueError".to_string(),
			message: "bad input".to_string(),
			trace: Some("at unit 'scale'".to_string()),
		};
		assert_eq!(err.to_string(), "ValueError: bad input\nat unit 'scale'");

		let err = Error::NativeRuntimeFailure {
			class: "ValueError".to_string(),
			message: "bad input".to_string(),
			trace: None,
		};
		assert_eq!(err.to_string(), "ValueError: bad input");
	}

	#[test]
	fn test_contract_violation_macro() {
		let err = contract_violation!("column {} out of range", 7);
		assert_eq!(err.kind(), ErrorKind::ContractViolation);
		assert_eq!(err.to_string(), "column 7 out of range");
	}
}
