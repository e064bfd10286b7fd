use std::fmt;

use miette::Diagnostic;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

/// Fallback remediation for failures without a dedicated help text.
const GENERIC_SUGGESTION: &str = "check the error message and try again";

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SlsError {
	#[error(transparent)]
	#[diagnostic(code(sls::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid path `{path}`: {reason}")]
	#[diagnostic(
		code(sls::invalid_path),
		help("check the path and try again; relative paths resolve against the current directory")
	)]
	InvalidPath { path: String, reason: String },

	#[error("depth must be an integer between {min} and {max}, got: {depth}")]
	#[diagnostic(
		code(sls::invalid_depth),
		help("use --depth with a value between {min} and {max}")
	)]
	InvalidDepth { depth: i64, min: usize, max: usize },

	#[error("invalid filter pattern `{filter}`: {reason}")]
	#[diagnostic(
		code(sls::invalid_filter),
		help("provide a valid glob pattern like `*.md`")
	)]
	InvalidFilter { filter: String, reason: String },

	#[error("failed to parse `{path}`: {reason}")]
	#[diagnostic(code(sls::parse_error))]
	Parse { path: String, reason: String },

	#[error("permission denied: `{path}`")]
	#[diagnostic(
		code(sls::permission_denied),
		help("check that the current user can read this path")
	)]
	PermissionDenied { path: String },

	#[error("validation failed: {checks} checks, {failed} errors")]
	#[diagnostic(
		code(sls::validation_failed),
		help("create the missing required entries or relax the schema declaring them")
	)]
	ValidationFailed { failed: usize, checks: usize },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(sls::config_parse),
		help("check that sls.toml is valid TOML with a `depth` key and/or an [exclude] section")
	)]
	ConfigParse(String),
}

/// Machine-readable failure codes carried by the error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	InvalidPath,
	InvalidDepth,
	InvalidFilter,
	ParseError,
	PermissionDenied,
	ValidationFailed,
	ConfigParse,
	IoError,
}

impl ErrorCode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::InvalidPath => "INVALID_PATH",
			Self::InvalidDepth => "INVALID_DEPTH",
			Self::InvalidFilter => "INVALID_FILTER",
			Self::ParseError => "PARSE_ERROR",
			Self::PermissionDenied => "PERMISSION_DENIED",
			Self::ValidationFailed => "VALIDATION_FAILED",
			Self::ConfigParse => "CONFIG_PARSE",
			Self::IoError => "IO_ERROR",
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Structured failure written to stderr in machine-readable mode.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
	pub success: bool,
	pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
	pub code: ErrorCode,
	pub message: String,
	pub suggestion: String,
	pub context: Map<String, Value>,
}

impl SlsError {
	pub fn code(&self) -> ErrorCode {
		match self {
			Self::Io(error) => {
				match error.kind() {
					std::io::ErrorKind::NotFound => ErrorCode::InvalidPath,
					std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
					_ => ErrorCode::IoError,
				}
			}
			Self::InvalidPath { .. } => ErrorCode::InvalidPath,
			Self::InvalidDepth { .. } => ErrorCode::InvalidDepth,
			Self::InvalidFilter { .. } => ErrorCode::InvalidFilter,
			Self::Parse { .. } => ErrorCode::ParseError,
			Self::PermissionDenied { .. } => ErrorCode::PermissionDenied,
			Self::ValidationFailed { .. } => ErrorCode::ValidationFailed,
			Self::ConfigParse(_) => ErrorCode::ConfigParse,
		}
	}

	/// Remediation hint, taken from the diagnostic help text.
	pub fn suggestion(&self) -> String {
		self.help()
			.map_or_else(|| GENERIC_SUGGESTION.to_string(), |help| help.to_string())
	}

	/// Free-form key/value context describing the failing input.
	pub fn context(&self) -> Map<String, Value> {
		let value = match self {
			Self::Io(error) => json!({ "kind": format!("{:?}", error.kind()) }),
			Self::InvalidPath { path, reason } => json!({ "path": path, "reason": reason }),
			Self::InvalidDepth { depth, min, max } => {
				json!({ "depth": depth, "min": min, "max": max })
			}
			Self::InvalidFilter { filter, reason } => json!({ "filter": filter, "reason": reason }),
			Self::Parse { path, reason } => json!({ "path": path, "reason": reason }),
			Self::PermissionDenied { path } => json!({ "path": path }),
			Self::ValidationFailed { failed, checks } => {
				json!({ "failed": failed, "checks": checks })
			}
			Self::ConfigParse(reason) => json!({ "reason": reason }),
		};

		match value {
			Value::Object(map) => map,
			_ => Map::new(),
		}
	}

	pub fn envelope(&self) -> ErrorEnvelope {
		ErrorEnvelope {
			success: false,
			error: ErrorBody {
				code: self.code(),
				message: self.to_string(),
				suggestion: self.suggestion(),
				context: self.context(),
			},
		}
	}

	/// Process exit status for this failure.
	pub fn exit_code(&self) -> i32 {
		match self.code() {
			ErrorCode::InvalidPath => 4,
			_ => 1,
		}
	}
}

pub type SlsResult<T> = Result<T, SlsError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
