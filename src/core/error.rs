/// Error Types
///
/// Every failure the servers can report has a variant here. Startup failures
/// (`DataLoadError`) abort the process; everything else is recovered at the
/// tool dispatcher and returned to the client as a structured error result.

use std::path::PathBuf;
use thiserror::Error;

/// Dataset could not be loaded. Fatal at startup.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("Dataset not found at {path}")]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed dataset {origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Dataset {origin} has a record with an empty id at position {index}")]
    EmptyId { origin: String, index: usize },

    #[error("Dataset {origin} has duplicate record id '{id}'")]
    DuplicateId { origin: String, id: String },
}

/// Lookup by exact reference failed.
#[derive(Debug, Error, PartialEq)]
pub enum LookupError {
    #[error("No record matches reference '{reference}'")]
    NotFound { reference: String },
}

/// Calculator rejected its inputs.
#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("{field} must be a positive number, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be at least 1, got {value}")]
    CountTooSmall { field: &'static str, value: i64 },

    #[error("{field} is too large to calculate a quantity for")]
    OutOfRange { field: &'static str },
}

/// Error returned by the tool dispatcher.
///
/// `kind()` is the machine-readable tag sent to clients alongside the message.
#[derive(Debug, Error, PartialEq)]
pub enum ToolError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error(transparent)]
    NotFound(#[from] LookupError),

    #[error(transparent)]
    InvalidInput(#[from] CalcError),
}

impl ToolError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool { .. } => "unknown_tool",
            ToolError::InvalidArgument { .. } => "invalid_argument",
            ToolError::NotFound(_) => "not_found",
            ToolError::InvalidInput(_) => "invalid_input",
        }
    }

    /// Structured error payload: `{"kind": ..., "message": ...}`.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        })
    }
}
