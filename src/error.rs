//! Error handling for Audiograph
//!
//! The graph model itself never fails. Errors only come from decoding
//! snapshots, loading files and talking to a native backend.

use thiserror::Error;

/// Result type alias for Audiograph operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// Main error type for Audiograph operations
#[derive(Error, Debug)]
pub enum GraphError {
    // Decode Errors
    #[error("Unknown node type: {name}")]
    UnknownNodeType { name: String },

    #[error("Invalid value for '{label}': expected {expected}, found {found}")]
    InvalidValue {
        label: String,
        expected: String,
        found: String,
    },

    #[error("Malformed graph document: {reason}")]
    Decode { reason: String },

    // Bridge Errors
    #[error("Connection references missing node '{node_id}'")]
    DanglingEndpoint { node_id: String },

    #[error("Backend operation '{operation}' failed: {reason}")]
    Backend { operation: String, reason: String },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphError {
    /// Build a backend failure for the given operation name
    pub fn backend(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        GraphError::Backend {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphError::UnknownNodeType { .. } => "UNKNOWN_NODE_TYPE",
            GraphError::InvalidValue { .. } => "INVALID_VALUE",
            GraphError::Decode { .. } => "DECODE_ERROR",
            GraphError::DanglingEndpoint { .. } => "DANGLING_ENDPOINT",
            GraphError::Backend { .. } => "BACKEND_ERROR",
            GraphError::FileNotFound { .. } => "FILE_NOT_FOUND",
            GraphError::Io(_) => "IO_ERROR",
            GraphError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Configuration errors in a snapshot (unknown node types, bad values)
    /// are never retried. A caller can fix a file path or a dangling edge
    /// and deliver again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GraphError::FileNotFound { .. } | GraphError::DanglingEndpoint { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            GraphError::UnknownNodeType { .. } => {
                Some("Use one of the names listed by 'audiograph-cli types'.")
            }
            GraphError::InvalidValue { .. } => {
                Some("Check the value against the node template ('audiograph-cli template <TYPE>').")
            }
            GraphError::DanglingEndpoint { .. } => {
                Some("Add the missing node or remove the connection before delivering the snapshot.")
            }
            GraphError::Backend { .. } => {
                Some("Check channel indices and input names against the node signature.")
            }
            GraphError::FileNotFound { .. } => Some("Check the file path and try again."),
            _ => None,
        }
    }
}
