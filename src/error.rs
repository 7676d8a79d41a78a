//! Error types for compressed-dictionary
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::compression::Compression;

/// Result type alias using DictError
pub type Result<T> = std::result::Result<T, DictError>;

/// Unified error type for compressed-dictionary operations
#[derive(Debug, Error)]
pub enum DictError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Configuration(String),

    // -------------------------------------------------------------------------
    // Mapping Errors
    // -------------------------------------------------------------------------
    #[error("Key not found: {key}")]
    KeyNotFound { key: i64 },

    #[error("Incompatible dictionaries: {left} vs {right} compression")]
    Incompatible { left: Compression, right: Compression },

    #[error("Duplicate key {key}{}", .source_path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    DuplicateKey {
        key: i64,
        source_path: Option<PathBuf>,
    },

    // -------------------------------------------------------------------------
    // Record Stream Errors
    // -------------------------------------------------------------------------
    #[error("Format error{}: {message}", .path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    Format {
        path: Option<PathBuf>,
        message: String,
    },

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Compression error ({algorithm}): {message}")]
    Compression {
        algorithm: Compression,
        message: String,
    },
}

impl DictError {
    /// Format error without a file path attached
    pub(crate) fn format(message: impl Into<String>) -> Self {
        DictError::Format {
            path: None,
            message: message.into(),
        }
    }

    /// Attach a file path to path-less format and duplicate-key errors
    pub(crate) fn with_path(self, file: &std::path::Path) -> Self {
        match self {
            DictError::Format { path: None, message } => DictError::Format {
                path: Some(file.to_path_buf()),
                message,
            },
            DictError::DuplicateKey {
                key,
                source_path: None,
            } => DictError::DuplicateKey {
                key,
                source_path: Some(file.to_path_buf()),
            },
            other => other,
        }
    }
}

/// Attach the path being opened to an I/O error
pub(crate) fn open_error(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> DictError + '_ {
    move |source| DictError::Open {
        path: path.to_path_buf(),
        source,
    }
}

impl From<serde_json::Error> for DictError {
    fn from(e: serde_json::Error) -> Self {
        DictError::Serialization(e.to_string())
    }
}
