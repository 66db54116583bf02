//! Unified error handling for the siebwerk crate
//!
//! This module provides a single `Error` enum used across module boundaries,
//! together with a classification surface that maps each variant onto the
//! pipeline's handling strategy:
//!
//! - per-unit recoverable errors are logged at the unit boundary and skipped,
//! - store contention is retried a bounded number of times,
//! - configuration errors abort the run before any worker is dispatched.
//!
//! # Usage
//!
//! ```rust,ignore
//! use siebwerk::error::{Error, ErrorCategory};
//!
//! fn handle_error(err: Error) {
//!     if err.is_contention() {
//!         // retry the upsert
//!     } else if err.is_recoverable() {
//!         tracing::warn!(error = %err, "unit skipped");
//!     } else {
//!         eprintln!("fatal: {err}");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Storage and I/O errors
    Storage,
    /// Text decoding / mojibake repair errors
    Encoding,
    /// Input parsing errors (malformed JSONL records)
    Parsing,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the siebwerk crate
#[derive(Error, Debug)]
pub enum Error {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Encoding repair failure for a value
    #[error("Encoding repair failed: {0}")]
    Encoding(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// A required external resource is absent (fatal at startup)
    #[error("Missing resource: {0}")]
    MissingResource(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Check if this error is recoverable at the unit boundary (log and skip)
    ///
    /// Configuration and missing-resource errors are never recoverable: they
    /// abort the run before any worker is dispatched.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Database(_) => true,
            Self::Io(_) => true,
            Self::Json(_) => true,
            Self::Encoding(_) => true,
            Self::Config(_) => false,
            Self::MissingResource(_) => false,
            Self::Other { .. } => false,
        }
    }

    /// Check if this error is transient store contention (retry the upsert)
    pub fn is_contention(&self) -> bool {
        match self {
            Self::Database(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Database(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Encoding(_) => ErrorCategory::Encoding,
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Config(_) | Self::MissingResource(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing-resource error (fatal at startup)
    pub fn missing_resource(msg: impl Into<String>) -> Self {
        Self::MissingResource(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }
}

// Conversion from rusqlite::Error
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err)
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
