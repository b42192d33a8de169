//! Error types for CARE store

use std::path::PathBuf;

use care_core::{LifecycleError, ValidationError};

/// Persistence error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Submission rejected before any I/O
    #[error("submission rejected: {0}")]
    Rejected(#[from] ValidationError),

    /// File system failure
    #[error("i/o error at {}: {source}", .path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed
    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// CSV encoding or decoding failed
    #[error("tabular log error: {0}")]
    Csv(#[from] csv::Error),

    /// Target record file is already present
    #[error("record file already exists: {}", .0.display())]
    RecordExists(PathBuf),

    /// Existing log header cannot hold the row
    #[error("log schema mismatch in {}: expected columns {expected:?}, found {found:?}", .path.display())]
    SchemaMismatch {
        /// Log file
        path: PathBuf,
        /// Columns the row needs
        expected: Vec<String>,
        /// Columns present in the header
        found: Vec<String>,
    },

    /// Log row could not be parsed
    #[error("malformed log row {line}: {reason}")]
    MalformedRow {
        /// 1-based line in the log file
        line: u64,
        /// What was wrong
        reason: String,
    },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Submission lifecycle violated
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
}

impl StoreError {
    /// Wrap an I/O error with the path it concerns
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if the user can correct the input and resubmit
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Single message to show the respondent
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(e) => e.user_message().to_string(),
            other => format!("Your response could not be saved: {other}"),
        }
    }
}
