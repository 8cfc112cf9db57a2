//! Error types for the specsearch library.
//!
//! All failures are represented by the [`SpecSearchError`] enum. Core errors
//! (dimension mismatches, untrained indexes, missing training data) are
//! programmer/data errors and are reported to the immediate caller without
//! any retry or recovery; boundary I/O errors are propagated unchanged.
//!
//! # Examples
//!
//! ```
//! use specsearch::error::{Result, SpecSearchError};
//!
//! fn check_dimension(expected: usize, actual: usize) -> Result<()> {
//!     if expected != actual {
//!         return Err(SpecSearchError::DimensionMismatch { expected, actual });
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_dimension(8, 9).is_err());
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for specsearch operations.
#[derive(Error, Debug)]
pub enum SpecSearchError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A vector's length disagrees with the index's fixed dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the index or corpus was fixed to.
        expected: usize,
        /// The dimension of the offending vector.
        actual: usize,
    },

    /// Insertion or search attempted on a partitioned index before training.
    #[error("index not trained: {0}")]
    NotTrained(String),

    /// Fewer training samples than requested clusters.
    #[error("insufficient training data: {samples} samples for {clusters} clusters")]
    InsufficientTrainingData {
        /// Number of training vectors supplied.
        samples: usize,
        /// Number of clusters requested.
        clusters: usize,
    },

    /// A file extension no loader understands.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A path that does not exist on disk.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// A k > 0 search issued against an index holding zero vectors.
    #[error("empty index: {0}")]
    EmptyIndex(String),

    /// Serialization/deserialization failures.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A file whose contents do not match its declared format.
    #[error("corrupt file: {0}")]
    Corrupt(String),

    /// Invalid operation
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error
    #[error("error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`SpecSearchError`].
pub type Result<T> = std::result::Result<T, SpecSearchError>;

impl SpecSearchError {
    /// Create a new not-trained error.
    pub fn not_trained<S: Into<String>>(msg: S) -> Self {
        SpecSearchError::NotTrained(msg.into())
    }

    /// Create a new unsupported-format error.
    pub fn unsupported_format<S: Into<String>>(msg: S) -> Self {
        SpecSearchError::UnsupportedFormat(msg.into())
    }

    /// Create a new file-not-found error.
    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        SpecSearchError::FileNotFound(path.into())
    }

    /// Create a new empty-index error.
    pub fn empty_index<S: Into<String>>(msg: S) -> Self {
        SpecSearchError::EmptyIndex(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        SpecSearchError::Serialization(msg.into())
    }

    /// Create a new corrupt-file error.
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        SpecSearchError::Corrupt(msg.into())
    }

    /// Create a new invalid-operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        SpecSearchError::InvalidOperation(msg.into())
    }
}
