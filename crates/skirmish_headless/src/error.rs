//! Error types for the headless runner.

use std::path::PathBuf;

use skirmish_core::error::SimError;
use thiserror::Error;

/// Result type alias using [`HeadlessError`].
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Failures while loading inputs or writing results.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// Reading or writing a file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A RON input did not parse.
    #[error("Invalid RON in '{path}': {source}")]
    Ron {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: ron::error::SpannedError,
    },

    /// A JSON input or output failed.
    #[error("Invalid JSON in '{path}': {source}")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Input file extension is neither `.ron` nor `.json`.
    #[error("Unsupported file format: '{0}' (expected .ron or .json)")]
    UnsupportedFormat(PathBuf),

    /// The simulation rejected its configuration.
    #[error(transparent)]
    Sim(#[from] SimError),
}

impl HeadlessError {
    /// Wrap an I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a JSON failure on `path`.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
