//! Error type for batch runs.

use thiserror::Error;

use ghost_core::error::GhostError;

/// Errors that stop a batch run or a CLI command.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Config file does not exist.
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    /// Config file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigRead {
        /// Config path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid RON.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Config could not be rendered as RON.
    #[error("Failed to format config: {0}")]
    ConfigFormat(#[from] ron::Error),

    /// Detection engine rejected the request.
    #[error(transparent)]
    Detection(#[from] GhostError),

    /// Scan root does not exist.
    #[error("Scan root not found: {0}")]
    ScanRootMissing(String),

    /// Worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    /// Appending to the results destination failed.
    #[error("Failed to write results to '{path}': {source}")]
    Output {
        /// Results destination.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the JSON summary failed.
    #[error("Failed to write summary '{path}': {message}")]
    Summary {
        /// Summary path.
        path: String,
        /// Error message.
        message: String,
    },
}
