//! Error types for the detection engine.

use thiserror::Error;

/// Result type alias using [`GhostError`].
pub type Result<T> = std::result::Result<T, GhostError>;

/// Top-level error type for configuration and recording access.
#[derive(Debug, Error)]
pub enum GhostError {
    /// Detection configuration failed validation.
    #[error("Invalid detection config: {0}")]
    InvalidConfig(String),

    /// No decoder is registered for the file's extension.
    #[error("Unsupported recording format: {0}")]
    UnsupportedFormat(String),

    /// The recording could not be opened.
    #[error("Failed to open recording '{path}': {source}")]
    OpenFailed {
        /// Path of the recording.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The recording header is missing or unreadable.
    #[error("Invalid recording header in '{path}': {message}")]
    InvalidHeader {
        /// Path or label of the recording.
        path: String,
        /// Error message.
        message: String,
    },

    /// Failed to write a recording.
    #[error("Failed to encode recording: {0}")]
    Encode(String),
}

/// Error raised while advancing a decoder stream.
///
/// Recoverable errors cover a single frame; the stream can keep going.
/// Fatal errors mean the decoder cannot advance any further.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A length-delimited frame held a payload that failed to decode.
    #[error("Corrupt frame at byte {offset}: {message}")]
    CorruptFrame {
        /// Byte offset of the frame start.
        offset: u64,
        /// Decoder message.
        message: String,
    },

    /// A text line failed to parse.
    #[error("Malformed event on line {line}: {message}")]
    MalformedLine {
        /// One-based line number.
        line: usize,
        /// Parser message.
        message: String,
    },

    /// The stream ended in the middle of a frame.
    #[error("Stream truncated at byte {offset}")]
    Truncated {
        /// Byte offset where data ran out.
        offset: u64,
    },

    /// A frame length is outside the accepted range.
    #[error("Frame length {length} at byte {offset} exceeds limit")]
    OversizedFrame {
        /// Byte offset of the frame start.
        offset: u64,
        /// Declared payload length.
        length: u32,
    },

    /// The underlying reader failed.
    #[error("Stream I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Whether the decoder is unable to advance past this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::CorruptFrame { .. } | Self::MalformedLine { .. } => false,
            Self::Truncated { .. } | Self::OversizedFrame { .. } | Self::Io(_) => true,
        }
    }
}
