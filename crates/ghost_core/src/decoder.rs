//! Decoder seam between recordings and the analyzer.
//!
//! A decoder turns a recording into an ordered stream of
//! [`StreamEvent`]s. Decoders are opened through a [`DecoderRegistry`]
//! keyed by file extension and closed by dropping them, so the underlying
//! file is released on every exit path.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{DecodeError, GhostError, Result};
use crate::recording;
use crate::snapshot::StreamEvent;

/// An ordered source of stream events.
pub trait ReplayDecoder {
    /// Advance the stream by one event.
    ///
    /// `Ok(None)` means end of stream. An error with
    /// [`DecodeError::is_fatal`] false covers one frame only and the caller
    /// may keep advancing.
    fn advance(&mut self) -> std::result::Result<Option<StreamEvent>, DecodeError>;
}

impl<D: ReplayDecoder + ?Sized> ReplayDecoder for Box<D> {
    fn advance(&mut self) -> std::result::Result<Option<StreamEvent>, DecodeError> {
        (**self).advance()
    }
}

/// A boxed decoder that can move to a worker thread.
pub type BoxedDecoder = Box<dyn ReplayDecoder + Send>;

/// Opens a decoder for a path.
pub type Opener = fn(&Path) -> Result<BoxedDecoder>;

/// Maps file extensions to decoder openers.
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    openers: BTreeMap<String, Opener>,
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.openers.keys()).finish()
    }
}

impl DecoderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bundled recording formats.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(recording::BINARY_EXTENSION, recording::open_binary);
        registry.register(recording::JSON_LINES_EXTENSION, recording::open_json_lines);
        registry
    }

    /// Register an opener for an extension (without the dot, case-insensitive).
    pub fn register(&mut self, extension: &str, opener: Opener) {
        self.openers.insert(extension.to_ascii_lowercase(), opener);
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.openers.keys().map(String::as_str)
    }

    fn opener_for(&self, path: &Path) -> Option<Opener> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.openers.get(&ext).copied()
    }

    /// Whether a decoder is registered for this path's extension.
    #[must_use]
    pub fn recognizes(&self, path: &Path) -> bool {
        self.opener_for(path).is_some()
    }

    /// Open a decoder for `path`.
    pub fn open(&self, path: &Path) -> Result<BoxedDecoder> {
        let opener = self
            .opener_for(path)
            .ok_or_else(|| GhostError::UnsupportedFormat(path.display().to_string()))?;
        opener(path)
    }
}
