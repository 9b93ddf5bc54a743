//! Results destinations.
//!
//! Workers hand each file's finished report block to a [`ResultsSink`].
//! Sinks serialize appends so blocks from parallel workers never
//! interleave.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::RunnerError;

/// Append-only destination for report blocks.
pub trait ResultsSink: Send + Sync {
    /// Append one complete block. Failure is fatal to the run.
    fn append(&self, block: &str) -> Result<(), RunnerError>;
}

/// Appends blocks to a file, creating it if needed.
#[derive(Debug)]
pub struct AppendFileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AppendFileSink {
    /// Sink appending to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultsSink for AppendFileSink {
    fn append(&self, block: &str) -> Result<(), RunnerError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| {
                file.write_all(block.as_bytes())?;
                file.flush()
            })
            .map_err(|source| RunnerError::Output {
                path: self.path.display().to_string(),
                source,
            })
    }
}

/// Keeps blocks in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks appended so far, in append order.
    pub fn blocks(&self) -> Vec<String> {
        self.blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultsSink for MemorySink {
    fn append(&self, block: &str) -> Result<(), RunnerError> {
        self.blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(block.to_string());
        Ok(())
    }
}
