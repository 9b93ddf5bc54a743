//! # Ghostwatch Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Snapshot and participant fixtures
//! - Scripted decoders
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
