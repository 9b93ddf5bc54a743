//! # Ghostwatch Core
//!
//! Spectator anomaly detection over recorded match streams.
//!
//! This crate contains the detection engine only:
//! - No directory traversal
//! - No results-file writing
//! - No proprietary demo parsing (decoders plug in through [`decoder`])
//!
//! Each recording is analyzed in one sequential pass. Every sampled tick,
//! each rostered spectator's camera is classified as *static* (no live
//! player there) or *following* (sitting on a live player). Static visits
//! are counted per position and score state; following with a diverging
//! view is recorded as a follow event. After the stream ends, thresholds
//! turn the aggregates into a [`report::Report`].
//!
//! ## Crate Structure
//!
//! - [`snapshot`] - Per-tick game state and stream events
//! - [`roster`] - Spectator roster across round boundaries
//! - [`classifier`] - Static / following classification
//! - [`aggregates`] - Static-position records and follow events
//! - [`report`] - Threshold passes and text rendering
//! - [`analysis`] - Stream dispatcher tying it together
//! - [`decoder`] / [`recording`] - Decoder seam and bundled formats

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod aggregates;
pub mod analysis;
pub mod classifier;
pub mod config;
pub mod decoder;
pub mod error;
pub mod math;
pub mod recording;
pub mod report;
pub mod roster;
pub mod snapshot;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aggregates::{
        Aggregates, FollowEvent, PositionKey, StaticPositionRecord,
    };
    pub use crate::analysis::{analyze_stream, AnalysisOutcome, AnalysisStats, Analyzer};
    pub use crate::classifier::{classify, classify_tick, CameraBehavior};
    pub use crate::config::DetectionConfig;
    pub use crate::decoder::{BoxedDecoder, DecoderRegistry, ReplayDecoder};
    pub use crate::error::{DecodeError, GhostError, Result};
    pub use crate::math::{angle_diff, Vec3, ViewAngles};
    pub use crate::report::{round_number, Report};
    pub use crate::roster::{RosterEntry, RosterTracker};
    pub use crate::snapshot::{AccountId, Participant, Snapshot, StreamEvent, Team, UserId};
}
