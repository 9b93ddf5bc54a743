//! Stream dispatcher: drives one recording through roster, classifier and
//! aggregates, then generates the report.
//!
//! Processing is strictly sequential in stream order. Static record counts
//! and first/last ticks depend on that order.
//!
//! A round start rebuilds the roster from the first snapshot that follows
//! it, so spectators who connected between the last tick and the round
//! signal are rostered. That snapshot is classified as part of the round.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::aggregates::Aggregates;
use crate::classifier::{classify_tick, TickSummary};
use crate::config::DetectionConfig;
use crate::decoder::ReplayDecoder;
use crate::error::Result;
use crate::report::Report;
use crate::roster::RosterTracker;
use crate::snapshot::{Snapshot, StreamEvent};

/// Counters describing one analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Tick snapshots received.
    pub ticks_seen: u64,
    /// Ticks passed to the classifier.
    pub ticks_sampled: u64,
    /// Round starts observed.
    pub rounds: u32,
    /// Recoverable decode errors skipped.
    pub decode_errors: u32,
    /// Spectator evaluations skipped as unavailable.
    pub spectators_skipped: u32,
    /// Static occurrences recorded.
    pub static_hits: u32,
    /// Follow mismatch events recorded.
    pub follow_events: u32,
}

/// Result of analyzing one recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Findings.
    pub report: Report,
    /// Run counters.
    pub stats: AnalysisStats,
    /// Fatal decoder error that cut the stream short, if any.
    pub aborted: Option<String>,
}

/// Stateful analysis of a single recording.
#[derive(Debug)]
pub struct Analyzer {
    config: DetectionConfig,
    roster: RosterTracker,
    aggregates: Aggregates,
    pending_round_start: bool,
    stats: AnalysisStats,
}

impl Analyzer {
    /// Create an analyzer with a validated configuration.
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            roster: RosterTracker::new(),
            aggregates: Aggregates::default(),
            pending_round_start: false,
            stats: AnalysisStats::default(),
        })
    }

    /// Apply one stream event.
    pub fn handle(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Tick(snapshot) => self.on_tick(snapshot),
            StreamEvent::RoundStarted => {
                self.stats.rounds += 1;
                self.pending_round_start = true;
            }
            StreamEvent::RoundEnded => {
                self.pending_round_start = false;
                self.roster.round_ended();
            }
            StreamEvent::ParticipantJoined(participant) => {
                self.roster.participant_joined(&participant);
            }
        }
    }

    fn on_tick(&mut self, snapshot: Snapshot) {
        self.stats.ticks_seen += 1;
        if self.pending_round_start {
            self.pending_round_start = false;
            self.roster.round_started(&snapshot);
        }

        if self.roster.is_round_active() && self.config.should_sample(snapshot.tick) {
            self.stats.ticks_sampled += 1;
            let summary = classify_tick(
                self.roster.entries(),
                &snapshot,
                &self.config,
                &mut self.aggregates,
            );
            self.record(summary);
        }
    }

    fn record(&mut self, summary: TickSummary) {
        self.stats.spectators_skipped += summary.skipped;
        self.stats.static_hits += summary.static_hits;
        self.stats.follow_events += summary.follow_events;
    }

    /// Note a recoverable decode error.
    pub fn record_decode_error(&mut self) {
        self.stats.decode_errors += 1;
    }

    /// Current aggregates.
    #[must_use]
    pub fn aggregates(&self) -> &Aggregates {
        &self.aggregates
    }

    /// Current roster state.
    #[must_use]
    pub fn roster(&self) -> &RosterTracker {
        &self.roster
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> AnalysisStats {
        self.stats
    }

    /// Consume events until the decoder ends or fails fatally.
    ///
    /// Returns the fatal error message, if any.
    pub fn consume<D: ReplayDecoder + ?Sized>(&mut self, decoder: &mut D) -> Option<String> {
        loop {
            match decoder.advance() {
                Ok(Some(event)) => self.handle(event),
                Ok(None) => return None,
                Err(e) if e.is_fatal() => {
                    error!("Decoder cannot advance, ending stream: {e}");
                    return Some(e.to_string());
                }
                Err(e) => {
                    warn!("Skipping undecodable frame: {e}");
                    self.record_decode_error();
                }
            }
        }
    }

    /// Generate the report and return the outcome.
    pub fn finish(self, source: impl Into<String>, aborted: Option<String>) -> AnalysisOutcome {
        let report = Report::generate(source, &self.aggregates, &self.config);
        debug!(
            source = %report.source,
            findings = report.finding_count(),
            static_records = self.aggregates.statics.len(),
            follow_events = self.aggregates.follows.len(),
            "Analysis finished"
        );
        AnalysisOutcome {
            report,
            stats: self.stats,
            aborted,
        }
    }
}

/// Analyze a whole decoder stream.
pub fn analyze_stream<D: ReplayDecoder + ?Sized>(
    decoder: &mut D,
    source: impl Into<String>,
    config: &DetectionConfig,
) -> Result<AnalysisOutcome> {
    let mut analyzer = Analyzer::new(config.clone())?;
    let aborted = analyzer.consume(decoder);
    Ok(analyzer.finish(source, aborted))
}
