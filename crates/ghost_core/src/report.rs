//! Post-pass flagging over the aggregates.
//!
//! Two independent passes run once the stream is exhausted:
//!
//! - **Static pass**: every static record whose count is above
//!   [`DetectionConfig::static_min_occurrences`].
//! - **Follow pass**: follow events are bucketed into rounds derived from
//!   the score state, events whose summed angle delta exceeds
//!   [`DetectionConfig::follow_angle_sum_threshold`] are counted, and every
//!   (spectator, round) above [`DetectionConfig::follow_round_min_events`]
//!   is flagged.
//!
//! No explicit round id is available from a recording, so the round is
//! approximated as `t_score + ct_score + 1`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregates::{Aggregates, FollowEventAggregator, StaticPositionRecord};
use crate::config::DetectionConfig;
use crate::snapshot::AccountId;

/// Round index approximated from the score state.
///
/// Saturates at `u32::MAX` for out-of-range scores from a damaged recording.
#[must_use]
pub const fn round_number(t_score: u32, ct_score: u32) -> u32 {
    t_score.saturating_add(ct_score).saturating_add(1)
}

/// A spectator camping one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticFinding {
    /// The record that crossed the threshold.
    pub record: StaticPositionRecord,
}

/// A spectator repeatedly sitting on a player with a diverging view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowRoundFinding {
    /// Spectator's persistent account id.
    pub account_id: AccountId,
    /// Spectator's display name.
    pub spectator: String,
    /// Derived round number.
    pub round: u32,
    /// Events above the angle-sum threshold in that round.
    pub flagged_events: u32,
}

/// Findings for one recording.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Report {
    /// Recording identifier, usually its path.
    pub source: String,
    /// Static camping findings.
    pub static_findings: Vec<StaticFinding>,
    /// Follow findings per round.
    pub follow_findings: Vec<FollowRoundFinding>,
}

/// Count follow events per (spectator, round) whose summed delta exceeds
/// `angle_sum_threshold`.
#[must_use]
pub fn round_flag_counts(
    follows: &FollowEventAggregator,
    angle_sum_threshold: f32,
) -> BTreeMap<(AccountId, u32), u32> {
    let mut counts = BTreeMap::new();
    for event in follows.events() {
        if event.combined_delta() > angle_sum_threshold {
            *counts
                .entry((event.account_id, round_number(event.t_score, event.ct_score)))
                .or_insert(0) += 1;
        }
    }
    counts
}

impl Report {
    /// Run both flagging passes.
    pub fn generate(source: impl Into<String>, aggregates: &Aggregates, config: &DetectionConfig) -> Self {
        let static_findings = aggregates
            .statics
            .records()
            .filter(|r| r.count > config.static_min_occurrences)
            .map(|r| StaticFinding { record: r.clone() })
            .collect();

        let follow_findings = round_flag_counts(&aggregates.follows, config.follow_angle_sum_threshold)
            .into_iter()
            .filter(|(_, count)| *count > config.follow_round_min_events)
            .map(|((account_id, round), flagged_events)| FollowRoundFinding {
                account_id,
                spectator: aggregates
                    .follows
                    .for_spectator(account_id)
                    .first()
                    .map(|e| e.spectator.clone())
                    .unwrap_or_default(),
                round,
                flagged_events,
            })
            .collect();

        Self {
            source: source.into(),
            static_findings,
            follow_findings,
        }
    }

    /// True when nothing was flagged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.static_findings.is_empty() && self.follow_findings.is_empty()
    }

    /// Total number of findings.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.static_findings.len() + self.follow_findings.len()
    }

    /// Render the text block appended to the results file.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StaticFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.record;
        writeln!(
            f,
            "{} ({}) has been in this pos {} times",
            r.spectator, r.account_id, r.count
        )?;
        write!(
            f,
            " Info: position={} ticks={}..{} score T{}-CT{}",
            r.position, r.first_tick, r.last_tick, r.t_score, r.ct_score
        )
    }
}

impl fmt::Display for FollowRoundFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) followed a live player with a mismatched view {} times in round {}",
            self.spectator, self.account_id, self.flagged_events, self.round
        )
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Result for file: {}", self.source)?;
        for finding in &self.static_findings {
            writeln!(f, "{finding}")?;
        }
        for finding in &self.follow_findings {
            writeln!(f, "{finding}")?;
        }
        f.write_str("\n\n")
    }
}
