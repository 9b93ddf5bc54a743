//! Static-position and follow-event aggregation.
//!
//! Both aggregators are keyed by the spectator's persistent account id and
//! live for the analysis of one recording.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::{AngleDelta, Vec3};
use crate::roster::RosterEntry;
use crate::snapshot::AccountId;

/// Exact camera position plus score state.
///
/// Coordinates are stored as raw `f32` bits so that the key is hashable and
/// totally ordered; `-0.0` is folded into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey {
    x: u32,
    y: u32,
    z: u32,
    t_score: u32,
    ct_score: u32,
}

impl PositionKey {
    /// Build a key from a position and the two team scores.
    #[must_use]
    pub fn new(position: Vec3, t_score: u32, ct_score: u32) -> Self {
        Self {
            x: canonical_bits(position.x),
            y: canonical_bits(position.y),
            z: canonical_bits(position.z),
            t_score,
            ct_score,
        }
    }
}

fn canonical_bits(v: f32) -> u32 {
    if v == 0.0 {
        0.0f32.to_bits()
    } else {
        v.to_bits()
    }
}

/// Repeat visits of one spectator to one position under one score state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPositionRecord {
    /// Camera position.
    pub position: Vec3,
    /// Spectator's persistent account id.
    pub account_id: AccountId,
    /// Spectator's display name.
    pub spectator: String,
    /// Number of sampled ticks spent here.
    pub count: u32,
    /// First tick seen.
    pub first_tick: u64,
    /// Most recent tick seen.
    pub last_tick: u64,
    /// Counter-Terrorist score when the record was created.
    pub ct_score: u32,
    /// Terrorist score when the record was created.
    pub t_score: u32,
}

/// Counts static camera occurrences per (spectator, position key).
#[derive(Debug, Clone, Default)]
pub struct StaticPositionAggregator {
    records: BTreeMap<(AccountId, PositionKey), StaticPositionRecord>,
}

impl StaticPositionAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one static occurrence. Returns true if a new record was created.
    pub fn record(
        &mut self,
        spectator: &RosterEntry,
        position: Vec3,
        t_score: u32,
        ct_score: u32,
        tick: u64,
    ) -> bool {
        let key = (spectator.account_id, PositionKey::new(position, t_score, ct_score));
        match self.records.get_mut(&key) {
            Some(record) => {
                record.count += 1;
                record.last_tick = tick;
                false
            }
            None => {
                self.records.insert(
                    key,
                    StaticPositionRecord {
                        position,
                        account_id: spectator.account_id,
                        spectator: spectator.name.clone(),
                        count: 1,
                        first_tick: tick,
                        last_tick: tick,
                        ct_score,
                        t_score,
                    },
                );
                true
            }
        }
    }

    /// Look up a record.
    #[must_use]
    pub fn get(&self, account_id: AccountId, key: PositionKey) -> Option<&StaticPositionRecord> {
        self.records.get(&(account_id, key))
    }

    /// All records ordered by (account id, position key).
    pub fn records(&self) -> impl Iterator<Item = &StaticPositionRecord> {
        self.records.values()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A spectator camera sitting on a live player with a different orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowEvent {
    /// Shared position.
    pub position: Vec3,
    /// Spectator's persistent account id.
    pub account_id: AccountId,
    /// Spectator's display name.
    pub spectator: String,
    /// Name of the co-located player.
    pub player: String,
    /// Counter-Terrorist score at the time.
    pub ct_score: u32,
    /// Terrorist score at the time.
    pub t_score: u32,
    /// Tick of the event.
    pub tick: u64,
    /// Horizontal angle delta in degrees.
    pub horizontal_delta: f32,
    /// Vertical angle delta in degrees.
    pub vertical_delta: f32,
}

impl FollowEvent {
    /// Summed angle delta.
    #[must_use]
    pub fn combined_delta(&self) -> f32 {
        AngleDelta {
            horizontal: self.horizontal_delta,
            vertical: self.vertical_delta,
        }
        .sum()
    }
}

/// Append-only follow events per spectator.
#[derive(Debug, Clone, Default)]
pub struct FollowEventAggregator {
    events: BTreeMap<AccountId, Vec<FollowEvent>>,
}

impl FollowEventAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, event: FollowEvent) {
        self.events.entry(event.account_id).or_default().push(event);
    }

    /// Events of one spectator, in tick order.
    #[must_use]
    pub fn for_spectator(&self, account_id: AccountId) -> &[FollowEvent] {
        self.events
            .get(&account_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every event, grouped by spectator.
    pub fn events(&self) -> impl Iterator<Item = &FollowEvent> {
        self.events.values().flatten()
    }

    /// Total event count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    /// True if no events were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// The full mutable state of one recording's analysis.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    /// Static camping records.
    pub statics: StaticPositionAggregator,
    /// Follow mismatch events.
    pub follows: FollowEventAggregator,
}
