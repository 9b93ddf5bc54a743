//! Spectator roster tracking across round boundaries.
//!
//! The roster only gates which participants get classified. Entries may go
//! stale between rounds; the classifier re-resolves every entry against the
//! current snapshot before using it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::snapshot::{AccountId, Participant, Snapshot, UserId};

/// The identity of a rostered spectator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Connection-scoped id used to resolve the live record.
    pub user_id: UserId,
    /// Persistent account id used to key aggregates.
    pub account_id: AccountId,
    /// Display name at the time of rostering.
    pub name: String,
}

impl From<&Participant> for RosterEntry {
    fn from(p: &Participant) -> Self {
        Self {
            user_id: p.user_id,
            account_id: p.account_id,
            name: p.name.clone(),
        }
    }
}

/// Spectators eligible for classification plus the round-active state.
#[derive(Debug, Clone, Default)]
pub struct RosterTracker {
    entries: Vec<RosterEntry>,
    round_active: bool,
    rounds_started: u32,
}

impl RosterTracker {
    /// Create an empty tracker with no active round.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Round became active: reset to the connected spectators in `snapshot`.
    pub fn round_started(&mut self, snapshot: &Snapshot) {
        self.entries = snapshot
            .connected_spectators()
            .map(RosterEntry::from)
            .collect();
        self.round_active = true;
        self.rounds_started += 1;
        debug!(
            tick = snapshot.tick,
            spectators = self.entries.len(),
            "Round started, roster reset"
        );
    }

    /// Round ended. Membership is kept until the next round start.
    pub fn round_ended(&mut self) {
        self.round_active = false;
    }

    /// A participant connected. Spectators joining an active round are appended.
    ///
    /// Returns true if the participant was added.
    pub fn participant_joined(&mut self, participant: &Participant) -> bool {
        if !self.round_active || !participant.connected || !participant.is_spectator() {
            return false;
        }
        debug!(
            user_id = participant.user_id,
            name = %participant.name,
            "Late spectator added to roster"
        );
        self.entries.push(RosterEntry::from(participant));
        true
    }

    /// Whether a round is in progress.
    #[must_use]
    pub fn is_round_active(&self) -> bool {
        self.round_active
    }

    /// Current roster, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Number of round starts observed.
    #[must_use]
    pub fn rounds_started(&self) -> u32 {
        self.rounds_started
    }
}
