//! Test fixtures and helpers.
//!
//! Participant constructors, a [`MatchScript`] builder for event streams,
//! and a [`ScriptedDecoder`] that replays a fixed sequence of results.

use std::collections::VecDeque;

use ghost_core::decoder::ReplayDecoder;
use ghost_core::error::DecodeError;
use ghost_core::math::{Vec3, ViewAngles};
use ghost_core::snapshot::{AccountId, Participant, Snapshot, StreamEvent, Team, UserId};

/// Base of the fixture account id range.
pub const ACCOUNT_BASE: AccountId = 76_561_198_000_000_000;

/// Account id assigned to a fixture user id.
#[must_use]
pub fn account(user_id: UserId) -> AccountId {
    ACCOUNT_BASE + AccountId::from(user_id)
}

/// A connected spectator with its camera at `position`.
#[must_use]
pub fn spectator(user_id: UserId, name: &str, position: Vec3) -> Participant {
    Participant::new(user_id, account(user_id), name, Team::Spectator).at(position)
}

/// A live player at `position` looking along `view`.
#[must_use]
pub fn player(user_id: UserId, name: &str, team: Team, position: Vec3, view: ViewAngles) -> Participant {
    Participant::new(user_id, account(user_id), name, team)
        .with_alive(true)
        .at(position)
        .looking(view)
}

/// Builds a stream of events tick by tick.
#[derive(Debug, Clone, Default)]
pub struct MatchScript {
    events: Vec<StreamEvent>,
    participants: Vec<Participant>,
    tick: u64,
    t_score: u32,
    ct_score: u32,
}

impl MatchScript {
    /// Start an empty script at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant present from the next tick on, without an event.
    #[must_use]
    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.participants.push(participant);
        self
    }

    /// Add a participant and emit a join event.
    #[must_use]
    pub fn join(mut self, participant: Participant) -> Self {
        self.events
            .push(StreamEvent::ParticipantJoined(participant.clone()));
        self.participants.push(participant);
        self
    }

    /// Mark a participant disconnected.
    #[must_use]
    pub fn disconnect(self, user_id: UserId) -> Self {
        self.update(user_id, |p| p.connected = false)
    }

    /// Mutate a participant in place.
    #[must_use]
    pub fn update(mut self, user_id: UserId, f: impl FnOnce(&mut Participant)) -> Self {
        if let Some(p) = self.participants.iter_mut().find(|p| p.user_id == user_id) {
            f(p);
        }
        self
    }

    /// Set the score state used for following ticks.
    #[must_use]
    pub fn score(mut self, t_score: u32, ct_score: u32) -> Self {
        self.t_score = t_score;
        self.ct_score = ct_score;
        self
    }

    /// Emit a round start.
    #[must_use]
    pub fn round_start(mut self) -> Self {
        self.events.push(StreamEvent::RoundStarted);
        self
    }

    /// Emit a round end.
    #[must_use]
    pub fn round_end(mut self) -> Self {
        self.events.push(StreamEvent::RoundEnded);
        self
    }

    /// Emit `count` consecutive ticks with the current participants.
    #[must_use]
    pub fn ticks(mut self, count: u64) -> Self {
        for _ in 0..count {
            self.tick += 1;
            self.events.push(StreamEvent::Tick(self.snapshot()));
        }
        self
    }

    /// Snapshot of the current state at the current tick.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            ct_score: self.ct_score,
            t_score: self.t_score,
            participants: self.participants.clone(),
        }
    }

    /// The events emitted so far.
    #[must_use]
    pub fn build(self) -> Vec<StreamEvent> {
        self.events
    }

    /// A decoder replaying the events.
    #[must_use]
    pub fn decoder(self) -> ScriptedDecoder {
        ScriptedDecoder::from_events(self.events)
    }
}

/// Replays a fixed sequence of decoder results, then ends the stream.
#[derive(Debug, Default)]
pub struct ScriptedDecoder {
    steps: VecDeque<Result<StreamEvent, DecodeError>>,
    advanced: usize,
}

impl ScriptedDecoder {
    /// Decoder yielding `events` in order.
    #[must_use]
    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        Self {
            steps: events.into_iter().map(Ok).collect(),
            advanced: 0,
        }
    }

    /// Append an event.
    pub fn push_event(&mut self, event: StreamEvent) {
        self.steps.push_back(Ok(event));
    }

    /// Append an error.
    pub fn push_error(&mut self, error: DecodeError) {
        self.steps.push_back(Err(error));
    }

    /// Number of `advance` calls made.
    #[must_use]
    pub fn advanced(&self) -> usize {
        self.advanced
    }

    /// Steps not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl ReplayDecoder for ScriptedDecoder {
    fn advance(&mut self) -> Result<Option<StreamEvent>, DecodeError> {
        self.advanced += 1;
        self.steps.pop_front().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_ticks_are_monotonic() {
        let events = MatchScript::new()
            .with_participant(spectator(1, "spec", Vec3::ZERO))
            .round_start()
            .ticks(3)
            .build();

        let ticks: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Tick(s) => Some(s.tick),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![1, 2, 3]);
    }

    #[test]
    fn test_scripted_decoder_ends() {
        let mut decoder = ScriptedDecoder::from_events(vec![StreamEvent::RoundStarted]);
        assert!(matches!(decoder.advance(), Ok(Some(StreamEvent::RoundStarted))));
        assert!(matches!(decoder.advance(), Ok(None)));
        assert_eq!(decoder.advanced(), 2);
    }
}
