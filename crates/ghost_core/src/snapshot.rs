//! Per-tick game state delivered by a decoder.
//!
//! A [`Snapshot`] is ephemeral: the analyzer reads it, classifies every
//! roster spectator against it, and drops it when the next tick arrives.
//! Round boundaries and late joins travel alongside ticks as
//! [`StreamEvent`]s.

use serde::{Deserialize, Serialize};

use crate::math::{Vec3, ViewAngles};

/// Connection-scoped participant identifier. Reused across reconnects.
pub type UserId = u32;

/// Persistent numeric identity of a participant (platform account id).
pub type AccountId = u64;

/// Team affiliation of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Not yet assigned to a side.
    #[default]
    Unassigned,
    /// Observer role; never a live player.
    Spectator,
    /// Terrorist side.
    Terrorist,
    /// Counter-Terrorist side.
    CounterTerrorist,
}

impl Team {
    /// Whether members of this team take part in rounds.
    #[must_use]
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Terrorist | Self::CounterTerrorist)
    }
}

/// A connected (or recently connected) match participant.
///
/// For spectators, `position` and `view` describe the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Connection-scoped id.
    pub user_id: UserId,
    /// Persistent account id.
    pub account_id: AccountId,
    /// Display name.
    pub name: String,
    /// Team affiliation.
    pub team: Team,
    /// Whether the participant is currently connected.
    pub connected: bool,
    /// Whether the participant is a live player this tick.
    pub alive: bool,
    /// World position (camera position for spectators).
    pub position: Vec3,
    /// View orientation.
    pub view: ViewAngles,
}

impl Participant {
    /// Create a connected participant at the origin.
    pub fn new(user_id: UserId, account_id: AccountId, name: impl Into<String>, team: Team) -> Self {
        Self {
            user_id,
            account_id,
            name: name.into(),
            team,
            connected: true,
            alive: false,
            position: Vec3::ZERO,
            view: ViewAngles::default(),
        }
    }

    /// Set position.
    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set view angles.
    #[must_use]
    pub fn looking(mut self, view: ViewAngles) -> Self {
        self.view = view;
        self
    }

    /// Set alive state.
    #[must_use]
    pub fn with_alive(mut self, alive: bool) -> Self {
        self.alive = alive;
        self
    }

    /// Set connection state.
    #[must_use]
    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    /// On the spectator team.
    #[must_use]
    pub fn is_spectator(&self) -> bool {
        self.team == Team::Spectator
    }

    /// Alive, connected and on a playing team.
    #[must_use]
    pub fn is_live_player(&self) -> bool {
        self.alive && self.connected && self.team.is_playing()
    }
}

/// Game state at one tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Monotonic in-game tick.
    pub tick: u64,
    /// Counter-Terrorist score.
    pub ct_score: u32,
    /// Terrorist score.
    pub t_score: u32,
    /// Every participant the decoder knows about at this tick.
    pub participants: Vec<Participant>,
}

impl Snapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new(tick: u64, ct_score: u32, t_score: u32) -> Self {
        Self {
            tick,
            ct_score,
            t_score,
            participants: Vec::new(),
        }
    }

    /// Add a participant.
    #[must_use]
    pub fn with(mut self, participant: Participant) -> Self {
        self.participants.push(participant);
        self
    }

    /// Connected participants.
    pub fn connected(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.connected)
    }

    /// Connected participants on the spectator team.
    pub fn connected_spectators(&self) -> impl Iterator<Item = &Participant> {
        self.connected().filter(|p| p.is_spectator())
    }

    /// Live players, in snapshot order.
    pub fn live_players(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_live_player())
    }

    /// Look up a connected participant by user id.
    #[must_use]
    pub fn connected_by_user_id(&self, user_id: UserId) -> Option<&Participant> {
        self.connected().find(|p| p.user_id == user_id)
    }
}

/// One item of a decoded recording stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamEvent {
    /// Game state for one tick.
    Tick(Snapshot),
    /// Round play became active (freeze time ended).
    RoundStarted,
    /// Round play ended.
    RoundEnded,
    /// A participant connected mid-match.
    ParticipantJoined(Participant),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot::new(64, 1, 2)
            .with(Participant::new(1, 100, "spec", Team::Spectator))
            .with(Participant::new(2, 200, "gone", Team::Spectator).with_connected(false))
            .with(Participant::new(3, 300, "alive_t", Team::Terrorist).with_alive(true))
            .with(Participant::new(4, 400, "dead_ct", Team::CounterTerrorist))
    }

    #[test]
    fn test_connected_spectators() {
        let snap = sample();
        let names: Vec<_> = snap.connected_spectators().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["spec"]);
    }

    #[test]
    fn test_live_players() {
        let snap = sample();
        let names: Vec<_> = snap.live_players().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alive_t"]);
    }

    #[test]
    fn test_lookup_ignores_disconnected() {
        let snap = sample();
        assert!(snap.connected_by_user_id(1).is_some());
        assert!(snap.connected_by_user_id(2).is_none());
        assert!(snap.connected_by_user_id(99).is_none());
    }

    #[test]
    fn test_alive_spectator_is_not_live_player() {
        let p = Participant::new(1, 1, "x", Team::Spectator).with_alive(true);
        assert!(!p.is_live_player());
    }
}
