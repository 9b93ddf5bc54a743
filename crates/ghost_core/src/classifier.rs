//! Camera-behavior classification.
//!
//! Each sampled tick, every rostered spectator falls into exactly one of:
//!
//! - **Unavailable**: not connected, or the camera data is malformed. No
//!   aggregate is touched.
//! - **Following**: the camera sits within the position tolerance of a live
//!   player. If either view axis differs by more than the angle tolerance
//!   a [`FollowEvent`] is recorded; otherwise the spectator is just
//!   watching that player's perspective and nothing is recorded.
//! - **Static**: no live player at the camera position. The static record
//!   for (spectator, position, scores) is created or bumped.

use tracing::trace;

use crate::aggregates::{Aggregates, FollowEvent};
use crate::config::DetectionConfig;
use crate::math::{AngleDelta, Vec3};
use crate::roster::RosterEntry;
use crate::snapshot::{Participant, Snapshot};

/// Why a spectator was not classified this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No connected record for the spectator's user id.
    Disconnected,
    /// Camera position or angles are not finite.
    Malformed,
}

/// Classification of one spectator at one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraBehavior<'a> {
    /// Spectator skipped for this tick.
    Unavailable(SkipReason),
    /// Camera at a position no live player occupies.
    Static {
        /// Camera position.
        position: Vec3,
    },
    /// Camera co-located with a live player.
    Following {
        /// First live player found within tolerance.
        player: &'a Participant,
        /// Camera position.
        position: Vec3,
        /// Orientation difference between camera and player.
        delta: AngleDelta,
    },
}

/// Classify a single spectator against a snapshot.
///
/// Live players are scanned in snapshot order and the first within
/// tolerance wins.
#[must_use]
pub fn classify<'a>(
    spectator: &RosterEntry,
    snapshot: &'a Snapshot,
    config: &DetectionConfig,
) -> CameraBehavior<'a> {
    let Some(camera) = snapshot.connected_by_user_id(spectator.user_id) else {
        return CameraBehavior::Unavailable(SkipReason::Disconnected);
    };
    if !camera.position.is_finite() || !camera.view.is_finite() {
        return CameraBehavior::Unavailable(SkipReason::Malformed);
    }

    let position = camera.position;
    match snapshot
        .live_players()
        .find(|p| p.position.within(position, config.position_tolerance))
    {
        Some(player) => CameraBehavior::Following {
            player,
            position,
            delta: camera.view.delta(player.view),
        },
        None => CameraBehavior::Static { position },
    }
}

/// Counters for one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Spectators skipped as unavailable.
    pub skipped: u32,
    /// Static occurrences recorded.
    pub static_hits: u32,
    /// Follow mismatch events recorded.
    pub follow_events: u32,
    /// Co-located spectators sharing the player's view.
    pub aligned: u32,
}

/// Classify every rostered spectator at this tick and update `aggregates`.
pub fn classify_tick(
    roster: &[RosterEntry],
    snapshot: &Snapshot,
    config: &DetectionConfig,
    aggregates: &mut Aggregates,
) -> TickSummary {
    let mut summary = TickSummary::default();

    for spectator in roster {
        match classify(spectator, snapshot, config) {
            CameraBehavior::Unavailable(reason) => {
                trace!(
                    tick = snapshot.tick,
                    user_id = spectator.user_id,
                    ?reason,
                    "Spectator skipped"
                );
                summary.skipped += 1;
            }
            CameraBehavior::Static { position } => {
                aggregates.statics.record(
                    spectator,
                    position,
                    snapshot.t_score,
                    snapshot.ct_score,
                    snapshot.tick,
                );
                summary.static_hits += 1;
            }
            CameraBehavior::Following {
                player,
                position,
                delta,
            } => {
                if delta.exceeds(config.angle_tolerance) {
                    aggregates.follows.push(FollowEvent {
                        position,
                        account_id: spectator.account_id,
                        spectator: spectator.name.clone(),
                        player: player.name.clone(),
                        ct_score: snapshot.ct_score,
                        t_score: snapshot.t_score,
                        tick: snapshot.tick,
                        horizontal_delta: delta.horizontal,
                        vertical_delta: delta.vertical,
                    });
                    summary.follow_events += 1;
                } else {
                    summary.aligned += 1;
                }
            }
        }
    }

    summary
}
