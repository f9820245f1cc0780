#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use bevy_math::Vec3;

use crate::protocol::{PlayerId, PlayerState, ShotId, TeamColor};

// ============================================================================
// Event Kinds
// ============================================================================

// Tag used when a plugin registers interest in an event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub enum EventType {
    ShotFired,
    PlayerDie,
}

// ============================================================================
// Event Payloads
// ============================================================================

/// A tank fired a shot. Read only.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct ShotFiredEvent {
    pub player_id: PlayerId,
    pub shot_id: ShotId,
    pub shot_type: String, // flag abbreviation or empty for a normal shot
    pub pos: Vec3,
}

/// A player died. Handlers may rewrite the killer fields before the host
/// scores the kill.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct PlayerDieEvent {
    pub player_id: PlayerId,
    pub team: TeamColor,
    pub killer_id: PlayerId,
    pub killer_team: TeamColor,
    pub flag_killed_with: String,
    pub shot_id: ShotId,
    pub state: PlayerState,
}

// ============================================================================
// Event Envelope
// ============================================================================

// All events a plugin can receive
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub enum Event {
    ShotFired(ShotFiredEvent),
    PlayerDie(PlayerDieEvent),
}

impl Event {
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::ShotFired(_) => EventType::ShotFired,
            Self::PlayerDie(_) => EventType::PlayerDie,
        }
    }
}
