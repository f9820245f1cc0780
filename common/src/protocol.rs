#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use bevy_math::Vec3;

use crate::constants::SERVER_PLAYER_ID;
use crate::host::RecordLease;

// Macro to reduce boilerplate for plain host data types
macro_rules! host_type {
    ($(#[$meta:meta])* struct $name:ident $body:tt) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
        pub struct $name $body;
    };
}

// ============================================================================
// Identifiers
// ============================================================================

host_type! {
// Player identity, stable for the lifetime of a connection
struct PlayerId(pub u32)
}

host_type! {
// Per-player local shot index, as carried by shot and death events
struct ShotId(pub u32)
}

host_type! {
// Host-wide unique handle of a tracked shot
struct ShotGuid(pub u32)
}

impl PlayerId {
    pub const SERVER: Self = Self(SERVER_PLAYER_ID);
}

// ============================================================================
// Teams
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub enum TeamColor {
    Rogue,
    Red,
    Green,
    Blue,
    Purple,
    Observer,
    Rabbit,
    Hunter,
    #[default]
    NoTeam,
}

// ============================================================================
// Players
// ============================================================================

// Last known kinematic state of a tank. `z` is up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct PlayerState {
    pub pos: Vec3,
    pub rotation: f32, // radians
    pub velocity: Vec3,
}

/// Snapshot of a player handed out by [`crate::host::Host::player_record`].
///
/// The record is released when dropped. Hosts that account for outstanding
/// records attach a tracked [`RecordLease`].
#[derive(Debug)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub callsign: String,
    pub team: TeamColor,
    pub current_flag: Option<String>, // flag abbreviation
    pub last_known_state: PlayerState,
    pub lease: RecordLease,
}

impl PlayerRecord {
    #[must_use]
    pub fn holds_flag(&self, abbreviation: &str) -> bool {
        self.current_flag.as_deref() == Some(abbreviation)
    }
}

// ============================================================================
// Flags
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub enum FlagQuality {
    Good,
    Bad,
}

// Custom flag declaration, registered once at plugin load
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct FlagDefinition {
    pub abbreviation: String,
    pub name: String,
    pub help: String,
    pub quality: FlagQuality,
}

// ============================================================================
// Variables and Shot Metadata
// ============================================================================

// Value of a registered tunable
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub enum VarValue {
    Double(f64),
    Int(i32),
}

impl VarValue {
    #[must_use]
    pub const fn as_double(self) -> f64 {
        match self {
            Self::Double(value) => value,
            Self::Int(value) => value as f64,
        }
    }

    #[must_use]
    pub const fn as_int(self) -> i32 {
        match self {
            Self::Double(value) => value as i32,
            Self::Int(value) => value,
        }
    }
}

// Value attached to a tracked shot under a string key
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub enum MetaValue {
    Text(String),
    Player(PlayerId),
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<PlayerId> for MetaValue {
    fn from(value: PlayerId) -> Self {
        Self::Player(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_values_convert_between_kinds() {
        assert!((VarValue::Int(7).as_double() - 7.0).abs() < f64::EPSILON);
        assert_eq!(VarValue::Double(12.9).as_int(), 12);
        assert_eq!(VarValue::Int(-3).as_int(), -3);
    }

    #[test]
    fn holds_flag_compares_abbreviation() {
        let record = PlayerRecord {
            id: PlayerId(1),
            callsign: "tank".to_string(),
            team: TeamColor::Red,
            current_flag: Some("SF".to_string()),
            last_known_state: PlayerState::default(),
            lease: RecordLease::untracked(),
        };
        assert!(record.holds_flag("SF"));
        assert!(!record.holds_flag("GM"));
    }
}
