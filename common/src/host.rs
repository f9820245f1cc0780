use anyhow::Result;
use bevy_math::Vec3;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::{
    events::EventType,
    protocol::{FlagDefinition, MetaValue, PlayerId, PlayerRecord, ShotGuid, ShotId, TeamColor},
};

// ============================================================================
// Host API
// ============================================================================

/// Outbound calls a plugin can make into the game server.
///
/// Lookups never fail loudly: unknown players, shots and variables come back
/// as `None`, `NoTeam` or zero, matching how the server treats plugins as
/// best-effort.
pub trait Host {
    // Registration

    fn register_custom_flag(&mut self, flag: FlagDefinition) -> Result<()>;

    fn register_custom_double(&mut self, name: &str, default: f64) -> Result<()>;

    fn register_custom_int(&mut self, name: &str, default: i32) -> Result<()>;

    fn remove_custom_var(&mut self, name: &str) -> bool;

    fn register_event(&mut self, event_type: EventType);

    fn flush_events(&mut self);

    // Variables

    fn var_double(&self, name: &str) -> f64;

    fn var_int(&self, name: &str) -> i32;

    // Players

    fn player_record(&self, id: PlayerId) -> Option<PlayerRecord>;

    fn player_team(&self, id: PlayerId) -> TeamColor;

    // Shots

    fn fire_world_shot(&mut self, archetype: &str, pos: Vec3, vel: Vec3, team: TeamColor) -> ShotGuid;

    fn set_shot_metadata(&mut self, guid: ShotGuid, key: &str, value: MetaValue);

    fn shot_has_metadata(&self, guid: ShotGuid, key: &str) -> bool;

    fn shot_metadata_text(&self, guid: ShotGuid, key: &str) -> Option<String>;

    fn shot_metadata_player(&self, guid: ShotGuid, key: &str) -> Option<PlayerId>;

    fn shot_guid(&self, player: PlayerId, shot_id: ShotId) -> Option<ShotGuid>;
}

// ============================================================================
// Player Record Accounting
// ============================================================================

/// Ties a [`PlayerRecord`] to the host's count of outstanding records.
///
/// Dropping the record releases it.
#[derive(Debug)]
pub struct RecordLease(Option<Arc<AtomicUsize>>);

impl RecordLease {
    #[must_use]
    pub const fn untracked() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn tracked(outstanding: &Arc<AtomicUsize>) -> Self {
        outstanding.fetch_add(1, Ordering::Relaxed);
        Self(Some(Arc::clone(outstanding)))
    }
}

impl Drop for RecordLease {
    fn drop(&mut self) {
        if let Some(outstanding) = &self.0 {
            outstanding.fetch_sub(1, Ordering::Relaxed);
        }
    }
}
