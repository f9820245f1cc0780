use anyhow::{Result, bail};
use bevy_math::Vec3;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tracing::{debug, trace};

use common::{
    constants::{DEFAULT_TANK_SPEED, TANK_SPEED_VAR},
    events::EventType,
    host::{Host, RecordLease},
    protocol::*,
};

// Flags every server knows about without a plugin
pub const BUILTIN_FLAGS: &[&str] = &["GM", "L", "SW", "ST", "CL", "MG", "F", "SB", "V", "QT", "G", "R"];

// ============================================================================
// Host-side Records
// ============================================================================

// Player information (host-side source of truth)
#[derive(Debug, Clone)]
pub struct PlayerInfo {
    pub callsign: String,
    pub team: TeamColor,
    pub flag: Option<String>,
    pub state: PlayerState,
}

// A shot the host is tracking until it expires or hits something
#[derive(Debug, Clone)]
pub struct TrackedShot {
    pub guid: ShotGuid,
    pub owner: PlayerId,
    pub shot_id: ShotId,
    pub archetype: String,
    pub pos: Vec3,
    pub vel: Vec3,
    pub team: TeamColor,
    pub metadata: HashMap<String, MetaValue>,
}

// ============================================================================
// Local Host
// ============================================================================

/// In-process implementation of the host API.
///
/// Holds just enough server state to drive plugins: a variable store, the flag
/// registry, players and the shot table. World shots are owned by
/// [`PlayerId::SERVER`].
#[derive(Debug)]
pub struct LocalHost {
    vars: HashMap<String, VarValue>,
    custom_vars: HashSet<String>,
    flags: HashMap<String, FlagDefinition>,
    players: HashMap<PlayerId, PlayerInfo>,
    shots: BTreeMap<ShotGuid, TrackedShot>,
    shot_index: HashMap<(PlayerId, ShotId), ShotGuid>,
    next_guid: u32,
    next_shot_ids: HashMap<PlayerId, u32>,
    pending_events: Vec<EventType>,
    outstanding_records: Arc<AtomicUsize>,
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHost {
    #[must_use]
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        vars.insert(TANK_SPEED_VAR.to_string(), VarValue::Double(DEFAULT_TANK_SPEED));

        Self {
            vars,
            custom_vars: HashSet::new(),
            flags: HashMap::new(),
            players: HashMap::new(),
            shots: BTreeMap::new(),
            shot_index: HashMap::new(),
            next_guid: 1,
            next_shot_ids: HashMap::new(),
            pending_events: Vec::new(),
            outstanding_records: Arc::new(AtomicUsize::new(0)),
        }
    }

    // ------------------------------------------------------------------------
    // Variables and flags
    // ------------------------------------------------------------------------

    // Set a variable, keeping the kind it was registered with
    pub fn set_var(&mut self, name: &str, value: f64) {
        let entry = match self.vars.get(name) {
            Some(VarValue::Int(_)) => VarValue::Int(value as i32),
            _ => VarValue::Double(value),
        };
        self.vars.insert(name.to_string(), entry);
    }

    #[must_use]
    pub fn flag(&self, abbreviation: &str) -> Option<&FlagDefinition> {
        self.flags.get(abbreviation)
    }

    fn flag_exists(&self, abbreviation: &str) -> bool {
        BUILTIN_FLAGS.contains(&abbreviation) || self.flags.contains_key(abbreviation)
    }

    // ------------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------------

    pub fn add_player(&mut self, id: PlayerId, callsign: &str, team: TeamColor) {
        self.players.insert(
            id,
            PlayerInfo {
                callsign: callsign.to_string(),
                team,
                flag: None,
                state: PlayerState::default(),
            },
        );
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<PlayerInfo> {
        self.players.remove(&id)
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerInfo> {
        self.players.get(&id)
    }

    pub fn set_player_state(&mut self, id: PlayerId, state: PlayerState) {
        if let Some(info) = self.players.get_mut(&id) {
            info.state = state;
        }
    }

    pub fn set_player_team(&mut self, id: PlayerId, team: TeamColor) {
        if let Some(info) = self.players.get_mut(&id) {
            info.team = team;
        }
    }

    pub fn give_flag(&mut self, id: PlayerId, abbreviation: &str) -> Result<()> {
        if !self.flag_exists(abbreviation) {
            bail!("Unknown flag {abbreviation}");
        }
        let Some(info) = self.players.get_mut(&id) else {
            bail!("Unknown player {id:?}");
        };
        info.flag = Some(abbreviation.to_string());
        Ok(())
    }

    pub fn drop_flag(&mut self, id: PlayerId) -> Option<String> {
        self.players.get_mut(&id).and_then(|info| info.flag.take())
    }

    // Player records handed out and not yet dropped
    #[must_use]
    pub fn outstanding_records(&self) -> usize {
        self.outstanding_records.load(Ordering::Relaxed)
    }

    // ------------------------------------------------------------------------
    // Shots
    // ------------------------------------------------------------------------

    fn track_shot(&mut self, owner: PlayerId, archetype: &str, pos: Vec3, vel: Vec3, team: TeamColor) -> ShotGuid {
        let guid = ShotGuid(self.next_guid);
        self.next_guid += 1;

        let next_local = self.next_shot_ids.entry(owner).or_insert(0);
        let shot_id = ShotId(*next_local);
        *next_local += 1;

        self.shots.insert(
            guid,
            TrackedShot {
                guid,
                owner,
                shot_id,
                archetype: archetype.to_string(),
                pos,
                vel,
                team,
                metadata: HashMap::new(),
            },
        );
        self.shot_index.insert((owner, shot_id), guid);

        trace!("tracking {guid:?} as {owner:?}/{shot_id:?} ({archetype})");
        guid
    }

    // Track a shot fired by a tank from its current position and heading
    pub fn track_player_shot(&mut self, id: PlayerId, archetype: &str) -> Option<ShotGuid> {
        let info = self.players.get(&id)?;
        let (pos, team) = (info.state.pos, info.team);
        let heading = Vec3::new(info.state.rotation.cos(), info.state.rotation.sin(), 0.0);
        Some(self.track_shot(id, archetype, pos, heading, team))
    }

    #[must_use]
    pub fn world_shot(&self, guid: ShotGuid) -> Option<&TrackedShot> {
        self.shots.get(&guid)
    }

    // Shots owned by the server player, oldest first
    #[must_use]
    pub fn world_shots(&self) -> Vec<&TrackedShot> {
        self.shots.values().filter(|shot| shot.owner == PlayerId::SERVER).collect()
    }

    pub fn expire_shot(&mut self, guid: ShotGuid) -> bool {
        let Some(shot) = self.shots.remove(&guid) else {
            return false;
        };
        self.shot_index.remove(&(shot.owner, shot.shot_id));
        true
    }

    // ------------------------------------------------------------------------
    // Event registration
    // ------------------------------------------------------------------------

    // Event kinds registered since the last call
    pub fn take_registered_events(&mut self) -> Vec<EventType> {
        std::mem::take(&mut self.pending_events)
    }
}

// ============================================================================
// Host API
// ============================================================================

impl Host for LocalHost {
    fn register_custom_flag(&mut self, flag: FlagDefinition) -> Result<()> {
        if self.flag_exists(&flag.abbreviation) {
            bail!("Flag {} is already registered", flag.abbreviation);
        }
        debug!("registered flag {} ({})", flag.name, flag.abbreviation);
        self.flags.insert(flag.abbreviation.clone(), flag);
        Ok(())
    }

    fn register_custom_double(&mut self, name: &str, default: f64) -> Result<()> {
        if self.vars.contains_key(name) {
            bail!("Variable {name} is already registered");
        }
        self.vars.insert(name.to_string(), VarValue::Double(default));
        self.custom_vars.insert(name.to_string());
        Ok(())
    }

    fn register_custom_int(&mut self, name: &str, default: i32) -> Result<()> {
        if self.vars.contains_key(name) {
            bail!("Variable {name} is already registered");
        }
        self.vars.insert(name.to_string(), VarValue::Int(default));
        self.custom_vars.insert(name.to_string());
        Ok(())
    }

    fn remove_custom_var(&mut self, name: &str) -> bool {
        if !self.custom_vars.remove(name) {
            return false;
        }
        self.vars.remove(name).is_some()
    }

    fn register_event(&mut self, event_type: EventType) {
        if !self.pending_events.contains(&event_type) {
            self.pending_events.push(event_type);
        }
    }

    fn flush_events(&mut self) {
        self.pending_events.clear();
    }

    fn var_double(&self, name: &str) -> f64 {
        self.vars.get(name).map_or(0.0, |value| value.as_double())
    }

    fn var_int(&self, name: &str) -> i32 {
        self.vars.get(name).map_or(0, |value| value.as_int())
    }

    fn player_record(&self, id: PlayerId) -> Option<PlayerRecord> {
        self.players.get(&id).map(|info| PlayerRecord {
            id,
            callsign: info.callsign.clone(),
            team: info.team,
            current_flag: info.flag.clone(),
            last_known_state: info.state,
            lease: RecordLease::tracked(&self.outstanding_records),
        })
    }

    fn player_team(&self, id: PlayerId) -> TeamColor {
        self.players.get(&id).map_or(TeamColor::NoTeam, |info| info.team)
    }

    fn fire_world_shot(&mut self, archetype: &str, pos: Vec3, vel: Vec3, team: TeamColor) -> ShotGuid {
        self.track_shot(PlayerId::SERVER, archetype, pos, vel, team)
    }

    fn set_shot_metadata(&mut self, guid: ShotGuid, key: &str, value: MetaValue) {
        if let Some(shot) = self.shots.get_mut(&guid) {
            shot.metadata.insert(key.to_string(), value);
        }
    }

    fn shot_has_metadata(&self, guid: ShotGuid, key: &str) -> bool {
        self.shots.get(&guid).is_some_and(|shot| shot.metadata.contains_key(key))
    }

    fn shot_metadata_text(&self, guid: ShotGuid, key: &str) -> Option<String> {
        match self.shots.get(&guid)?.metadata.get(key)? {
            MetaValue::Text(text) => Some(text.clone()),
            MetaValue::Player(id) => Some(id.0.to_string()),
        }
    }

    fn shot_metadata_player(&self, guid: ShotGuid, key: &str) -> Option<PlayerId> {
        match self.shots.get(&guid)?.metadata.get(key)? {
            MetaValue::Player(id) => Some(*id),
            MetaValue::Text(_) => None,
        }
    }

    fn shot_guid(&self, player: PlayerId, shot_id: ShotId) -> Option<ShotGuid> {
        self.shot_index.get(&(player, shot_id)).copied()
    }
}
