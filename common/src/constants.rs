// ============================================================================
// Identities
// ============================================================================

// Player identity the host uses for world-owned shots
pub const SERVER_PLAYER_ID: u32 = 253;

// ============================================================================
// Built-in Variables
// ============================================================================

// Reference tank speed, registered by every host
pub const TANK_SPEED_VAR: &str = "_tankSpeed";
pub const DEFAULT_TANK_SPEED: f64 = 25.0; // world units per second

// ============================================================================
// Shot Metadata Conventions
// ============================================================================

// World weapon shots fired on behalf of a player carry these two keys. `type`
// holds the flag abbreviation of the plugin that fired them and `owner` holds
// the player that should be credited for kills.
pub const META_TYPE: &str = "type";
pub const META_OWNER: &str = "owner";
