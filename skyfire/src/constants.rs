// ============================================================================
// Flag
// ============================================================================

pub const SKYFIRE_FLAG: &str = "SF";
pub const SKYFIRE_FLAG_NAME: &str = "Skyfire";
pub const SKYFIRE_FLAG_HELP: &str = "Firing triggers a hail of missiles from the sky falling in front of your tank.";

// Value of the `type` metadata on every missile of a salvo
pub const SKYFIRE_MARKER: &str = SKYFIRE_FLAG;

// Shot archetype requested from the host for each missile (guided missile)
pub const MISSILE_ARCHETYPE: &str = "GM";

// ============================================================================
// Tunables
// ============================================================================

pub const HEIGHT_VAR: &str = "_skyfireHeight";
pub const RADIUS_VAR: &str = "_skyfireRadius";
pub const COUNT_VAR: &str = "_skyfireCount";
pub const VERT_SPEED_VAR: &str = "_skyfireVertSpeedAdVel";
pub const HORIZ_SPEED_VAR: &str = "_skyfireHorizSpeedAdVel";

pub const DEFAULT_HEIGHT: f64 = 50.0; // absolute altitude, world units
pub const DEFAULT_RADIUS: f64 = 30.0; // world units
pub const DEFAULT_COUNT: i32 = 10;
pub const DEFAULT_VERT_SPEED: f64 = 1.0;
pub const DEFAULT_HORIZ_SPEED: f64 = 5.0;

// Firer velocity is scaled by this over the reference tank speed
pub const FIRER_VELOCITY_GAIN: f32 = 2.0;
