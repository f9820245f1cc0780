use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::*;
use common::{
    constants::{DEFAULT_TANK_SPEED, TANK_SPEED_VAR},
    host::Host,
    protocol::{FlagDefinition, FlagQuality},
};

// ============================================================================
// Flag Declaration
// ============================================================================

#[must_use]
pub fn skyfire_flag() -> FlagDefinition {
    FlagDefinition {
        abbreviation: SKYFIRE_FLAG.to_string(),
        name: SKYFIRE_FLAG_NAME.to_string(),
        help: SKYFIRE_FLAG_HELP.to_string(),
        quality: FlagQuality::Good,
    }
}

// ============================================================================
// Tunables
// ============================================================================

/// Salvo tunables as read from the host's variable store.
///
/// A fresh snapshot is taken for every shot, so server operators can retune
/// the flag while a game is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyfireSettings {
    pub height: f32,
    pub radius: f32,
    pub count: i32,
    pub vert_speed: f32,
    pub horiz_speed: f32,
    #[serde(skip, default = "default_tank_speed")]
    pub tank_speed: f32,
}

// Host built-in, never taken from a settings file
const fn default_tank_speed() -> f32 {
    DEFAULT_TANK_SPEED as f32
}

impl Default for SkyfireSettings {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT as f32,
            radius: DEFAULT_RADIUS as f32,
            count: DEFAULT_COUNT,
            vert_speed: DEFAULT_VERT_SPEED as f32,
            horiz_speed: DEFAULT_HORIZ_SPEED as f32,
            tank_speed: DEFAULT_TANK_SPEED as f32,
        }
    }
}

impl SkyfireSettings {
    // Declare the flag and the five tunables with their defaults
    pub fn register(host: &mut dyn Host) -> Result<()> {
        // The flag outlives an unload, so a reload finds it already declared
        if let Err(err) = host.register_custom_flag(skyfire_flag()) {
            debug!("keeping existing {SKYFIRE_FLAG} flag: {err}");
        }

        for (name, default) in [
            (HEIGHT_VAR, DEFAULT_HEIGHT),
            (RADIUS_VAR, DEFAULT_RADIUS),
            (VERT_SPEED_VAR, DEFAULT_VERT_SPEED),
            (HORIZ_SPEED_VAR, DEFAULT_HORIZ_SPEED),
        ] {
            host.register_custom_double(name, default)
                .with_context(|| format!("Failed to register {name}"))?;
        }
        host.register_custom_int(COUNT_VAR, DEFAULT_COUNT)
            .with_context(|| format!("Failed to register {COUNT_VAR}"))?;

        Ok(())
    }

    pub fn unregister(host: &mut dyn Host) {
        for name in [HEIGHT_VAR, RADIUS_VAR, COUNT_VAR, VERT_SPEED_VAR, HORIZ_SPEED_VAR] {
            host.remove_custom_var(name);
        }
    }

    #[must_use]
    pub fn read(host: &dyn Host) -> Self {
        Self {
            height: host.var_double(HEIGHT_VAR) as f32,
            radius: host.var_double(RADIUS_VAR) as f32,
            count: host.var_int(COUNT_VAR),
            vert_speed: host.var_double(VERT_SPEED_VAR) as f32,
            horiz_speed: host.var_double(HORIZ_SPEED_VAR) as f32,
            tank_speed: host.var_double(TANK_SPEED_VAR) as f32,
        }
    }

    // Plugin tunables as variable name and value pairs, in registration order
    #[must_use]
    pub fn as_vars(&self) -> [(&'static str, f64); 5] {
        [
            (HEIGHT_VAR, f64::from(self.height)),
            (RADIUS_VAR, f64::from(self.radius)),
            (COUNT_VAR, f64::from(self.count)),
            (VERT_SPEED_VAR, f64::from(self.vert_speed)),
            (HORIZ_SPEED_VAR, f64::from(self.horiz_speed)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LocalHost;

    #[test]
    fn register_then_read_yields_defaults() {
        let mut host = LocalHost::new();
        SkyfireSettings::register(&mut host).expect("register");

        assert_eq!(SkyfireSettings::read(&host), SkyfireSettings::default());
        let flag = host.flag(SKYFIRE_FLAG).expect("flag");
        assert_eq!(flag.name, "Skyfire");
    }

    #[test]
    fn read_picks_up_retuned_values() {
        let mut host = LocalHost::new();
        SkyfireSettings::register(&mut host).expect("register");
        host.set_var(COUNT_VAR, 3.0);
        host.set_var(HEIGHT_VAR, 80.0);

        let settings = SkyfireSettings::read(&host);
        assert_eq!(settings.count, 3);
        assert!((settings.height - 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn registering_twice_fails_on_live_tunables() {
        let mut host = LocalHost::new();
        SkyfireSettings::register(&mut host).expect("register");
        assert!(SkyfireSettings::register(&mut host).is_err());
    }

    #[test]
    fn register_after_unregister_reuses_flag() {
        let mut host = LocalHost::new();
        SkyfireSettings::register(&mut host).expect("register");
        SkyfireSettings::unregister(&mut host);

        SkyfireSettings::register(&mut host).expect("re-register");
        assert!(host.flag(SKYFIRE_FLAG).is_some());
        assert_eq!(host.var_int(COUNT_VAR), DEFAULT_COUNT);
    }

    #[test]
    fn unregister_removes_tunables() {
        let mut host = LocalHost::new();
        SkyfireSettings::register(&mut host).expect("register");
        SkyfireSettings::unregister(&mut host);

        assert_eq!(host.var_int(COUNT_VAR), 0);
        assert!(host.var_double(HEIGHT_VAR).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let settings: SkyfireSettings = serde_json::from_str(r#"{ "count": 4 }"#).expect("parse");
        assert_eq!(settings.count, 4);
        assert!((settings.radius - DEFAULT_RADIUS as f32).abs() < f32::EPSILON);
    }
}
