use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{host::LocalHost, settings::SkyfireSettings};

const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// Logging
// ============================================================================

// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    fmt().with_env_filter(filter).with_target(false).init();
}

// ============================================================================
// Settings Files
// ============================================================================

// Read salvo tunables from a JSON file. Missing fields keep their defaults.
pub fn load_settings(path: &Path) -> Result<SkyfireSettings> {
    let data = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Failed to parse {}", path.display()))
}

// Push tunables into the host's variable store, as an operator would with /set
pub fn apply_settings(host: &mut LocalHost, settings: &SkyfireSettings) {
    for (name, value) in settings.as_vars() {
        host.set_var(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COUNT_VAR;
    use common::{constants::TANK_SPEED_VAR, host::Host as _};

    #[test]
    fn apply_settings_overrides_registered_defaults() {
        let mut host = LocalHost::new();
        SkyfireSettings::register(&mut host).expect("register");

        let settings = SkyfireSettings {
            count: 2,
            radius: 5.0,
            ..SkyfireSettings::default()
        };
        apply_settings(&mut host, &settings);

        assert_eq!(host.var_int(COUNT_VAR), 2);
        assert_eq!(SkyfireSettings::read(&host), settings);
    }

    #[test]
    fn partial_settings_keep_host_tank_speed() {
        let mut host = LocalHost::new();
        SkyfireSettings::register(&mut host).expect("register");
        host.set_var(TANK_SPEED_VAR, 40.0);

        let settings: SkyfireSettings =
            serde_json::from_str(r#"{ "count": 2, "tank_speed": 99.0 }"#).expect("parse");
        apply_settings(&mut host, &settings);

        assert_eq!(host.var_int(COUNT_VAR), 2);
        assert!((host.var_double(TANK_SPEED_VAR) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn load_settings_reports_missing_file() {
        let err = load_settings(Path::new("/nonexistent/skyfire.json")).expect_err("missing file");
        assert!(err.to_string().contains("Failed to read"));
    }
}
