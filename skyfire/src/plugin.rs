use anyhow::Result;
use tracing::info;

use crate::{attribution::attribute_kill, salvo::fire_salvo, settings::SkyfireSettings};
use common::{
    events::{Event, EventType},
    host::Host,
    plugin::Plugin,
};

pub const PLUGIN_NAME: &str = "Skyfire Flag";

// ============================================================================
// SkyFire Flag Plugin
// ============================================================================

/// Firing with SkyFire (+SF) drops a hail of missiles around the firer, and
/// kills made by those missiles are credited back to the firer.
#[derive(Debug, Default)]
pub struct SkyfireFlag;

impl SkyfireFlag {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Plugin for SkyfireFlag {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn init(&mut self, host: &mut dyn Host, _config: &str) -> Result<()> {
        SkyfireSettings::register(host)?;
        host.register_event(EventType::ShotFired);
        host.register_event(EventType::PlayerDie);
        info!("{PLUGIN_NAME} loaded");
        Ok(())
    }

    fn event(&mut self, host: &mut dyn Host, event: &mut Event) {
        match event {
            Event::ShotFired(data) => {
                fire_salvo(host, data);
            }
            Event::PlayerDie(data) => {
                attribute_kill(host, data);
            }
        }
    }

    fn cleanup(&mut self, host: &mut dyn Host) {
        host.flush_events();
        SkyfireSettings::unregister(host);
        info!("{PLUGIN_NAME} unloaded");
    }
}
