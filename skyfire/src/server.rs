use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::host::LocalHost;
use common::{
    events::{Event, EventType, PlayerDieEvent, ShotFiredEvent},
    plugin::Plugin,
    protocol::{PlayerId, ShotGuid},
};

// ============================================================================
// Plugin Server
// ============================================================================

struct LoadedPlugin {
    plugin: Box<dyn Plugin>,
    events: Vec<EventType>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub wins: u32,
    pub losses: u32,
}

/// Drives loaded plugins against a [`LocalHost`].
///
/// Events are dispatched synchronously, in load order, to every plugin that
/// registered the event kind during `init`.
pub struct PluginServer {
    host: LocalHost,
    plugins: Vec<LoadedPlugin>,
    scores: HashMap<PlayerId, Score>,
}

impl Default for PluginServer {
    fn default() -> Self {
        Self::new(LocalHost::new())
    }
}

impl PluginServer {
    #[must_use]
    pub fn new(host: LocalHost) -> Self {
        Self {
            host,
            plugins: Vec::new(),
            scores: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn host(&self) -> &LocalHost {
        &self.host
    }

    pub const fn host_mut(&mut self) -> &mut LocalHost {
        &mut self.host
    }

    // ------------------------------------------------------------------------
    // Plugin lifecycle
    // ------------------------------------------------------------------------

    pub fn load_plugin(&mut self, mut plugin: Box<dyn Plugin>, config: &str) -> Result<()> {
        // Start from a clean registration slate
        self.host.take_registered_events();

        plugin
            .init(&mut self.host, config)
            .with_context(|| format!("Failed to load plugin {}", plugin.name()))?;

        let events = self.host.take_registered_events();
        info!("loaded plugin {} listening for {:?}", plugin.name(), events);
        self.plugins.push(LoadedPlugin { plugin, events });
        Ok(())
    }

    // Unload in reverse load order
    pub fn unload_plugins(&mut self) {
        while let Some(mut loaded) = self.plugins.pop() {
            loaded.plugin.cleanup(&mut self.host);
            info!("unloaded plugin {}", loaded.plugin.name());
        }
    }

    #[must_use]
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|loaded| loaded.plugin.name()).collect()
    }

    pub fn dispatch(&mut self, event: &mut Event) {
        let event_type = event.event_type();
        for loaded in &mut self.plugins {
            if loaded.events.contains(&event_type) {
                loaded.plugin.event(&mut self.host, event);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------------

    /// A tank fires with whatever flag it holds. Returns the tracked shot.
    pub fn fire_shot(&mut self, player: PlayerId) -> Option<ShotGuid> {
        let shot_type = self.host.player(player)?.flag.clone().unwrap_or_default();
        let guid = self.host.track_player_shot(player, &shot_type)?;
        let shot = self.host.world_shot(guid)?;

        let mut event = Event::ShotFired(ShotFiredEvent {
            player_id: player,
            shot_id: shot.shot_id,
            shot_type,
            pos: shot.pos,
        });
        self.dispatch(&mut event);

        Some(guid)
    }

    /// Kill `victim` with a tracked shot and score the result.
    ///
    /// The host reports the shot's owner as the killer; plugins may rewrite
    /// that before the kill is scored. The shot is spent afterwards.
    pub fn kill_player(&mut self, victim: PlayerId, guid: ShotGuid) -> Option<PlayerDieEvent> {
        let shot = self.host.world_shot(guid)?;
        let info = self.host.player(victim)?;

        let mut event = Event::PlayerDie(PlayerDieEvent {
            player_id: victim,
            team: info.team,
            killer_id: shot.owner,
            killer_team: shot.team,
            flag_killed_with: shot.archetype.clone(),
            shot_id: shot.shot_id,
            state: info.state,
        });
        self.dispatch(&mut event);
        self.host.expire_shot(guid);

        let Event::PlayerDie(died) = event else {
            return None;
        };

        if died.killer_id != victim {
            self.scores.entry(died.killer_id).or_default().wins += 1;
        }
        self.scores.entry(victim).or_default().losses += 1;
        debug!("{:?} killed by {:?} ({:?})", victim, died.killer_id, died.killer_team);

        Some(died)
    }

    #[must_use]
    pub fn score(&self, player: PlayerId) -> Score {
        self.scores.get(&player).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::SKYFIRE_FLAG, plugin::SkyfireFlag};
    use common::protocol::TeamColor;

    fn server_with_skyfire() -> PluginServer {
        let mut server = PluginServer::default();
        server.load_plugin(Box::new(SkyfireFlag::new()), "").expect("load");
        server.host_mut().add_player(PlayerId(1), "firer", TeamColor::Red);
        server.host_mut().add_player(PlayerId(2), "victim", TeamColor::Blue);
        server
    }

    #[test]
    fn load_records_registered_events() {
        let server = server_with_skyfire();
        assert_eq!(server.plugin_names(), vec!["Skyfire Flag"]);
        assert_eq!(server.plugins[0].events, vec![EventType::ShotFired, EventType::PlayerDie]);
    }

    #[test]
    fn reload_after_unload_still_fires_salvos() {
        let mut server = server_with_skyfire();
        server.unload_plugins();
        server.load_plugin(Box::new(SkyfireFlag::new()), "").expect("reload");

        server.host_mut().give_flag(PlayerId(1), SKYFIRE_FLAG).expect("flag");
        server.fire_shot(PlayerId(1)).expect("shot");
        assert_eq!(server.host().world_shots().len(), crate::constants::DEFAULT_COUNT as usize);
    }

    #[test]
    fn loading_twice_fails_on_duplicate_tunables() {
        let mut server = server_with_skyfire();
        assert!(server.load_plugin(Box::new(SkyfireFlag::new()), "").is_err());
        assert_eq!(server.plugin_names().len(), 1);
    }

    #[test]
    fn normal_kill_is_scored_for_shooter() {
        let mut server = server_with_skyfire();
        let guid = server.fire_shot(PlayerId(1)).expect("shot");

        let died = server.kill_player(PlayerId(2), guid).expect("death");
        assert_eq!(died.killer_id, PlayerId(1));
        assert_eq!(server.score(PlayerId(1)).wins, 1);
        assert_eq!(server.score(PlayerId(2)).losses, 1);
    }

    #[test]
    fn unload_stops_dispatch() {
        let mut server = server_with_skyfire();
        server.host_mut().give_flag(PlayerId(1), SKYFIRE_FLAG).expect("flag");
        server.unload_plugins();

        server.fire_shot(PlayerId(1)).expect("shot");
        assert!(server.host().world_shots().is_empty());
        assert!(server.plugin_names().is_empty());
    }
}
