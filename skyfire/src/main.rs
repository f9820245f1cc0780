use anyhow::{Context, Result};
use bevy_math::Vec3;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use common::protocol::{PlayerId, PlayerState, TeamColor};
use skyfire::{
    PluginServer, SkyfireFlag,
    config::{apply_settings, init_tracing, load_settings},
    constants::SKYFIRE_FLAG,
    settings::SkyfireSettings,
};

const FIRER: PlayerId = PlayerId(1);
const VICTIM: PlayerId = PlayerId(2);

// ============================================================================
// CLI Argument Parsing
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "SkyFire flag simulator", long_about = None)]
struct Args {
    /// JSON file with salvo tunables
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Number of SkyFire shots to fire
    #[arg(long, default_value_t = 1)]
    shots: u32,

    /// Firer position
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    x: f32,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    y: f32,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    z: f32,

    /// Firer heading in radians
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    heading: f32,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut server = PluginServer::default();
    server.load_plugin(Box::new(SkyfireFlag::new()), "")?;

    if let Some(path) = &args.settings {
        let settings = load_settings(path)?;
        apply_settings(server.host_mut(), &settings);
        info!("applied settings from {}", path.display());
    }

    let host = server.host_mut();
    host.add_player(FIRER, "firer", TeamColor::Red);
    host.add_player(VICTIM, "victim", TeamColor::Blue);
    host.set_player_state(
        FIRER,
        PlayerState {
            pos: Vec3::new(args.x, args.y, args.z),
            rotation: args.heading,
            velocity: Vec3::ZERO,
        },
    );
    host.give_flag(FIRER, SKYFIRE_FLAG).context("Failed to hand out SkyFire")?;

    let settings = SkyfireSettings::read(server.host());
    info!(
        "salvo: {} missiles, radius {}, height {}",
        settings.count, settings.radius, settings.height
    );

    for _ in 0..args.shots {
        server.fire_shot(FIRER).context("Firer vanished")?;
    }

    let missiles: Vec<_> = server.host().world_shots().iter().map(|shot| (shot.guid, shot.pos, shot.vel)).collect();
    for (guid, pos, vel) in &missiles {
        info!("{guid:?} spawned at {pos} moving {vel}");
    }

    let Some((first, _, _)) = missiles.first() else {
        warn!("no missiles spawned");
        server.unload_plugins();
        return Ok(());
    };

    if let Some(died) = server.kill_player(VICTIM, *first) {
        info!(
            "victim killed by {:?} on {:?}; firer score {:?}",
            died.killer_id,
            died.killer_team,
            server.score(FIRER)
        );
    }

    server.unload_plugins();
    Ok(())
}
