use bevy_math::Vec3;
use rand::{Rng as _, SeedableRng as _};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;
use tracing::{debug, trace};

use crate::{constants::*, settings::SkyfireSettings};
use common::{
    constants::{META_OWNER, META_TYPE},
    events::ShotFiredEvent,
    host::Host,
    protocol::{MetaValue, PlayerState, ShotId},
};

// ============================================================================
// Salvo Geometry
// ============================================================================

// Polar offset of one missile from the firer, in the horizontal plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalvoSample {
    pub radius: f32,
    pub angle: f32, // radians
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissileLaunch {
    pub pos: Vec3,
    pub vel: Vec3,
}

/// Draw the polar offsets for one salvo.
///
/// The generator is seeded from the shot id alone, so the same shot always
/// produces the same pattern. A non-positive count yields no samples.
#[must_use]
pub fn salvo_samples(shot_id: ShotId, count: i32, max_radius: f32) -> Vec<SalvoSample> {
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(shot_id.0));

    (0..count.max(0))
        .map(|_| {
            let radius = rng.random_range(0.0..=1.0_f32) * max_radius;
            let angle = rng.random::<f32>() * TAU;
            SalvoSample { radius, angle }
        })
        .collect()
}

/// Spawn position and velocity of a single missile.
///
/// Missiles start at the configured absolute height regardless of how high
/// the firer is, drift along the firer's heading and fall straight down at
/// the configured vertical speed.
#[must_use]
pub fn launch(sample: SalvoSample, firer: &PlayerState, settings: &SkyfireSettings) -> MissileLaunch {
    let pos = Vec3::new(
        sample.radius.mul_add(sample.angle.cos(), firer.pos.x),
        sample.radius.mul_add(sample.angle.sin(), firer.pos.y),
        settings.height,
    );

    // Drop the firer's own motion when the reference speed is unusable
    let (drift_x, drift_y) = if settings.tank_speed > 0.0 {
        (
            FIRER_VELOCITY_GAIN * firer.velocity.x / settings.tank_speed,
            FIRER_VELOCITY_GAIN * firer.velocity.y / settings.tank_speed,
        )
    } else {
        (0.0, 0.0)
    };

    let vel = Vec3::new(
        (firer.rotation.cos() + drift_x) * settings.horiz_speed,
        (firer.rotation.sin() + drift_y) * settings.horiz_speed,
        -settings.vert_speed.abs(),
    );

    MissileLaunch { pos, vel }
}

// ============================================================================
// Shot Fired Handler
// ============================================================================

// Spawn a salvo for a player firing with SkyFire. Returns the number of missiles.
pub fn fire_salvo(host: &mut dyn Host, event: &ShotFiredEvent) -> usize {
    let Some(record) = host.player_record(event.player_id) else {
        debug!("no player record for {:?}, skipping salvo", event.player_id);
        return 0;
    };

    if !record.holds_flag(SKYFIRE_FLAG) {
        trace!("{:?} fired without {SKYFIRE_FLAG}", event.player_id);
        return 0;
    }

    let settings = SkyfireSettings::read(host);
    let samples = salvo_samples(event.shot_id, settings.count, settings.radius);

    for sample in &samples {
        let missile = launch(*sample, &record.last_known_state, &settings);
        let guid = host.fire_world_shot(MISSILE_ARCHETYPE, missile.pos, missile.vel, record.team);
        host.set_shot_metadata(guid, META_TYPE, MetaValue::from(SKYFIRE_MARKER));
        host.set_shot_metadata(guid, META_OWNER, MetaValue::Player(record.id));
    }

    debug!(
        "{:?} shot {:?} triggered {} missiles at height {}",
        record.id,
        event.shot_id,
        samples.len(),
        settings.height
    );

    samples.len()
}
