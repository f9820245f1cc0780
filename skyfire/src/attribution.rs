use tracing::{debug, trace};

use crate::constants::SKYFIRE_MARKER;
use common::{
    constants::{META_OWNER, META_TYPE},
    events::PlayerDieEvent,
    host::Host,
};

// ============================================================================
// Player Die Handler
// ============================================================================

/// Credit a SkyFire missile kill to the player who fired the salvo.
///
/// Missiles are world shots, so the host reports the server player as the
/// killer. When the killing shot carries both the SkyFire `type` marker and an
/// `owner`, the killer is rewritten to that owner and their current team.
/// Anything else leaves the event as the host built it. Returns whether the
/// event was rewritten.
pub fn attribute_kill(host: &dyn Host, event: &mut PlayerDieEvent) -> bool {
    let Some(guid) = host.shot_guid(event.killer_id, event.shot_id) else {
        trace!("shot {:?}/{:?} is not tracked", event.killer_id, event.shot_id);
        return false;
    };

    if !host.shot_has_metadata(guid, META_TYPE) || !host.shot_has_metadata(guid, META_OWNER) {
        return false;
    }

    if host.shot_metadata_text(guid, META_TYPE).as_deref() != Some(SKYFIRE_MARKER) {
        return false;
    }

    let Some(owner) = host.shot_metadata_player(guid, META_OWNER) else {
        debug!("{guid:?} has an owner that is not a player id");
        return false;
    };

    event.killer_id = owner;
    event.killer_team = host.player_team(owner);
    debug!("{:?} killed by {:?} via SkyFire", event.player_id, owner);

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LocalHost;
    use bevy_math::Vec3;
    use common::protocol::{MetaValue, PlayerId, PlayerState, ShotGuid, ShotId, TeamColor};

    struct Fixture {
        host: LocalHost,
        guid: ShotGuid,
        event: PlayerDieEvent,
    }

    // Victim 7 killed by a world shot carrying the given metadata
    fn fixture(metadata: &[(&str, MetaValue)]) -> Fixture {
        let mut host = LocalHost::new();
        host.add_player(PlayerId(42), "owner", TeamColor::Blue);
        host.add_player(PlayerId(7), "victim", TeamColor::Green);

        let guid = host.fire_world_shot("GM", Vec3::new(0.0, 0.0, 50.0), Vec3::NEG_Z, TeamColor::Blue);
        for (key, value) in metadata {
            host.set_shot_metadata(guid, key, value.clone());
        }
        let shot = host.world_shot(guid).expect("shot");

        let event = PlayerDieEvent {
            player_id: PlayerId(7),
            team: TeamColor::Green,
            killer_id: shot.owner,
            killer_team: shot.team,
            flag_killed_with: "GM".to_string(),
            shot_id: shot.shot_id,
            state: PlayerState::default(),
        };

        Fixture { host, guid, event }
    }

    #[test]
    fn marked_shot_credits_owner_and_team() {
        let mut f = fixture(&[
            (META_TYPE, MetaValue::from("SF")),
            (META_OWNER, MetaValue::Player(PlayerId(42))),
        ]);

        assert!(attribute_kill(&f.host, &mut f.event));
        assert_eq!(f.event.killer_id, PlayerId(42));
        assert_eq!(f.event.killer_team, TeamColor::Blue);
    }

    #[test]
    fn owner_team_is_looked_up_at_death_time() {
        let mut f = fixture(&[
            (META_TYPE, MetaValue::from("SF")),
            (META_OWNER, MetaValue::Player(PlayerId(42))),
        ]);
        f.host.set_player_team(PlayerId(42), TeamColor::Purple);

        assert!(attribute_kill(&f.host, &mut f.event));
        assert_eq!(f.event.killer_team, TeamColor::Purple);
    }

    #[test]
    fn owner_who_left_is_credited_without_team() {
        let mut f = fixture(&[
            (META_TYPE, MetaValue::from("SF")),
            (META_OWNER, MetaValue::Player(PlayerId(42))),
        ]);
        f.host.remove_player(PlayerId(42)).expect("owner");

        assert!(attribute_kill(&f.host, &mut f.event));
        assert_eq!(f.event.killer_id, PlayerId(42));
        assert_eq!(f.event.killer_team, TeamColor::NoTeam);
    }

    #[test]
    fn missing_owner_leaves_event_unchanged() {
        let mut f = fixture(&[(META_TYPE, MetaValue::from("SF"))]);
        let before = f.event.clone();

        assert!(!attribute_kill(&f.host, &mut f.event));
        assert_eq!(f.event, before);
    }

    #[test]
    fn missing_type_leaves_event_unchanged() {
        let mut f = fixture(&[(META_OWNER, MetaValue::Player(PlayerId(42)))]);
        let before = f.event.clone();

        assert!(!attribute_kill(&f.host, &mut f.event));
        assert_eq!(f.event, before);
    }

    #[test]
    fn other_marker_leaves_event_unchanged() {
        let mut f = fixture(&[
            (META_TYPE, MetaValue::from("MG")),
            (META_OWNER, MetaValue::Player(PlayerId(42))),
        ]);
        let before = f.event.clone();

        assert!(!attribute_kill(&f.host, &mut f.event));
        assert_eq!(f.event, before);
    }

    #[test]
    fn textual_owner_is_ignored() {
        let mut f = fixture(&[(META_TYPE, MetaValue::from("SF")), (META_OWNER, MetaValue::from("42"))]);
        let before = f.event.clone();

        assert!(!attribute_kill(&f.host, &mut f.event));
        assert_eq!(f.event, before);
    }

    #[test]
    fn expired_shot_leaves_event_unchanged() {
        let mut f = fixture(&[
            (META_TYPE, MetaValue::from("SF")),
            (META_OWNER, MetaValue::Player(PlayerId(42))),
        ]);
        f.host.expire_shot(f.guid);
        let before = f.event.clone();

        assert!(!attribute_kill(&f.host, &mut f.event));
        assert_eq!(f.event, before);
    }

    #[test]
    fn unknown_shot_leaves_event_unchanged() {
        let mut f = fixture(&[]);
        f.event.shot_id = ShotId(999);
        let before = f.event.clone();

        assert!(!attribute_kill(&f.host, &mut f.event));
        assert_eq!(f.event, before);
    }
}
