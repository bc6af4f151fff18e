// SPDX-License-Identifier: Apache-2.0
//! The reference goblin patrol fixture: a two-waypoint route walked by
//! [`gridkeep_ai::PatrolBehavior`].

use gridkeep_ai::{AiLibrary, PatrolBehavior};
use gridkeep_model::{ActorId, AiConfigId, Npc, PatrolWaypoint, Vec2};

/// AI config id the patrol behaviour is registered under, matching the
/// convention `gridkeep-ai`'s own tests use for this archetype.
pub const GOBLIN_PATROL_CONFIG_ID: &str = "goblin_patrol";

/// Ticks a patrolling goblin waits at each end of its route before turning
/// back.
pub const GOBLIN_PATROL_DWELL_TICKS: u32 = 10;

/// Builds an [`AiLibrary`] with [`PatrolBehavior`] registered under
/// [`GOBLIN_PATROL_CONFIG_ID`], ready to drive any NPC built by
/// [`goblin_patrol_npc`].
#[must_use]
pub fn goblin_patrol_ai_library() -> AiLibrary {
    let mut library = AiLibrary::new();
    library.register(AiConfigId::new(GOBLIN_PATROL_CONFIG_ID), Box::new(PatrolBehavior));
    library
}

/// Builds a goblin NPC walking the two-waypoint route `(360, 260) <->
/// (480, 260)`, starting at the first waypoint.
#[must_use]
pub fn goblin_patrol_npc(id: &str) -> Npc {
    let start = Vec2::new(360.0, 260.0);
    let mut npc = Npc::new(
        ActorId::new(id),
        start,
        10.0,
        4,
        "goblin",
        AiConfigId::new(GOBLIN_PATROL_CONFIG_ID),
    );
    npc.patrol_route = vec![
        PatrolWaypoint { position: start, dwell_ticks: GOBLIN_PATROL_DWELL_TICKS },
        PatrolWaypoint { position: Vec2::new(480.0, 260.0), dwell_ticks: GOBLIN_PATROL_DWELL_TICKS },
    ];
    npc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_resolves_the_registered_config() {
        let library = goblin_patrol_ai_library();
        assert!(library.get(&AiConfigId::new(GOBLIN_PATROL_CONFIG_ID)).is_some());
    }

    #[test]
    fn npc_starts_at_the_first_waypoint() {
        let npc = goblin_patrol_npc("goblin-1");
        assert_eq!(npc.core.position, Vec2::new(360.0, 260.0));
        assert_eq!(npc.patrol_route.len(), 2);
    }
}
