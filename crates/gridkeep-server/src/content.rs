// SPDX-License-Identifier: Apache-2.0
//! World-construction-time content: the AI library and the NPCs spawned
//! into a fresh world before the tick loop starts.
//!
//! The item catalog and a data-driven NPC spawn table are out of scope (see
//! the purpose section this server was built against); this crate ships one
//! hardcoded reference goblin so `/join` has something alive to observe.

use gridkeep_ai::{AiLibrary, PatrolBehavior};
use gridkeep_model::{ActorId, AiConfigId, Npc, PatrolWaypoint, Vec2};
use gridkeep_sim::{World, WorldError};

/// Config id the patrol behaviour is registered under.
pub const GOBLIN_PATROL_CONFIG_ID: &str = "goblin_patrol";

/// Ticks a patrolling goblin waits at each end of its route.
const GOBLIN_PATROL_DWELL_TICKS: u32 = 10;

/// Builds the AI library every world is constructed with.
#[must_use]
pub fn ai_library() -> AiLibrary {
    let mut library = AiLibrary::new();
    library.register(AiConfigId::new(GOBLIN_PATROL_CONFIG_ID), Box::new(PatrolBehavior));
    library
}

/// Spawns the reference goblin patrolling `(360, 260) <-> (480, 260)`.
///
/// # Errors
/// Returns [`WorldError::DuplicateActorId`] if called twice against the
/// same world.
pub fn spawn_default_npcs(world: &mut World) -> Result<(), WorldError> {
    let start = Vec2::new(360.0, 260.0);
    let mut goblin = Npc::new(
        ActorId::new("goblin-1"),
        start,
        10.0,
        4,
        "goblin",
        AiConfigId::new(GOBLIN_PATROL_CONFIG_ID),
    );
    goblin.patrol_route = vec![
        PatrolWaypoint { position: start, dwell_ticks: GOBLIN_PATROL_DWELL_TICKS },
        PatrolWaypoint { position: Vec2::new(480.0, 260.0), dwell_ticks: GOBLIN_PATROL_DWELL_TICKS },
    ];
    world.spawn_npc(goblin)
}
