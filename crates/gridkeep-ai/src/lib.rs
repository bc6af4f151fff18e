// SPDX-License-Identifier: Apache-2.0
//! Config-addressed NPC behaviour state machines.
//!
//! An [`AiLibrary`] maps an NPC's `ai_config_id` to a boxed [`AiBehavior`].
//! Each tick, [`tick_npc`] runs stuck detection, then the behaviour's own
//! state machine over the NPC's [`Blackboard`](gridkeep_model::Blackboard),
//! and returns a movement target for the simulation's movement stage to act
//! on. Facing changes are applied immediately through the write barrier,
//! since they don't depend on collision resolution the way position does.

#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]

mod behavior;
mod error;
mod library;
mod patrol;
mod stuck;

pub use behavior::{AiBehavior, AiDecision};
pub use error::AiError;
pub use library::AiLibrary;
pub use patrol::PatrolBehavior;
pub use stuck::StuckConfig;

use gridkeep_journal::{mutate, Journal};
use gridkeep_model::{ActorId, WorldState};

/// Runs one tick of AI for a single NPC: stuck detection, the NPC's
/// configured behaviour, and an immediate facing write-barrier update if
/// the behaviour requested one.
///
/// Returns the movement target the behaviour wants the NPC to move toward
/// this tick, if any. The caller (the simulation's movement stage) is
/// responsible for turning that into an actual position change.
pub fn tick_npc(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    library: &AiLibrary,
    npc_id: ActorId,
    stuck_cfg: StuckConfig,
) -> Result<Option<gridkeep_model::Vec2>, AiError> {
    let decision = {
        let npc = state
            .npcs
            .get_mut(&npc_id)
            .ok_or_else(|| AiError::NoSuchNpc(npc_id.clone()))?;
        stuck::detect_stuck(npc, tick, stuck_cfg);
        let behavior = library
            .get(&npc.ai_config_id)
            .ok_or_else(|| AiError::NoSuchConfig(npc.ai_config_id.clone()))?;
        behavior.tick(npc, tick)
    };

    if let Some(facing) = decision.facing {
        mutate::set_npc_facing(state, journal, tick, npc_id, facing).map_err(AiError::Mutate)?;
    }

    Ok(decision.move_target)
}
