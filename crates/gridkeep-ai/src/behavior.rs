// SPDX-License-Identifier: Apache-2.0
use gridkeep_model::{Facing, Npc, Vec2};

/// What a behaviour tick decided for this NPC. Either field may be absent:
/// a "wait" state produces neither a move target nor a facing change.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AiDecision {
    /// Where the NPC wants to be moving toward this tick.
    pub move_target: Option<Vec2>,
    /// The facing the NPC wants to adopt this tick.
    pub facing: Option<Facing>,
}

/// A config-addressed NPC behaviour: a state machine over the NPC's own
/// blackboard.
///
/// Implementations are expected to be stateless; all per-NPC state lives in
/// `npc.blackboard`, so one `AiBehavior` instance is shared by every NPC
/// configured to use it.
pub trait AiBehavior: Send + Sync {
    /// Advances this NPC's blackboard state machine by one tick and
    /// returns the resulting decision.
    fn tick(&self, npc: &mut Npc, tick: u64) -> AiDecision;
}
