// SPDX-License-Identifier: Apache-2.0
use gridkeep_model::{ActorId, EffectDefId, EffectId, EffectShape, Vec2};
use serde::{Deserialize, Serialize};

/// The lifecycle moment an [`EffectEvent`] reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectEventKind {
    Spawn {
        def_id: EffectDefId,
        source: ActorId,
        position: Vec2,
        shape: EffectShape,
    },
    Update {
        position: Vec2,
    },
    End {
        /// Human-readable reason, e.g. `"duration"`, `"first_hit"`,
        /// `"owner_gone"`, `"hook_panic"`.
        reason: String,
    },
}

/// One entry in the effect event ledger.
///
/// `sequence` is strictly increasing per `effect_id`, starting at 1 for that
/// instance's spawn. A subscriber that has seen sequence `n` for an effect
/// and later receives `n` or lower again (or a gap past what the ledger
/// still retains) knows its view of that effect is unreliable and should
/// wait for the next keyframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectEvent {
    pub effect_id: EffectId,
    pub sequence: u64,
    pub tick: u64,
    pub kind: EffectEventKind,
}
