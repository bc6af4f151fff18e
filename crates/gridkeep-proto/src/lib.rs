// SPDX-License-Identifier: Apache-2.0
//! JSON wire schema for the session hub: client-originated commands and the
//! server's `state`/`heartbeat` broadcast frames.
//!
//! Reuses [`gridkeep_journal`]'s `Patch`/`Keyframe`/`EffectEvent` types
//! directly as wire payloads rather than re-deriving a parallel diff
//! format — the same "carry the canonical type across the wire instead of a
//! shadow copy" choice the session protocol this one is modelled on makes
//! for its RMG frames.

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

use std::collections::BTreeMap;

use gridkeep_journal::{EffectEvent, EffectEventKind, Keyframe, Patch, PatchKind};
use gridkeep_model::{ActorId, EffectDefId, EffectId, EffectShape, Vec2};
use serde::{Deserialize, Serialize};

mod client;
mod server;

pub use client::ClientMessage;
pub use server::{EffectEndedWire, EffectSpawnedWire, EffectUpdatedWire, ServerMessage, StatePayload};

/// Builds the `state` frame for one broadcast round.
///
/// `patches` is one tick's (or one catch-up window's) drain from
/// [`gridkeep_journal::Journal::drain_patches`]; this sorts them into the
/// wire's `players`/`npcs`/`groundItems` buckets by entity kind.
/// `effect_pos`/`effect_params` patches aren't surfaced through any of those
/// buckets — effect position/parameter changes reach the client through the
/// `effect_update` ledger entries below instead, and the patches exist only
/// to satisfy the journal's own apply-patches round-trip guarantee over
/// [`gridkeep_model::EffectInstance`] fields.
#[must_use]
pub fn build_state_message(
    tick: u64,
    sequence: u64,
    resync: bool,
    keyframe: Option<Keyframe>,
    patches: Vec<Patch>,
    effect_events: &[EffectEvent],
    effect_seq_cursors: BTreeMap<String, u64>,
    server_time: u64,
) -> ServerMessage {
    let mut players = Vec::new();
    let mut npcs = Vec::new();
    let mut ground_items = Vec::new();
    for patch in patches {
        match patch.kind {
            PatchKind::PlayerPos
            | PatchKind::PlayerFacing
            | PatchKind::PlayerIntent
            | PatchKind::PlayerHealth
            | PatchKind::PlayerInventory
            | PatchKind::PlayerEquipment
            | PatchKind::PlayerRemoved => players.push(patch),
            PatchKind::NpcPos
            | PatchKind::NpcFacing
            | PatchKind::NpcHealth
            | PatchKind::NpcInventory
            | PatchKind::NpcEquipment
            | PatchKind::NpcRemoved => npcs.push(patch),
            PatchKind::GroundItemPos | PatchKind::GroundItemQty => ground_items.push(patch),
            PatchKind::EffectPos | PatchKind::EffectParams => {}
        }
    }

    let mut effect_spawned = Vec::new();
    let mut effect_update = Vec::new();
    let mut effect_ended = Vec::new();
    for event in effect_events {
        match &event.kind {
            EffectEventKind::Spawn { def_id, source, position, shape } => {
                effect_spawned.push(EffectSpawnedWire {
                    effect_id: event.effect_id,
                    sequence: event.sequence,
                    tick: event.tick,
                    def_id: def_id.clone(),
                    source: source.clone(),
                    position: *position,
                    shape: *shape,
                });
            }
            EffectEventKind::Update { position } => {
                effect_update.push(EffectUpdatedWire {
                    effect_id: event.effect_id,
                    sequence: event.sequence,
                    tick: event.tick,
                    position: *position,
                });
            }
            EffectEventKind::End { reason } => {
                effect_ended.push(EffectEndedWire {
                    effect_id: event.effect_id,
                    sequence: event.sequence,
                    tick: event.tick,
                    reason: reason.clone(),
                });
            }
        }
    }

    ServerMessage::State(StatePayload {
        tick,
        sequence,
        resync,
        keyframe,
        players: none_if_empty(players),
        npcs: none_if_empty(npcs),
        ground_items: none_if_empty(ground_items),
        effect_spawned: none_if_empty(effect_spawned),
        effect_update: none_if_empty(effect_update),
        effect_ended: none_if_empty(effect_ended),
        effect_seq_cursors: if effect_seq_cursors.is_empty() { None } else { Some(effect_seq_cursors) },
        server_time,
    })
}

fn none_if_empty<T>(v: Vec<T>) -> Option<Vec<T>> {
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridkeep_journal::PatchValue;

    #[test]
    fn state_message_buckets_patches_by_entity_kind() {
        let patches = vec![
            Patch {
                entity_id: "p1".to_owned(),
                kind: PatchKind::PlayerPos,
                value: PatchValue::Position(Vec2::ZERO),
                tick: 1,
                version: 1,
            },
            Patch {
                entity_id: "goblin".to_owned(),
                kind: PatchKind::NpcRemoved,
                value: PatchValue::Removed,
                tick: 1,
                version: 3,
            },
            Patch {
                entity_id: "e1".to_owned(),
                kind: PatchKind::EffectPos,
                value: PatchValue::Position(Vec2::ZERO),
                tick: 1,
                version: 1,
            },
        ];
        let ServerMessage::State(state) = build_state_message(1, 1, false, None, patches, &[], BTreeMap::new(), 0) else {
            unreachable!("build_state_message always returns a State frame")
        };
        assert_eq!(state.players.map(|p| p.len()), Some(1));
        assert_eq!(state.npcs.map(|n| n.len()), Some(1));
        assert!(state.ground_items.is_none());
    }
}
