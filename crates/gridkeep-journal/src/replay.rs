// SPDX-License-Identifier: Apache-2.0
//! Applies a drained patch batch to a [`WorldState`] snapshot.
//!
//! Mirrors the apply-side of the teacher's scene-delta port: one function
//! that mutates a snapshot in place given a batch of changes, rather than a
//! trait object per consumer. Every [`PatchKind`] carries the new field's
//! *whole* value (never a delta on top of the old one), so applying the
//! same patch twice, or applying two patches for the same `(kind, entity)`
//! out of order, both collapse to last-write-wins: each application simply
//! overwrites the field again.

use gridkeep_model::WorldState;

use crate::patch::{Patch, PatchKind, PatchValue};

/// Applies `patches` to `state` in order, mutating it in place.
///
/// A patch naming an entity no longer present in `state` (e.g. arriving
/// after that entity's removal patch in the same batch) is skipped: the
/// removal already dropped the entity, and there is nothing left to apply
/// the field change to.
pub fn apply_patches(state: &mut WorldState, patches: &[Patch]) {
    for patch in patches {
        apply_one(state, patch);
    }
}

fn apply_one(state: &mut WorldState, patch: &Patch) {
    match patch.kind {
        PatchKind::PlayerPos => {
            if let (Some(player), PatchValue::Position(pos)) =
                (state.players.get_mut(&id(patch)), &patch.value)
            {
                player.core.position = *pos;
                player.core.version = patch.version;
            }
        }
        PatchKind::PlayerFacing => {
            if let (Some(player), PatchValue::Facing(facing)) =
                (state.players.get_mut(&id(patch)), &patch.value)
            {
                player.core.facing = *facing;
                player.core.version = patch.version;
            }
        }
        PatchKind::PlayerIntent => {
            if let (Some(player), PatchValue::Intent(intent)) =
                (state.players.get_mut(&id(patch)), &patch.value)
            {
                player.intent = *intent;
            }
        }
        PatchKind::PlayerHealth => {
            if let (Some(player), PatchValue::Health(health)) =
                (state.players.get_mut(&id(patch)), &patch.value)
            {
                player.core.health = *health;
                player.core.version = patch.version;
            }
        }
        PatchKind::PlayerInventory => {
            if let (Some(player), PatchValue::Inventory(inventory)) =
                (state.players.get_mut(&id(patch)), &patch.value)
            {
                player.core.inventory = inventory.clone();
                player.core.version = patch.version;
            }
        }
        PatchKind::PlayerEquipment => {
            if let (Some(player), PatchValue::Equipment(equipment)) =
                (state.players.get_mut(&id(patch)), &patch.value)
            {
                player.core.equipment = equipment.clone();
                player.core.version = patch.version;
            }
        }
        PatchKind::PlayerRemoved => {
            state.players.remove(&id(patch));
        }
        PatchKind::NpcPos => {
            if let (Some(npc), PatchValue::Position(pos)) = (state.npcs.get_mut(&id(patch)), &patch.value) {
                npc.core.position = *pos;
                npc.core.version = patch.version;
            }
        }
        PatchKind::NpcFacing => {
            if let (Some(npc), PatchValue::Facing(facing)) = (state.npcs.get_mut(&id(patch)), &patch.value) {
                npc.core.facing = *facing;
                npc.core.version = patch.version;
            }
        }
        PatchKind::NpcHealth => {
            if let (Some(npc), PatchValue::Health(health)) = (state.npcs.get_mut(&id(patch)), &patch.value) {
                npc.core.health = *health;
                npc.core.version = patch.version;
            }
        }
        PatchKind::NpcInventory => {
            if let (Some(npc), PatchValue::Inventory(inventory)) =
                (state.npcs.get_mut(&id(patch)), &patch.value)
            {
                npc.core.inventory = inventory.clone();
                npc.core.version = patch.version;
            }
        }
        PatchKind::NpcEquipment => {
            if let (Some(npc), PatchValue::Equipment(equipment)) =
                (state.npcs.get_mut(&id(patch)), &patch.value)
            {
                npc.core.equipment = equipment.clone();
                npc.core.version = patch.version;
            }
        }
        PatchKind::NpcRemoved => {
            state.npcs.remove(&id(patch));
        }
        PatchKind::EffectPos => {
            let Some(effect_id) = effect_id(patch) else { return };
            if let (Some(effect), PatchValue::Position(pos)) = (state.effects.get_mut(&effect_id), &patch.value) {
                effect.position = *pos;
            }
        }
        PatchKind::EffectParams => {
            let Some(effect_id) = effect_id(patch) else { return };
            if let (Some(effect), PatchValue::Params(params)) = (state.effects.get_mut(&effect_id), &patch.value) {
                effect.parameters.clone_from(params);
            }
        }
        PatchKind::GroundItemPos => {
            if let (Some(item), PatchValue::Position(pos)) =
                (state.ground_items.get_mut(&ground_item_id(patch)), &patch.value)
            {
                item.position = *pos;
                item.version = patch.version;
            }
        }
        PatchKind::GroundItemQty => {
            if let (Some(item), PatchValue::Quantity(quantity)) =
                (state.ground_items.get_mut(&ground_item_id(patch)), &patch.value)
            {
                item.stack.quantity = *quantity;
                item.version = patch.version;
            }
        }
    }
}

fn id(patch: &Patch) -> gridkeep_model::ActorId {
    gridkeep_model::ActorId::new(patch.entity_id.clone())
}

/// [`gridkeep_model::EffectId`] is counter-backed; the wire form written by
/// [`crate::mutate::set_effect_position`]/[`crate::mutate::set_effect_params`]
/// is just its `Display` output, so replay parses it back. An unparseable id
/// can only mean the patch came from somewhere other than this journal;
/// skip it rather than panic.
fn effect_id(patch: &Patch) -> Option<gridkeep_model::EffectId> {
    patch.entity_id.parse().ok().map(gridkeep_model::EffectId::new)
}

fn ground_item_id(patch: &Patch) -> gridkeep_model::GroundItemId {
    gridkeep_model::GroundItemId::new(patch.entity_id.clone())
}
