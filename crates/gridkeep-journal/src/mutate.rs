// SPDX-License-Identifier: Apache-2.0
//! Write-barrier mutators: the only sanctioned way to change a field that
//! clients observe via patches.
//!
//! Scalar fields (position, facing, health, intent) follow the same shape:
//! look the entity up, validate, skip a no-op under
//! [`gridkeep_model::EQUALITY_EPSILON`], mutate, bump version, patch.
//! Inventory and equipment instead go through a functional style — clone
//! the current value, run the caller's closure against the clone, and only
//! commit (bump version, patch) if the result differs from the original;
//! on error the clone is simply dropped, leaving the live value untouched.

use std::collections::BTreeMap;

use gridkeep_model::{
    ActorId, Equipment, Facing, GroundItemId, Inventory, InventoryError, Vec2, WorldState,
    EQUALITY_EPSILON,
};
use thiserror::Error;

use crate::journal::Journal;
use crate::patch::{Patch, PatchKind, PatchValue};

/// Failure modes for a write-barrier mutation. All of these are caller
/// errors (bad id, bad value), never journal-internal failures, so they are
/// always safe to ignore-and-count at the command-processing layer rather
/// than propagate to other clients.
#[derive(Debug, Error, PartialEq)]
pub enum MutateError {
    #[error("no player with id {0}")]
    NoSuchPlayer(ActorId),
    #[error("no npc with id {0}")]
    NoSuchNpc(ActorId),
    #[error("no effect with id {0}")]
    NoSuchEffect(gridkeep_model::EffectId),
    #[error("no ground item with id {0}")]
    NoSuchGroundItem(GroundItemId),
    #[error("value is not finite")]
    NonFinite,
    #[error("position {0:?} is outside world bounds")]
    OutOfBounds(Vec2),
    #[error("ground item quantity must be positive; use remove_ground_item for zero")]
    NonPositiveQuantity,
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

fn validate_position(state: &WorldState, position: Vec2) -> Result<(), MutateError> {
    if !position.x.is_finite() || !position.y.is_finite() {
        return Err(MutateError::NonFinite);
    }
    let clamped = state.bounds.clamp(position);
    if !clamped.approx_eq(position, EQUALITY_EPSILON) {
        return Err(MutateError::OutOfBounds(position));
    }
    Ok(())
}

/// Normalises an intent vector to unit length when its magnitude exceeds 1,
/// per the validation step every intent mutation must apply.
fn normalize_intent(intent: Vec2) -> Vec2 {
    let magnitude = intent.distance(Vec2::ZERO);
    if magnitude > 1.0 {
        intent.scale(1.0 / magnitude)
    } else {
        intent
    }
}

/// Updates a player's position if it differs from the current one beyond
/// epsilon.
pub fn set_player_position(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: ActorId,
    position: Vec2,
) -> Result<(), MutateError> {
    validate_position(state, position)?;
    let player = state
        .players
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchPlayer(id.clone()))?;
    if player.core.position.approx_eq(position, EQUALITY_EPSILON) {
        return Ok(());
    }
    player.core.position = position;
    player.core.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::PlayerPos,
        value: PatchValue::Position(position),
        tick,
        version: player.core.version,
    });
    Ok(())
}

/// Updates an NPC's position if it differs from the current one beyond
/// epsilon.
pub fn set_npc_position(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: ActorId,
    position: Vec2,
) -> Result<(), MutateError> {
    validate_position(state, position)?;
    let npc = state
        .npcs
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchNpc(id.clone()))?;
    if npc.core.position.approx_eq(position, EQUALITY_EPSILON) {
        return Ok(());
    }
    npc.core.position = position;
    npc.core.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::NpcPos,
        value: PatchValue::Position(position),
        tick,
        version: npc.core.version,
    });
    Ok(())
}

/// Updates a player's facing.
pub fn set_player_facing(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: ActorId,
    facing: Facing,
) -> Result<(), MutateError> {
    let player = state
        .players
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchPlayer(id.clone()))?;
    if player.core.facing == facing {
        return Ok(());
    }
    player.core.facing = facing;
    player.core.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::PlayerFacing,
        value: PatchValue::Facing(facing),
        tick,
        version: player.core.version,
    });
    Ok(())
}

/// Updates an NPC's facing.
pub fn set_npc_facing(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: ActorId,
    facing: Facing,
) -> Result<(), MutateError> {
    let npc = state
        .npcs
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchNpc(id.clone()))?;
    if npc.core.facing == facing {
        return Ok(());
    }
    npc.core.facing = facing;
    npc.core.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::NpcFacing,
        value: PatchValue::Facing(facing),
        tick,
        version: npc.core.version,
    });
    Ok(())
}

/// Updates a player's movement intent, normalising magnitude to at most 1.
/// `None` clears the intent (the player has stopped issuing input).
pub fn set_player_intent(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: ActorId,
    intent: Option<Vec2>,
) -> Result<(), MutateError> {
    if let Some(raw) = intent {
        if !raw.x.is_finite() || !raw.y.is_finite() {
            return Err(MutateError::NonFinite);
        }
    }
    let normalized = intent.map(normalize_intent);
    let player = state
        .players
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchPlayer(id.clone()))?;
    let unchanged = match (player.intent, normalized) {
        (Some(before), Some(after)) => before.approx_eq(after, EQUALITY_EPSILON),
        (None, None) => true,
        _ => false,
    };
    if unchanged {
        return Ok(());
    }
    player.intent = normalized;
    player.core.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::PlayerIntent,
        value: PatchValue::Intent(normalized),
        tick,
        version: player.core.version,
    });
    Ok(())
}

/// Sets a player's health, clamped to `[0, max_health]`.
pub fn set_player_health(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: ActorId,
    health: f64,
) -> Result<(), MutateError> {
    if !health.is_finite() {
        return Err(MutateError::NonFinite);
    }
    let player = state
        .players
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchPlayer(id.clone()))?;
    let clamped = health.clamp(0.0, player.core.max_health);
    if (player.core.health - clamped).abs() <= EQUALITY_EPSILON {
        return Ok(());
    }
    player.core.health = clamped;
    player.core.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::PlayerHealth,
        value: PatchValue::Health(clamped),
        tick,
        version: player.core.version,
    });
    Ok(())
}

/// Sets an NPC's health, clamped to `[0, max_health]`.
pub fn set_npc_health(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: ActorId,
    health: f64,
) -> Result<(), MutateError> {
    if !health.is_finite() {
        return Err(MutateError::NonFinite);
    }
    let npc = state
        .npcs
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchNpc(id.clone()))?;
    let clamped = health.clamp(0.0, npc.core.max_health);
    if (npc.core.health - clamped).abs() <= EQUALITY_EPSILON {
        return Ok(());
    }
    npc.core.health = clamped;
    npc.core.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::NpcHealth,
        value: PatchValue::Health(clamped),
        tick,
        version: npc.core.version,
    });
    Ok(())
}

/// Runs `f` against a clone of a player's inventory, committing the result
/// (version bump + patch) only if it differs from the original and `f`
/// succeeded. On error, or on a no-op result, the live inventory is
/// untouched.
pub fn mutate_player_inventory<F>(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: ActorId,
    f: F,
) -> Result<(), MutateError>
where
    F: FnOnce(&mut Inventory) -> Result<(), InventoryError>,
{
    let player = state
        .players
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchPlayer(id.clone()))?;
    let before = player.core.inventory.clone();
    let mut candidate = before.clone();
    f(&mut candidate)?;
    if candidate == before {
        return Ok(());
    }
    player.core.inventory = candidate.clone();
    player.core.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::PlayerInventory,
        value: PatchValue::Inventory(candidate),
        tick,
        version: player.core.version,
    });
    Ok(())
}

/// Runs `f` against a clone of an NPC's inventory; see
/// [`mutate_player_inventory`].
pub fn mutate_npc_inventory<F>(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: ActorId,
    f: F,
) -> Result<(), MutateError>
where
    F: FnOnce(&mut Inventory) -> Result<(), InventoryError>,
{
    let npc = state
        .npcs
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchNpc(id.clone()))?;
    let before = npc.core.inventory.clone();
    let mut candidate = before.clone();
    f(&mut candidate)?;
    if candidate == before {
        return Ok(());
    }
    npc.core.inventory = candidate.clone();
    npc.core.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::NpcInventory,
        value: PatchValue::Inventory(candidate),
        tick,
        version: npc.core.version,
    });
    Ok(())
}

/// Runs `f` against a clone of a player's equipment, committing the result
/// only if it differs from the original.
pub fn mutate_player_equipment<F>(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: ActorId,
    f: F,
) -> Result<(), MutateError>
where
    F: FnOnce(&mut Equipment),
{
    let player = state
        .players
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchPlayer(id.clone()))?;
    let before = player.core.equipment.clone();
    let mut candidate = before.clone();
    f(&mut candidate);
    if candidate == before {
        return Ok(());
    }
    player.core.equipment = candidate.clone();
    player.core.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::PlayerEquipment,
        value: PatchValue::Equipment(candidate),
        tick,
        version: player.core.version,
    });
    Ok(())
}

/// Runs `f` against a clone of an NPC's equipment; see
/// [`mutate_player_equipment`].
pub fn mutate_npc_equipment<F>(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: ActorId,
    f: F,
) -> Result<(), MutateError>
where
    F: FnOnce(&mut Equipment),
{
    let npc = state
        .npcs
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchNpc(id.clone()))?;
    let before = npc.core.equipment.clone();
    let mut candidate = before.clone();
    f(&mut candidate);
    if candidate == before {
        return Ok(());
    }
    npc.core.equipment = candidate.clone();
    npc.core.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::NpcEquipment,
        value: PatchValue::Equipment(candidate),
        tick,
        version: npc.core.version,
    });
    Ok(())
}

/// Records a player's removal (disconnect or heartbeat timeout). The caller
/// removes the player from `state.players` itself; this only appends the
/// patch that tells subscribers to forget the entity, using the version the
/// player held at the moment of removal.
pub fn emit_player_removed(journal: &mut Journal, tick: u64, id: &ActorId, version: u64) {
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::PlayerRemoved,
        value: PatchValue::Removed,
        tick,
        version,
    });
}

/// Records an NPC's removal (defeat, despawn). The caller removes the NPC
/// from `state.npcs` itself; this only appends the patch that tells
/// subscribers to forget the entity.
pub fn emit_npc_removed(journal: &mut Journal, tick: u64, id: &ActorId, version: u64) {
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::NpcRemoved,
        value: PatchValue::Removed,
        tick,
        version,
    });
}

/// Updates an effect instance's position.
pub fn set_effect_position(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: gridkeep_model::EffectId,
    position: Vec2,
) -> Result<(), MutateError> {
    if !position.x.is_finite() || !position.y.is_finite() {
        return Err(MutateError::NonFinite);
    }
    let effect = state
        .effects
        .get_mut(&id)
        .ok_or(MutateError::NoSuchEffect(id))?;
    if effect.position.approx_eq(position, EQUALITY_EPSILON) {
        return Ok(());
    }
    effect.position = position;
    journal.append_patch(Patch {
        entity_id: id.to_string(),
        kind: PatchKind::EffectPos,
        value: PatchValue::Position(position),
        tick,
        version: effect.next_sequence(),
    });
    Ok(())
}

/// Replaces an effect instance's read-only parameter map.
pub fn set_effect_params(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: gridkeep_model::EffectId,
    params: BTreeMap<String, i64>,
) -> Result<(), MutateError> {
    let effect = state
        .effects
        .get_mut(&id)
        .ok_or(MutateError::NoSuchEffect(id))?;
    if effect.parameters == params {
        return Ok(());
    }
    effect.parameters = params.clone();
    journal.append_patch(Patch {
        entity_id: id.to_string(),
        kind: PatchKind::EffectParams,
        value: PatchValue::Params(params),
        tick,
        version: effect.next_sequence(),
    });
    Ok(())
}

/// Updates a ground item stack's position.
pub fn set_ground_item_position(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: GroundItemId,
    position: Vec2,
) -> Result<(), MutateError> {
    if !position.x.is_finite() || !position.y.is_finite() {
        return Err(MutateError::NonFinite);
    }
    let item = state
        .ground_items
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchGroundItem(id.clone()))?;
    if item.position.approx_eq(position, EQUALITY_EPSILON) {
        return Ok(());
    }
    item.position = position;
    item.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::GroundItemPos,
        value: PatchValue::Position(position),
        tick,
        version: item.version,
    });
    Ok(())
}

/// Updates a ground item stack's quantity. A quantity of zero is rejected;
/// callers should remove the ground item from the world entirely instead
/// (its disappearance from the next keyframe/diff is how clients learn it's
/// gone, rather than a patch).
pub fn set_ground_item_quantity(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    id: GroundItemId,
    quantity: u32,
) -> Result<(), MutateError> {
    if quantity == 0 {
        return Err(MutateError::NonPositiveQuantity);
    }
    let item = state
        .ground_items
        .get_mut(&id)
        .ok_or_else(|| MutateError::NoSuchGroundItem(id.clone()))?;
    if item.stack.quantity == quantity {
        return Ok(());
    }
    item.stack.quantity = quantity;
    item.version += 1;
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::GroundItemQty,
        value: PatchValue::Quantity(quantity),
        tick,
        version: item.version,
    });
    Ok(())
}

/// Records a freshly dropped ground item's initial quantity. Callers insert
/// the `GroundItem` into `state.ground_items` themselves (there's no prior
/// value to diff against, so this skips [`set_ground_item_quantity`]'s
/// no-op-on-unchanged guard) at the item's starting `version`.
pub fn emit_ground_item_spawned(journal: &mut Journal, tick: u64, id: &GroundItemId, quantity: u32, version: u64) {
    journal.append_patch(Patch {
        entity_id: id.as_str().to_owned(),
        kind: PatchKind::GroundItemQty,
        value: PatchValue::Quantity(quantity),
        tick,
        version,
    });
}

#[cfg(test)]
mod tests {
    use gridkeep_model::{
        ActorId, ItemStack, ItemType, Npc, Player, WorldBounds,
    };

    use crate::journal::JournalConfig;

    use super::*;

    fn world_with_player() -> (WorldState, Journal, ActorId) {
        let mut state = WorldState::new(WorldBounds::new(Vec2::ZERO, Vec2::new(100.0, 100.0)));
        let id = ActorId::new("p1");
        state
            .players
            .insert(id.clone(), Player::new(id.clone(), Vec2::ZERO, 20.0, 4));
        (state, Journal::new(JournalConfig::default()), id)
    }

    #[test]
    fn position_below_epsilon_emits_no_patch() {
        let (mut state, mut journal, id) = world_with_player();
        set_player_position(&mut state, &mut journal, 1, id.clone(), Vec2::new(1e-7, 0.0))
            .expect("within bounds");
        assert!(!journal.has_pending_patches());
    }

    #[test]
    fn health_clamps_to_range() {
        let (mut state, mut journal, id) = world_with_player();
        set_player_health(&mut state, &mut journal, 1, id.clone(), 999.0).expect("finite");
        assert_eq!(state.players.get(&id).map(|p| p.core.health), Some(20.0));
        set_player_health(&mut state, &mut journal, 2, id.clone(), -5.0).expect("finite");
        assert_eq!(state.players.get(&id).map(|p| p.core.health), Some(0.0));
    }

    #[test]
    fn intent_magnitude_normalizes() {
        let (mut state, mut journal, id) = world_with_player();
        set_player_intent(&mut state, &mut journal, 1, id.clone(), Some(Vec2::new(3.0, 4.0)))
            .expect("finite");
        let intent = state.players.get(&id).and_then(|p| p.intent).expect("set");
        assert!((intent.x - 0.6).abs() < 1e-9);
        assert!((intent.y - 0.8).abs() < 1e-9);
    }

    #[test]
    fn inventory_mutation_rolls_back_on_error() {
        let (mut state, mut journal, id) = world_with_player();
        let result = mutate_player_inventory(&mut state, &mut journal, 1, id.clone(), |inv| {
            inv.remove_quantity("gold", 1)
        });
        assert!(result.is_err());
        assert!(!journal.has_pending_patches());
        assert_eq!(state.players.get(&id).map(|p| p.core.version), Some(0));
    }

    #[test]
    fn inventory_mutation_commits_on_change() {
        let (mut state, mut journal, id) = world_with_player();
        mutate_player_inventory(&mut state, &mut journal, 1, id.clone(), |inv| {
            inv.add_stack(ItemStack::with_canonical_key(ItemType::new("gold"), 1))
        })
        .expect("has capacity");
        assert_eq!(state.players.get(&id).map(|p| p.core.version), Some(1));
        assert_eq!(journal.drain_patches().len(), 1);
    }

    #[test]
    fn npc_removal_emits_no_patch_itself() {
        let mut state = WorldState::new(WorldBounds::new(Vec2::ZERO, Vec2::new(10.0, 10.0)));
        let id = ActorId::new("goblin-1");
        state.npcs.insert(
            id.clone(),
            Npc::new(
                id.clone(),
                Vec2::ZERO,
                10.0,
                4,
                "goblin",
                gridkeep_model::AiConfigId::new("goblin_patrol"),
            ),
        );
        let mut journal = Journal::new(JournalConfig::default());
        state.npcs.remove(&id);
        assert!(!journal.has_pending_patches());
    }
}
