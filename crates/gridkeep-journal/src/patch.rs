// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gridkeep_model::{Equipment, Facing, Inventory, Vec2};

/// Which `(entity kind, field)` pair a patch updates.
///
/// One variant per pair, deliberately: a generic "position changed on
/// something" kind would force every consumer to re-derive which table to
/// apply it to from the entity id's shape, which this workspace's ids don't
/// encode. The explicit list mirrors the canonical patch kinds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchKind {
    PlayerPos,
    PlayerFacing,
    PlayerIntent,
    PlayerHealth,
    PlayerInventory,
    PlayerEquipment,
    PlayerRemoved,
    NpcPos,
    NpcFacing,
    NpcHealth,
    NpcInventory,
    NpcEquipment,
    NpcRemoved,
    EffectPos,
    EffectParams,
    GroundItemPos,
    GroundItemQty,
}

/// The new value carried by a patch. Exactly one variant is valid for each
/// [`PatchKind`]; mutators in [`crate::mutate`] are the only code that
/// constructs a `(kind, value)` pair, so the pairing never goes stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatchValue {
    Position(Vec2),
    Facing(Facing),
    Intent(Option<Vec2>),
    Health(f64),
    Inventory(Inventory),
    Equipment(Equipment),
    Params(BTreeMap<String, i64>),
    Quantity(u32),
    /// Carried by [`PatchKind::PlayerRemoved`] and [`PatchKind::NpcRemoved`],
    /// neither of which has a payload beyond the entity id itself.
    Removed,
}

/// A single field-level change to one entity, ready to be broadcast as part
/// of a diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// String form of the affected entity's id (actor, effect, or ground
    /// item).
    pub entity_id: String,
    /// Which field changed.
    pub kind: PatchKind,
    /// Its new value.
    pub value: PatchValue,
    /// World tick at which the change was committed.
    pub tick: u64,
    /// The entity's version after this patch, so a client that already has
    /// a later version can discard a stale, reordered patch.
    pub version: u64,
}
