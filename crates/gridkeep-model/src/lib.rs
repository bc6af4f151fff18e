// SPDX-License-Identifier: Apache-2.0
//! Canonical, client-visible data model for the gridkeep simulation core.
//!
//! Every type here is plain data: no mutator on this crate's types performs
//! validation, version bumping, or journaling on its own. Those concerns
//! belong to the write-barrier layer in `gridkeep-journal`, which is the
//! *only* crate permitted to mutate fields gated by this model — see that
//! crate's module docs for the mandatory lookup/validate/equality/mutate/
//! version/journal sequence.

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

mod actor;
mod effect;
mod equipment;
mod geometry;
mod ground_item;
mod ids;
mod inventory;
mod npc;
mod obstacle;
mod player;
mod world_state;

pub use actor::{ActorCore, ActorKind};
pub use effect::{BehaviorState, DeliveryState, EffectInstance, EffectShape};
pub use equipment::{EquipSlot, Equipment, EQUIP_SLOTS};
pub use geometry::{Aabb, Facing, Vec2};
pub use ground_item::{GroundItem, TileKey};
pub use ids::{ActorId, EffectDefId, EffectId, GroundItemId, ObstacleId};
pub use inventory::{
    Inventory, InventoryError, InventorySlot, ItemStack, ItemType, MAX_INVENTORY_SLOTS,
};
pub use npc::{AiConfigId, Blackboard, Npc, PatrolWaypoint};
pub use obstacle::{MineableResource, Obstacle, ObstacleKind};
pub use player::{AbilityId, PathGoal, Player};
pub use world_state::{WorldBounds, WorldState};

/// Epsilon used for float-equality checks on position and health fields, per
/// the write-barrier equality-check step.
pub const EQUALITY_EPSILON: f64 = 1e-6;
