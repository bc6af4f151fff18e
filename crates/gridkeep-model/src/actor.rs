// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

use crate::equipment::Equipment;
use crate::geometry::{Facing, Vec2};
use crate::ids::ActorId;
use crate::inventory::Inventory;

/// Distinguishes the two concrete actor kinds sharing an [`ActorCore`].
/// Carried alongside an [`ActorId`] wherever a patch or event needs to name
/// a specific table without an extra lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Npc,
}

/// Fields shared by [`Player`](crate::Player) and [`Npc`](crate::Npc).
///
/// Embedded by composition rather than inheritance, in the usual Rust way:
/// both concrete types hold a `core: ActorCore` and forward the handful of
/// methods that want to be generic over "any actor".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorCore {
    /// World-unique id, stable for the actor's lifetime.
    pub id: ActorId,
    /// Current world position.
    pub position: Vec2,
    /// Current facing.
    pub facing: Facing,
    /// Current health. Never negative; zero means dead but not yet removed.
    pub health: f64,
    /// Health ceiling; `health` is clamped to this by the write barrier.
    pub max_health: f64,
    /// Carried items.
    pub inventory: Inventory,
    /// Worn/wielded items.
    pub equipment: Equipment,
    /// Monotonic version, bumped by every successful write-barrier mutation
    /// touching this actor. Used by clients to detect missed patches.
    pub version: u64,
}

impl ActorCore {
    /// Builds a fresh, full-health actor core at `position`.
    #[must_use]
    pub fn new(id: ActorId, position: Vec2, max_health: f64, inventory_capacity: usize) -> Self {
        Self {
            id,
            position,
            facing: Facing::default(),
            health: max_health,
            max_health,
            inventory: Inventory::with_capacity(inventory_capacity),
            equipment: Equipment::default(),
            version: 0,
        }
    }

    /// True once health has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}
