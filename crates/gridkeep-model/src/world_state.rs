// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::effect::EffectInstance;
use crate::geometry::Vec2;
use crate::ground_item::GroundItem;
use crate::ids::{ActorId, EffectId, GroundItemId, ObstacleId};
use crate::npc::Npc;
use crate::obstacle::Obstacle;
use crate::player::Player;

/// Fixed extent of the playable world, used to clamp movement and to size
/// the spatial grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldBounds {
    /// Builds bounds from corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Clamps a position into these bounds.
    #[must_use]
    pub fn clamp(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x.clamp(self.min.x, self.max.x),
            position.y.clamp(self.min.y, self.max.y),
        )
    }
}

/// The complete, canonical entity state of a world at a point in time.
///
/// This is pure data: every map here is a `BTreeMap` so that iteration
/// order — and therefore keyframe and diff byte layout — is deterministic
/// given the same contents, independent of insertion history. Nothing in
/// this crate mutates these maps directly outside of construction; mutation
/// is the write barrier's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub bounds: WorldBounds,
    pub tick: u64,
    pub players: BTreeMap<ActorId, Player>,
    pub npcs: BTreeMap<ActorId, Npc>,
    pub obstacles: BTreeMap<ObstacleId, Obstacle>,
    pub ground_items: BTreeMap<GroundItemId, GroundItem>,
    pub effects: BTreeMap<EffectId, EffectInstance>,
}

impl WorldState {
    /// Builds an empty world with the given bounds, tick zero.
    #[must_use]
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            tick: 0,
            players: BTreeMap::new(),
            npcs: BTreeMap::new(),
            obstacles: BTreeMap::new(),
            ground_items: BTreeMap::new(),
            effects: BTreeMap::new(),
        }
    }

    /// True if `id` names either a player or an NPC.
    #[must_use]
    pub fn has_actor(&self, id: ActorId) -> bool {
        self.players.contains_key(&id) || self.npcs.contains_key(&id)
    }
}
