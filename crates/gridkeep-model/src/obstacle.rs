// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

use crate::geometry::Aabb;
use crate::ids::ObstacleId;
use crate::inventory::ItemType;

/// How an obstacle interacts with movement and effects. Obstacles are
/// static for the lifetime of a world; there is no write barrier for them
/// because nothing mutates them post-load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Blocks actor movement and projectile travel.
    Solid,
    /// Blocks actor movement but not projectiles (e.g. low cover).
    LowWall,
}

/// The resource a mineable obstacle (a gold ore vein, say) yields to an
/// actor whose melee swing overlaps it. The obstacle itself never depletes;
/// only its yield is modeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineableResource {
    pub item_type: ItemType,
    pub yield_per_hit: u32,
}

/// A static collidable feature of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub bounds: Aabb,
    pub kind: ObstacleKind,
    /// `Some` for the subset of obstacles (gold ore etc.) that award an
    /// item to whoever lands a melee swing against their bounds.
    #[serde(default)]
    pub mineable: Option<MineableResource>,
}
