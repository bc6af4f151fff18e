// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::ids::GroundItemId;
use crate::inventory::ItemStack;

/// Integer tile coordinates, used to key ground items for spatial lookup at
/// tile granularity (e.g. "what's on the ground here") distinct from the
/// continuous position used for rendering and pickup-radius checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub x: i32,
    pub y: i32,
}

impl TileKey {
    /// Builds a tile key from integer coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Quantizes a continuous position to its containing tile, given a
    /// fixed world tile size.
    #[must_use]
    pub fn from_position(position: Vec2, tile_size: f64) -> Self {
        Self::new(
            (position.x / tile_size).floor() as i32,
            (position.y / tile_size).floor() as i32,
        )
    }
}

/// A stack of items dropped in the world, pending pickup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundItem {
    pub id: GroundItemId,
    pub position: Vec2,
    pub tile: TileKey,
    pub stack: ItemStack,
    /// World tick at which this item was dropped, for despawn-after-timeout
    /// policy.
    pub dropped_tick: u64,
    /// Monotonic version, bumped on quantity change (e.g. partial pickup).
    pub version: u64,
}
