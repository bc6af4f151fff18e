// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

use gridkeep_model::{Aabb, EffectId, Vec2};
use tracing::trace;

use crate::overflow::OverflowReport;

/// A single grid cell's coordinates, packed the same way the cell size is
/// applied: `floor(position / cell_size)` on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub x: i32,
    pub y: i32,
}

impl CellKey {
    fn from_point(point: Vec2, cell_size: f64) -> Self {
        Self {
            x: (point.x / cell_size).floor() as i32,
            y: (point.y / cell_size).floor() as i32,
        }
    }
}

/// A uniform grid index over effect instance AABBs.
///
/// Cells are a soft boundary: a cell holding more than `soft_capacity`
/// entries keeps accepting inserts (nothing is ever rejected or dropped),
/// but each such insert is recorded in the caller-supplied
/// [`OverflowReport`] so an operator can see which effect types are
/// clustering too densely for the configured cell size.
#[derive(Debug)]
pub struct UniformGrid {
    cell_size: f64,
    soft_capacity: usize,
    cells: BTreeMap<CellKey, Vec<EffectId>>,
    occupied_cells: BTreeMap<EffectId, Vec<CellKey>>,
}

impl UniformGrid {
    /// Builds an empty grid. `cell_size` must be positive; `soft_capacity`
    /// is the per-cell entry count above which overflow is reported.
    #[must_use]
    pub fn new(cell_size: f64, soft_capacity: usize) -> Self {
        Self {
            cell_size: cell_size.max(f64::EPSILON),
            soft_capacity,
            cells: BTreeMap::new(),
            occupied_cells: BTreeMap::new(),
        }
    }

    fn cells_for_bounds(&self, bounds: &Aabb) -> Vec<CellKey> {
        let min = CellKey::from_point(bounds.min(), self.cell_size);
        let max = CellKey::from_point(bounds.max(), self.cell_size);
        let mut keys = Vec::with_capacity(((max.x - min.x + 1) * (max.y - min.y + 1)).max(1) as usize);
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                keys.push(CellKey { x, y });
            }
        }
        keys
    }

    /// Inserts or moves an effect instance to the cells covering `bounds`.
    /// Any overflow past `soft_capacity` in a newly touched cell is
    /// recorded against `def_id`.
    pub fn upsert(&mut self, id: EffectId, bounds: &Aabb, def_id: &str, overflow: &mut OverflowReport) {
        self.remove(id);
        let keys = self.cells_for_bounds(bounds);
        for key in &keys {
            let bucket = self.cells.entry(*key).or_default();
            bucket.push(id);
            if bucket.len() > self.soft_capacity {
                trace!(cell_x = key.x, cell_y = key.y, def_id, "spatial cell over soft capacity");
                overflow.record(def_id);
            }
        }
        self.occupied_cells.insert(id, keys);
    }

    /// Removes an effect instance from the index entirely. A no-op if it
    /// wasn't present.
    pub fn remove(&mut self, id: EffectId) {
        if let Some(keys) = self.occupied_cells.remove(&id) {
            for key in keys {
                if let Some(bucket) = self.cells.get_mut(&key) {
                    bucket.retain(|candidate| *candidate != id);
                    if bucket.is_empty() {
                        self.cells.remove(&key);
                    }
                }
            }
        }
    }

    /// Returns every effect instance whose cell set overlaps `bounds`,
    /// deduplicated. Callers still need to test exact AABB overlap
    /// themselves; this only narrows the candidate set.
    #[must_use]
    pub fn query_aabb(&self, bounds: &Aabb) -> Vec<EffectId> {
        let mut seen = Vec::new();
        for key in self.cells_for_bounds(bounds) {
            if let Some(bucket) = self.cells.get(&key) {
                for id in bucket {
                    if !seen.contains(id) {
                        seen.push(*id);
                    }
                }
            }
        }
        seen
    }

    /// Returns every effect instance in the cell containing `point`.
    #[must_use]
    pub fn query_point(&self, point: Vec2) -> Vec<EffectId> {
        let key = CellKey::from_point(point, self.cell_size);
        self.cells.get(&key).cloned().unwrap_or_default()
    }

    /// Number of distinct effect instances currently indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupied_cells.len()
    }

    /// True if no effect instances are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied_cells.is_empty()
    }
}
