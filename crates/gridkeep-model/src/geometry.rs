// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

/// A point or displacement in world space.
///
/// World-floats, not tile indices: the spatial grid quantizes these into
/// cells, but the canonical position stored on an entity is continuous.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Easting.
    pub x: f64,
    /// Northing.
    pub y: f64,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Builds a vector from components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance, avoiding a `sqrt` where only ordering
    /// matters.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Component-wise addition.
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise subtraction.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Scales both components by `factor`.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Returns the vector normalized to unit length, or `None` for a
    /// zero-length vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = (self.x * self.x + self.y * self.y).sqrt();
        if len <= f64::EPSILON {
            None
        } else {
            Some(self.scale(1.0 / len))
        }
    }

    /// Returns true if every component is within `epsilon` of `other`'s.
    #[must_use]
    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

/// Axis-aligned bounding box, used for collision sweeps and spatial queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Center of the box.
    pub center: Vec2,
    /// Half-extent along each axis.
    pub half_extent: Vec2,
}

impl Aabb {
    /// Builds a box from a center point and half-extents.
    #[must_use]
    pub const fn new(center: Vec2, half_extent: Vec2) -> Self {
        Self { center, half_extent }
    }

    /// Minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.center.sub(self.half_extent)
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.center.add(self.half_extent)
    }

    /// Returns true if the two boxes overlap, including touching edges as
    /// non-overlapping (strict inequality).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        let a_min = self.min();
        let a_max = self.max();
        let b_min = other.min();
        let b_max = other.max();
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }

    /// Returns true if `point` lies within this box.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        let min = self.min();
        let max = self.max();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Recenters the box at `center`, keeping its extents.
    #[must_use]
    pub fn at(&self, center: Vec2) -> Self {
        Self::new(center, self.half_extent)
    }
}

/// Coarse facing direction used for sprite orientation and directional
/// effect hooks (e.g. a melee swing that only hits in front of the actor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing away from the viewer, north on the map.
    North,
    /// Facing toward the viewer, south on the map. The default when an
    /// input stream never supplies a facing.
    #[default]
    South,
    East,
    West,
}

impl Facing {
    /// Derives a facing from a movement vector, keeping the previous facing
    /// when the vector is too small to be directional.
    #[must_use]
    pub fn from_movement(delta: Vec2, previous: Self) -> Self {
        if delta.x.abs() < f64::EPSILON && delta.y.abs() < f64::EPSILON {
            return previous;
        }
        if delta.x.abs() >= delta.y.abs() {
            if delta.x >= 0.0 {
                Self::East
            } else {
                Self::West
            }
        } else if delta.y >= 0.0 {
            Self::South
        } else {
            Self::North
        }
    }
}
