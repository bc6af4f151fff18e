// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;
use crate::ids::{ActorId, EffectDefId, EffectId};

/// Coarse collision geometry for a live effect (a projectile, an area
/// denial zone, a melee swing arc reduced to a circle for hit testing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectShape {
    /// A circle of the given radius centered on the effect's position.
    Circle { radius: f64 },
    /// An axis-aligned rectangle, half-extents given.
    Rect { half_extent: Vec2 },
}

/// How an effect is being delivered to the world, independent of its
/// behavior-specific state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryState {
    /// Just spawned, has not yet run its first update.
    Spawning,
    /// Actively ticking.
    Active,
    /// Finished; will be removed at the end of the current tick after its
    /// end event has been journaled.
    Ending,
}

/// Free-form state owned by an effect's behavior hook between ticks.
///
/// `extra` holds whatever integer-valued scratch a hook needs (bounce
/// counts, pierce counts, a cached target id hashed to an integer, …);
/// `velocity` is a typed convenience for the common projectile case, kept
/// separate from `extra` so hooks that need it don't have to encode floats
/// through an integer map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorState {
    /// Ticks left before this behavior's own internal timer fires,
    /// independent of the instance's `max_age_ticks` end policy (e.g. a
    /// burning status's next damage pulse).
    pub ticks_remaining: Option<u32>,
    /// Current velocity, for projectile-style behaviors.
    pub velocity: Option<Vec2>,
    /// Behavior-defined integer scratch values.
    pub extra: BTreeMap<String, i64>,
}

/// A live instance of an effect definition: a projectile in flight, an
/// active area-denial zone, a one-tick melee hit volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectInstance {
    /// World-unique id for this instance.
    pub id: EffectId,
    /// Which effect definition produced this instance.
    pub def_id: EffectDefId,
    /// The actor that caused this effect to exist, for attribution (e.g.
    /// damage credit, AI aggro).
    pub source: ActorId,
    /// Current position.
    pub position: Vec2,
    /// Current collision geometry.
    pub shape: EffectShape,
    /// Lifecycle state.
    pub delivery: DeliveryState,
    /// Ticks elapsed since spawn.
    pub age_ticks: u32,
    /// Ticks after which this instance ends on its own, if it has a fixed
    /// lifetime. `None` means it ends only when its behavior hook or end
    /// policy says so.
    pub max_age_ticks: Option<u32>,
    /// Read-only parameters supplied by the originating intent (e.g.
    /// `healthDelta`), distinct from the hook's own mutable scratch state.
    pub parameters: BTreeMap<String, i64>,
    /// Monotonically increasing local sequence counter; the next lifecycle
    /// event minted for this instance takes `sequence + 1`.
    pub sequence: u64,
    /// The sequence number of the last lifecycle event actually emitted to
    /// the journal, so a suppressed update (per the definition's
    /// replication spec) doesn't advance the counter needlessly.
    pub last_emitted_sequence: u64,
    /// Behavior-specific mutable state, opaque to everything except the
    /// effect's own hook.
    pub behavior: BehaviorState,
    /// Actors already hit by this instance, for effects that hit each
    /// target at most once (e.g. a melee swing, not a persistent zone).
    pub hit_actors: Vec<ActorId>,
}

impl EffectInstance {
    /// Mints the next sequence number for this instance without recording
    /// it as emitted; callers decide whether the resulting event actually
    /// gets journaled.
    #[must_use]
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}
