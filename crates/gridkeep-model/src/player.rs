// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actor::ActorCore;
use crate::geometry::Vec2;
use crate::ids::ActorId;

/// Identifies an ability for cooldown bookkeeping. Opaque and content-driven,
/// like [`ItemType`](crate::ItemType).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityId(pub String);

impl AbilityId {
    /// Builds an ability id from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// A queued multi-tick movement goal, consumed one step at a time by the
/// movement stage of the tick loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathGoal {
    /// Remaining waypoints, nearest first.
    pub waypoints: Vec<Vec2>,
}

/// A connected, human-controlled actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Fields shared with [`Npc`](crate::Npc).
    pub core: ActorCore,
    /// Most recently received movement/action intent, applied by the
    /// movement and effect stages on the next tick.
    pub intent: Option<Vec2>,
    /// Active path-following goal, if the client requested pathing rather
    /// than raw directional input.
    pub path: Option<PathGoal>,
    /// Per-ability cooldown expiry, keyed by ability id, in ticks-remaining.
    pub cooldowns: BTreeMap<AbilityId, u32>,
    /// Tick at which the last input was received, for idle/timeout policy.
    pub last_input_tick: u64,
    /// Tick at which the last heartbeat was received, for liveness checks
    /// independent of gameplay input.
    pub last_heartbeat_tick: u64,
    /// Most recently observed round-trip time, in milliseconds, as reported
    /// by the session layer. Purely informational.
    pub last_rtt_ms: Option<u32>,
    /// Accumulated experience, used for leveling (outside this crate's
    /// scope beyond storage).
    pub experience: u64,
}

impl Player {
    /// Builds a fresh player at `position`.
    #[must_use]
    pub fn new(id: ActorId, position: Vec2, max_health: f64, inventory_capacity: usize) -> Self {
        Self {
            core: ActorCore::new(id, position, max_health, inventory_capacity),
            intent: None,
            path: None,
            cooldowns: BTreeMap::new(),
            last_input_tick: 0,
            last_heartbeat_tick: 0,
            last_rtt_ms: None,
            experience: 0,
        }
    }
}
