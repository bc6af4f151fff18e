// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

use crate::actor::ActorCore;
use crate::geometry::Vec2;
use crate::ids::ActorId;

/// Names an AI config in the process-wide behavior registry (see
/// `gridkeep-ai`). Opaque on purpose: the model crate never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AiConfigId(pub String);

impl AiConfigId {
    /// Builds a config id from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// A single stop on a patrol route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatrolWaypoint {
    /// Target position.
    pub position: Vec2,
    /// Ticks to wait at this waypoint before moving to the next.
    pub dwell_ticks: u32,
}

/// Free-form scratch state for an NPC's behavior state machine. Deliberately
/// untyped past this envelope: each AI config interprets its own keys, so
/// adding a new behavior never requires a model-crate change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blackboard {
    /// Name of the current state in the config's state machine (e.g.
    /// `"move_to_waypoint"`, `"wait"`).
    pub state: String,
    /// Index into the NPC's patrol route, if it has one.
    pub waypoint_index: usize,
    /// World tick at which the AI is next allowed to make a new decision.
    /// Cleared (set to the current tick) to force an immediate re-plan,
    /// which is how stuck detection recovers a wedged NPC.
    pub next_decision_tick: u64,
    /// Position observed the last time stuck detection ran, used to measure
    /// progress between checks.
    pub last_progress_position: Vec2,
    /// Ticks elapsed since `last_progress_position` last changed by more
    /// than `stuck_epsilon`.
    pub ticks_without_progress: u32,
    /// Distance within which a waypoint counts as reached.
    pub arrive_radius: f64,
    /// Minimum displacement between stuck-detection checks to count as
    /// progress.
    pub stuck_epsilon: f64,
}

/// A non-player actor driven by the AI runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    /// Fields shared with [`Player`](crate::Player).
    pub core: ActorCore,
    /// Content archetype, e.g. `"goblin"`. Drives spawn tables and loot, not
    /// interpreted by this crate.
    pub archetype: String,
    /// Which AI config drives this NPC's behavior.
    pub ai_config_id: AiConfigId,
    /// Behavior scratch state.
    pub blackboard: Blackboard,
    /// Patrol route, if the config uses one.
    pub patrol_route: Vec<PatrolWaypoint>,
}

impl Npc {
    /// Builds a fresh NPC at `position`.
    #[must_use]
    pub fn new(
        id: ActorId,
        position: Vec2,
        max_health: f64,
        inventory_capacity: usize,
        archetype: impl Into<String>,
        ai_config_id: AiConfigId,
    ) -> Self {
        Self {
            core: ActorCore::new(id, position, max_health, inventory_capacity),
            archetype: archetype.into(),
            ai_config_id,
            blackboard: Blackboard {
                last_progress_position: position,
                arrive_radius: 0.5,
                stuck_epsilon: 0.1,
                ..Blackboard::default()
            },
            patrol_route: Vec::new(),
        }
    }
}
