// SPDX-License-Identifier: Apache-2.0
//! [`World`]: the aggregate root tying canonical state, the write-barrier
//! journal, the effect spatial index, the AI library, and runtime
//! configuration into one value the tick loop owns exclusively.

use gridkeep_ai::{AiLibrary, StuckConfig};
use gridkeep_config::GridkeepConfig;
use gridkeep_journal::{Journal, JournalConfig};
use gridkeep_model::{ActorId, Npc, Obstacle, Player, Vec2, WorldBounds, WorldState};
use gridkeep_spatial::{OverflowReport, UniformGrid};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::command::CommandQueue;
use crate::effects::EffectManager;

/// World units a player advances per second of unobstructed movement. The
/// distilled requirement parameterises movement by "speed" without pinning a
/// value; fixed here so two worlds built from the same inputs move
/// identically.
pub const PLAYER_SPEED_PER_SEC: f64 = 4.0;

/// World units an NPC advances per second of unobstructed movement. Fast
/// enough that the reference goblin patrol (a 120-unit leg each way, 10
/// ticks' dwell at each end) completes a full there-and-back-and-wait-again
/// cycle within the 400-tick budget end-to-end scenario 1 steps.
pub const NPC_SPEED_PER_SEC: f64 = 12.0;

/// Distance within which a player following a server-driven path counts a
/// waypoint as reached, mirroring the default used for NPC patrol arrival.
pub const PLAYER_PATH_ARRIVE_RADIUS: f64 = 0.5;

/// Default world tick rate, in Hertz.
pub const DEFAULT_TICK_RATE_HZ: f64 = 15.0;

/// Cell size for the effect spatial grid, in world units. Chosen to hold a
/// handful of typical effect AABBs per cell at the actor/effect scale this
/// world operates at.
const SPATIAL_CELL_SIZE: f64 = 4.0;

/// Soft per-cell capacity before the spatial index starts reporting
/// overflow.
const SPATIAL_SOFT_CAPACITY: usize = 32;

/// Default capacity for a freshly joined player's inventory.
const DEFAULT_PLAYER_INVENTORY_CAPACITY: usize = 20;

/// Failure modes for operations on [`World`] that aren't already covered by
/// [`gridkeep_journal::MutateError`] or [`gridkeep_ai::AiError`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// A join or spawn used an actor id already present in the world.
    #[error("actor id {0} is already in use")]
    DuplicateActorId(ActorId),
}

/// The authoritative simulation state for one world, owned exclusively by
/// the tick loop. See the crate-level docs for the concurrency contract: no
/// lock lives here, because nothing outside [`World::step`] is permitted to
/// touch these fields.
///
/// Doesn't derive `Debug`: [`AiLibrary`] holds `Box<dyn AiBehavior>`
/// trait objects with no `Debug` bound.
pub struct World {
    pub(crate) state: WorldState,
    pub(crate) journal: Journal,
    pub(crate) spatial: UniformGrid,
    pub(crate) overflow: OverflowReport,
    pub(crate) ai_library: AiLibrary,
    pub(crate) config: GridkeepConfig,
    pub(crate) stuck_cfg: StuckConfig,
    pub(crate) commands: CommandQueue,
    pub(crate) effects: EffectManager,
    pub(crate) next_effect_id: u64,
    pub(crate) rng: Pcg32,
    pub(crate) tick_rate_hz: f64,
    pub(crate) heartbeat_interval_ticks: u64,
}

impl World {
    /// Builds a fresh, empty world with no players or NPCs.
    ///
    /// `seed` fixes the RNG stream so that two worlds built with the same
    /// seed, configuration, and command sequence step identically, per the
    /// determinism contract every tick-loop operation must uphold.
    #[must_use]
    pub fn new(
        bounds: WorldBounds,
        ai_library: AiLibrary,
        config: GridkeepConfig,
        tick_rate_hz: f64,
        seed: u64,
    ) -> Self {
        let journal_config = JournalConfig {
            keyframe_capacity: config.keyframe_journal_capacity,
            keyframe_max_age_ticks: ms_to_ticks(config.keyframe_journal_max_age_ms, tick_rate_hz),
            ..JournalConfig::default()
        };
        Self {
            state: WorldState::new(bounds),
            journal: Journal::new(journal_config),
            spatial: UniformGrid::new(SPATIAL_CELL_SIZE, SPATIAL_SOFT_CAPACITY),
            overflow: OverflowReport::default(),
            ai_library,
            config,
            stuck_cfg: StuckConfig::default(),
            commands: CommandQueue::new(),
            effects: EffectManager::new(),
            next_effect_id: 1,
            rng: Pcg32::seed_from_u64(seed),
            tick_rate_hz,
            heartbeat_interval_ticks: hz_to_ticks(tick_rate_hz),
        }
    }

    /// Read-only view of the canonical entity state, for snapshotting and
    /// keyframe construction.
    #[must_use]
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// The world's current tick counter.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    /// Ticks between expected client heartbeats, derived from the tick
    /// rate at construction. The hub reuses this as the keyframe
    /// force-broadcast cadence.
    #[must_use]
    pub fn heartbeat_interval_ticks(&self) -> u64 {
        self.heartbeat_interval_ticks
    }

    /// The journal backing patches, keyframes, and effect events.
    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Spatial index overflow counts accumulated since the last clear.
    #[must_use]
    pub fn overflow(&self) -> &OverflowReport {
        &self.overflow
    }

    /// The configuration this world was constructed with.
    #[must_use]
    pub fn config(&self) -> GridkeepConfig {
        self.config
    }

    /// Mutable access to the journal, for the hub to drain patches and
    /// record keyframes between ticks.
    pub fn journal_mut(&mut self) -> &mut Journal {
        &mut self.journal
    }

    /// Enqueues a client command for the next tick's drain.
    pub fn push_command(&mut self, envelope: crate::command::CommandEnvelope) {
        self.commands.push(envelope);
    }

    /// Adds a new player at `position`, failing if the id is already in use.
    pub fn join_player(&mut self, id: ActorId, position: Vec2) -> Result<(), WorldError> {
        if self.state.has_actor(id.clone()) {
            return Err(WorldError::DuplicateActorId(id));
        }
        let clamped = self.state.bounds.clamp(position);
        self.state.players.insert(
            id.clone(),
            Player::new(id, clamped, 100.0, DEFAULT_PLAYER_INVENTORY_CAPACITY),
        );
        Ok(())
    }

    /// Removes a player from the world, emitting the removal patch.
    /// A no-op if the id isn't a current player.
    pub fn remove_player(&mut self, id: &ActorId) {
        let tick = self.state.tick;
        if let Some(player) = self.state.players.remove(id) {
            gridkeep_journal::mutate::emit_player_removed(&mut self.journal, tick, id, player.core.version);
        }
    }

    /// Spawns an NPC at world-construction time (or via content reload).
    /// Fails if the id is already in use.
    pub fn spawn_npc(&mut self, npc: Npc) -> Result<(), WorldError> {
        if self.state.has_actor(npc.core.id.clone()) {
            return Err(WorldError::DuplicateActorId(npc.core.id));
        }
        self.state.npcs.insert(npc.core.id.clone(), npc);
        Ok(())
    }

    /// Queues an effect intent for instantiation at the next tick's drain.
    pub fn queue_effect_intent(&mut self, intent: crate::effects::EffectIntent) {
        self.effects.queue_intent(intent);
    }

    /// Places a static obstacle at world-construction time (or via content
    /// reload). Obstacles carry no write barrier: nothing mutates them after
    /// load, so there's no duplicate-id check to make here beyond what the
    /// map's own id space already guarantees.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.state.obstacles.insert(obstacle.id.clone(), obstacle);
    }
}

/// Config values arrive in real-world units (milliseconds, Hertz); the
/// journal and heartbeat bookkeeping below want them in ticks. The values in
/// play (journal retention windows, tick rates) are small enough that the
/// `f64` round-trip loses nothing a tick counter would notice.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ms_to_ticks(ms: u64, tick_rate_hz: f64) -> u64 {
    let ticks = (ms as f64 / 1000.0) * tick_rate_hz;
    ticks.round() as u64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hz_to_ticks(tick_rate_hz: f64) -> u64 {
    tick_rate_hz.round() as u64
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use gridkeep_model::WorldBounds;

    use super::*;

    fn world() -> World {
        World::new(
            WorldBounds::new(Vec2::ZERO, Vec2::new(100.0, 100.0)),
            AiLibrary::new(),
            GridkeepConfig::default(),
            DEFAULT_TICK_RATE_HZ,
            42,
        )
    }

    #[test]
    fn join_then_duplicate_join_fails() {
        let mut w = world();
        w.join_player(ActorId::new("p1"), Vec2::ZERO).expect("first join");
        assert!(w.join_player(ActorId::new("p1"), Vec2::ZERO).is_err());
    }

    #[test]
    fn join_clamps_to_bounds() {
        let mut w = world();
        w.join_player(ActorId::new("p1"), Vec2::new(500.0, -50.0)).expect("join");
        let pos = w.state().players.get(&ActorId::new("p1")).map(|p| p.core.position);
        assert_eq!(pos, Some(Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn remove_emits_removal_patch() {
        let mut w = world();
        let id = ActorId::new("p1");
        w.join_player(id.clone(), Vec2::ZERO).expect("join");
        w.remove_player(&id);
        assert!(w.journal().has_pending_patches());
        assert!(!w.state().players.contains_key(&id));
    }
}
