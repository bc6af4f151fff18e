// SPDX-License-Identifier: Apache-2.0
//! Movement & collision, the effect lifecycle pipeline, command ingress, and
//! the fixed-tick world step that ties every other `gridkeep-*` crate
//! together into one authoritative simulation.
//!
//! [`World`] is the aggregate root: it owns the canonical
//! [`gridkeep_model::WorldState`], the write-barrier journal, the effect
//! spatial index, the AI behaviour library, validated runtime configuration,
//! and the seeded RNG. Nothing outside [`World::step`] is permitted to
//! mutate world state — see the crate-level concurrency notes below.
//!
//! **Concurrency.** A `World` is exclusively owned by the tick loop; there
//! is no internal locking here; callers (the `gridkeep-server` hub) own the
//! single `tokio::sync::Mutex<World>` that serialises access between ticks
//! and take a read-only snapshot of `state()` when they need one outside the
//! step itself.

#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]

mod command;
mod effects;
mod movement;
mod registry;
mod tick;
mod world;

pub use command::{Command, CommandEnvelope, CommandQueue};
pub use effects::{EffectIntent, EffectManager};
pub use movement::ACTOR_HALF_EXTENT;
pub use registry::{EffectBehaviorKind, EffectDefinition, EffectRegistry, EndPolicy, ReplicationSpec};
pub use tick::{TickReport, HEARTBEAT_TIMEOUT_MULTIPLIER};
pub use world::{World, WorldError, DEFAULT_TICK_RATE_HZ};

/// Drop scatter radius (world units) for ground items spawned when an actor
/// is defeated. The distilled requirement only specifies "within scatter
/// distance"; fixed here so end-to-end drop scenarios are reproducible.
pub const DROP_SCATTER_RADIUS: f64 = 1.5;

/// Effect definition id for the cosmetic decal spawned on a defeat hit.
pub const BLOOD_DECAL_DEF_ID: &str = "blood_decal";
