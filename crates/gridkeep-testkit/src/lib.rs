// SPDX-License-Identifier: Apache-2.0
//! Shared test doubles and deterministic world fixtures for gridkeep crates.
//!
//! Depends only on [`gridkeep_model`], [`gridkeep_journal`], and
//! [`gridkeep_ai`] — never `gridkeep-sim`, which takes this crate as a
//! dev-dependency to build integration-test worlds from the pieces here.
#![forbid(unsafe_code)]

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

pub mod goblin_patrol;
pub mod journal;
pub mod players;

pub use goblin_patrol::{goblin_patrol_ai_library, goblin_patrol_npc, GOBLIN_PATROL_CONFIG_ID};
pub use journal::scenario_journal;
pub use players::{two_player_world_state, TestWorldBuilder};

use gridkeep_model::{Vec2, WorldBounds};

/// Bounds large enough to hold every fixture in this crate without
/// clamping, so a fixture's asserted positions are never silently altered
/// by the world it's dropped into.
#[must_use]
pub fn default_bounds() -> WorldBounds {
    WorldBounds::new(Vec2::new(0.0, 0.0), Vec2::new(1000.0, 1000.0))
}
