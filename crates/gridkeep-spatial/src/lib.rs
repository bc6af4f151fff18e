// SPDX-License-Identifier: Apache-2.0
//! Uniform-grid spatial index over live effect instances.
//!
//! The grid exists to make "which effects are near this point" queries
//! cheap without scanning every live effect every tick. It indexes effect
//! AABBs only — actors and obstacles are few enough per world that the
//! movement stage scans them directly.

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

mod grid;
mod overflow;

pub use grid::{CellKey, UniformGrid};
pub use overflow::OverflowReport;
