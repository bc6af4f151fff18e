// SPDX-License-Identifier: Apache-2.0
//! Write-barrier mutators and the patch/keyframe/effect-event journal that
//! backs the broadcast layer.
//!
//! Every mutation of client-visible world state that isn't a full
//! entity-add/entity-remove goes through a function in [`mutate`]. Each one
//! follows the same five steps: look the entity up, validate the requested
//! change, skip a no-op change under [`gridkeep_model::EQUALITY_EPSILON`],
//! apply the mutation, bump the entity's version, and append a [`Patch`] to
//! the journal. No other crate is expected to poke these fields directly.

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

mod effect_event;
mod journal;
mod keyframe;
pub mod mutate;
mod patch;
mod replay;

pub use effect_event::{EffectEvent, EffectEventKind};
pub use journal::{Journal, JournalConfig, JournalDropCounts, ResyncStats};
pub use keyframe::Keyframe;
pub use mutate::MutateError;
pub use patch::{Patch, PatchKind, PatchValue};
pub use replay::apply_patches;
