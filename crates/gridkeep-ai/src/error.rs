// SPDX-License-Identifier: Apache-2.0
use gridkeep_journal::MutateError;
use gridkeep_model::{ActorId, AiConfigId};
use thiserror::Error;

/// Failure modes for an AI tick. Like [`MutateError`], these are always
/// safe to count and skip rather than propagate to the tick loop.
#[derive(Debug, Error, PartialEq)]
pub enum AiError {
    #[error("no npc with id {0}")]
    NoSuchNpc(ActorId),
    #[error("no ai config registered for id {0:?}")]
    NoSuchConfig(AiConfigId),
    #[error(transparent)]
    Mutate(#[from] MutateError),
}
