// SPDX-License-Identifier: Apache-2.0
use gridkeep_config::GridkeepConfig;
use gridkeep_model::WorldState;
use serde::{Deserialize, Serialize};

/// A full snapshot of world state at a given tick, broadcast whenever a
/// subscriber joins, requests one, or the journal decides the diff stream
/// has drifted too far to trust.
///
/// Carries its own `sequence` so a client can ask for this exact keyframe
/// again by number (`KeyframeBySequence`), and the `config`/`recorded_at_ms`
/// it was produced under, so a reconnecting client can tell whether the
/// server's retention policy changed since its last view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Tick at which this snapshot was taken.
    pub tick: u64,
    /// Monotonically increasing across every keyframe this journal has ever
    /// recorded, world-unique for the life of the process.
    pub sequence: u64,
    /// The configuration in effect when this snapshot was recorded.
    pub config: GridkeepConfig,
    /// Milliseconds since the Unix epoch at the moment of recording.
    pub recorded_at_ms: u64,
    /// The complete world state at that tick.
    pub state: WorldState,
}
