// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

/// Per-effect-type counts of cell-capacity overflow observed since the last
/// drain, surfaced as a telemetry anomaly rather than a hard failure: the
/// grid degrades to an unbounded cell rather than dropping an effect, so an
/// overflowing cell costs query time, not correctness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverflowReport {
    by_effect_def: BTreeMap<String, u32>,
}

impl OverflowReport {
    /// Records one overflow event for the given effect definition id.
    pub fn record(&mut self, def_id: &str) {
        *self.by_effect_def.entry(def_id.to_owned()).or_insert(0) += 1;
    }

    /// True if no overflow has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_effect_def.is_empty()
    }

    /// Counts by effect definition id, for telemetry emission.
    #[must_use]
    pub fn counts(&self) -> &BTreeMap<String, u32> {
        &self.by_effect_def
    }

    /// Clears all counts, typically called once per tick after telemetry
    /// has been emitted.
    pub fn clear(&mut self) {
        self.by_effect_def.clear();
    }
}
