// SPDX-License-Identifier: Apache-2.0
//! A journal fixture with retention settings loose enough that scenario
//! tests spanning hundreds of ticks never lose a keyframe or effect event
//! to eviction mid-run.

use gridkeep_journal::{Journal, JournalConfig};

/// Builds a [`Journal`] with a generous keyframe/effect-event retention
/// window, suitable for multi-hundred-tick scenario tests.
#[must_use]
pub fn scenario_journal() -> Journal {
    Journal::new(JournalConfig {
        keyframe_capacity: 16,
        keyframe_max_age_ticks: 10_000,
        effect_event_capacity: 65_536,
        resync_threshold_per_ten_thousand: 50,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_no_pending_patches() {
        assert!(!scenario_journal().has_pending_patches());
    }
}
