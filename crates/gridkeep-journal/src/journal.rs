// SPDX-License-Identifier: Apache-2.0
use std::collections::{BTreeMap, VecDeque};

use gridkeep_config::GridkeepConfig;
use gridkeep_model::{EffectId, WorldState};
use tracing::debug;

use crate::effect_event::{EffectEvent, EffectEventKind};
use crate::keyframe::Keyframe;
use crate::patch::{Patch, PatchKind};

/// Bounds on the journal's retained history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JournalConfig {
    /// Maximum number of keyframes retained at once; the oldest is evicted
    /// first when a new one is recorded past this count.
    pub keyframe_capacity: usize,
    /// A keyframe older than this many ticks is evicted even if capacity
    /// hasn't been reached, so memory doesn't grow on a long-lived world
    /// with an idle subscriber pool.
    pub keyframe_max_age_ticks: u64,
    /// Maximum number of effect events retained in the ledger at once.
    pub effect_event_capacity: usize,
    /// Parts-per-ten-thousand of lost spawn events (evicted before any
    /// subscriber could plausibly have consumed them) past which the
    /// journal latches its resync hint.
    pub resync_threshold_per_ten_thousand: u32,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            keyframe_capacity: 4,
            keyframe_max_age_ticks: 15 * 60,
            effect_event_capacity: 4096,
            resync_threshold_per_ten_thousand: 50,
        }
    }
}

/// Running counters behind the journal's resync hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResyncStats {
    pub total_spawn_events: u64,
    pub lost_spawn_events: u64,
}

impl ResyncStats {
    fn ratio_per_ten_thousand(self) -> u32 {
        if self.total_spawn_events == 0 {
            return 0;
        }
        let ratio = (self.lost_spawn_events as u128 * 10_000) / self.total_spawn_events as u128;
        ratio.min(u128::from(u32::MAX)) as u32
    }
}

/// Per-reason counts of journal entries dropped rather than retained,
/// matching the `journal.drop` telemetry taxonomy: effect events rejected
/// for arriving out of order or with no prior spawn on record, and
/// keyframes evicted for aging out or for ring capacity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JournalDropCounts {
    pub out_of_order: u64,
    pub unknown_id: u64,
    pub expired: u64,
    pub count: u64,
}

/// Patch buffer, keyframe ring, and effect event ledger for one world.
///
/// Owned exclusively by the tick loop; the hub reads drained patches and
/// ledger entries after each tick completes, never concurrently with it (see
/// the crate-level concurrency notes in `gridkeep-sim`).
#[derive(Debug)]
pub struct Journal {
    config: JournalConfig,
    pending_patches: Vec<Patch>,
    keyframes: VecDeque<Keyframe>,
    effect_events: VecDeque<EffectEvent>,
    effect_sequences: BTreeMap<EffectId, u64>,
    resync_stats: ResyncStats,
    resync_hint: bool,
    drop_counts: JournalDropCounts,
    next_keyframe_sequence: u64,
}

impl Journal {
    /// Builds an empty journal with the given retention configuration.
    #[must_use]
    pub fn new(config: JournalConfig) -> Self {
        Self {
            config,
            pending_patches: Vec::new(),
            keyframes: VecDeque::new(),
            effect_events: VecDeque::new(),
            effect_sequences: BTreeMap::new(),
            resync_stats: ResyncStats::default(),
            resync_hint: false,
            drop_counts: JournalDropCounts::default(),
            next_keyframe_sequence: 1,
        }
    }

    /// Appends a patch to the pending buffer. Called only by
    /// [`crate::mutate`] functions.
    pub fn append_patch(&mut self, patch: Patch) {
        self.pending_patches.push(patch);
    }

    /// Drains and returns all patches accumulated since the last call,
    /// leaving the buffer empty. Called once per tick by the broadcast
    /// stage.
    pub fn drain_patches(&mut self) -> Vec<Patch> {
        std::mem::take(&mut self.pending_patches)
    }

    /// True if any patches are pending for the current tick.
    #[must_use]
    pub fn has_pending_patches(&self) -> bool {
        !self.pending_patches.is_empty()
    }

    /// Drops still-pending patches of the given `kinds` for `entity_id`.
    /// Used when garbage collecting a defeated NPC within the same tick it
    /// was removed: a position/facing/inventory/equipment patch for an
    /// entity that no longer exists is pointless to ship, but the health
    /// patch recording the fatal blow (and the removal patch appended
    /// right after this call) must survive the same drain.
    pub fn discard_patches_for(&mut self, entity_id: &str, kinds: &[PatchKind]) {
        self.pending_patches
            .retain(|p| p.entity_id != entity_id || !kinds.contains(&p.kind));
    }

    /// Records a new keyframe under the next sequence number, evicting by
    /// capacity and by age and logging each eviction's reason. Returns a
    /// clone of the keyframe just recorded, for a caller that needs to hand
    /// it to a client immediately (e.g. a fresh join) as well as retain it
    /// in the ring.
    pub fn record_keyframe(
        &mut self,
        tick: u64,
        state: &WorldState,
        config: GridkeepConfig,
        recorded_at_ms: u64,
    ) -> Keyframe {
        let sequence = self.next_keyframe_sequence;
        self.next_keyframe_sequence += 1;
        let keyframe = Keyframe {
            tick,
            sequence,
            config,
            recorded_at_ms,
            state: state.clone(),
        };
        self.keyframes.push_back(keyframe.clone());

        while self.keyframes.len() > self.config.keyframe_capacity {
            if let Some(evicted) = self.keyframes.pop_front() {
                self.drop_counts.count += 1;
                debug!(
                    event = "journal.drop",
                    reason = "count",
                    sequence = evicted.sequence,
                    tick = evicted.tick,
                    "keyframe evicted at ring capacity"
                );
            }
        }
        let cutoff = tick.saturating_sub(self.config.keyframe_max_age_ticks);
        while matches!(self.keyframes.front(), Some(k) if k.tick < cutoff) {
            if let Some(evicted) = self.keyframes.pop_front() {
                self.drop_counts.expired += 1;
                debug!(
                    event = "journal.drop",
                    reason = "expired",
                    sequence = evicted.sequence,
                    tick = evicted.tick,
                    "keyframe evicted for age"
                );
            }
        }

        keyframe
    }

    /// The most recently recorded keyframe, if any.
    #[must_use]
    pub fn latest_keyframe(&self) -> Option<&Keyframe> {
        self.keyframes.back()
    }

    /// Looks up a retained keyframe by its sequence number. A linear scan,
    /// since the ring's capacity is small.
    #[must_use]
    pub fn keyframe_by_sequence(&self, sequence: u64) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.sequence == sequence)
    }

    /// Appends an effect event to the ledger, gated by the per-effect-id
    /// last-seen sequence: an event whose sequence doesn't strictly follow
    /// the stored high-water mark for its id is rejected rather than
    /// appended, and an update/end with no prior spawn on record is
    /// rejected as well. Both are counted by reason and logged.
    ///
    /// Past that gate, evicting the oldest entry past capacity follows: an
    /// evicted `Spawn` event counts against the resync ratio; an evicted
    /// `Update`/`End` does not, since a subscriber that missed only an
    /// update can still recover from the next one, but missing a spawn
    /// entirely orphans every later event for that effect.
    pub fn append_effect_event(&mut self, event: EffectEvent) {
        let is_spawn = matches!(event.kind, EffectEventKind::Spawn { .. });
        let last_seen = self.effect_sequences.get(&event.effect_id).copied();
        match last_seen {
            None if !is_spawn => {
                self.drop_counts.unknown_id += 1;
                self.resync_stats.total_spawn_events += 1;
                self.resync_stats.lost_spawn_events += 1;
                debug!(
                    event = "journal.drop",
                    reason = "unknown_id",
                    effect_id = event.effect_id.raw(),
                    sequence = event.sequence,
                    "effect event dropped: no prior spawn on record"
                );
                self.update_resync_hint();
                return;
            }
            Some(seen) if event.sequence <= seen => {
                self.drop_counts.out_of_order += 1;
                debug!(
                    event = "journal.drop",
                    reason = "out_of_order",
                    effect_id = event.effect_id.raw(),
                    sequence = event.sequence,
                    last_seen = seen,
                    "effect event dropped: sequence did not advance"
                );
                return;
            }
            None | Some(_) => {}
        }

        self.effect_sequences.insert(event.effect_id, event.sequence);
        if is_spawn {
            self.resync_stats.total_spawn_events += 1;
        }
        self.effect_events.push_back(event);
        while self.effect_events.len() > self.config.effect_event_capacity {
            if let Some(evicted) = self.effect_events.pop_front() {
                if matches!(evicted.kind, EffectEventKind::Spawn { .. }) {
                    self.resync_stats.lost_spawn_events += 1;
                }
            }
        }
        self.update_resync_hint();
    }

    /// Per-reason counts of dropped effect events and evicted keyframes,
    /// for the `journal.drop` telemetry taxonomy.
    #[must_use]
    pub fn drop_counts(&self) -> JournalDropCounts {
        self.drop_counts
    }

    fn update_resync_hint(&mut self) {
        let ratio = self.resync_stats.ratio_per_ten_thousand();
        if ratio >= self.config.resync_threshold_per_ten_thousand && !self.resync_hint {
            debug!(
                ratio_per_ten_thousand = ratio,
                threshold = self.config.resync_threshold_per_ten_thousand,
                "journal latching resync hint"
            );
            self.resync_hint = true;
        }
    }

    /// All effect events currently retained in the ledger, oldest first.
    #[must_use]
    pub fn effect_events(&self) -> impl Iterator<Item = &EffectEvent> {
        self.effect_events.iter()
    }

    /// True once the lost-spawn ratio has crossed the configured threshold.
    /// Latched until [`Self::clear_resync_hint`] is called, matching the
    /// "hint stays up until a keyframe actually goes out" contract used by
    /// the hub.
    #[must_use]
    pub fn resync_hint(&self) -> bool {
        self.resync_hint
    }

    /// Clears the resync hint, called by the hub immediately after it has
    /// forced a keyframe to every subscriber.
    pub fn clear_resync_hint(&mut self) {
        self.resync_hint = false;
    }

    /// Current resync bookkeeping, for diagnostics.
    #[must_use]
    pub fn resync_stats(&self) -> ResyncStats {
        self.resync_stats
    }
}

#[cfg(test)]
mod tests {
    use gridkeep_model::{Vec2, WorldBounds};

    use super::*;

    fn empty_state() -> WorldState {
        WorldState::new(WorldBounds::new(Vec2::ZERO, Vec2::new(100.0, 100.0)))
    }

    #[test]
    fn keyframe_ring_evicts_by_capacity() {
        let mut journal = Journal::new(JournalConfig {
            keyframe_capacity: 2,
            ..JournalConfig::default()
        });
        let state = empty_state();
        journal.record_keyframe(1, &state, GridkeepConfig::default(), 0);
        journal.record_keyframe(2, &state, GridkeepConfig::default(), 0);
        journal.record_keyframe(3, &state, GridkeepConfig::default(), 0);
        assert_eq!(journal.keyframes.len(), 2);
        assert_eq!(journal.keyframes.front().map(|k| k.tick), Some(2));
        assert_eq!(journal.drop_counts().count, 1);
    }

    #[test]
    fn keyframe_ring_evicts_by_age() {
        let mut journal = Journal::new(JournalConfig {
            keyframe_capacity: 10,
            keyframe_max_age_ticks: 5,
            ..JournalConfig::default()
        });
        let state = empty_state();
        journal.record_keyframe(1, &state, GridkeepConfig::default(), 0);
        journal.record_keyframe(100, &state, GridkeepConfig::default(), 0);
        assert_eq!(journal.keyframes.len(), 1);
        assert_eq!(journal.latest_keyframe().map(|k| k.tick), Some(100));
        assert_eq!(journal.drop_counts().expired, 1);
    }

    #[test]
    fn keyframe_is_addressable_by_sequence() {
        let mut journal = Journal::new(JournalConfig::default());
        let state = empty_state();
        let first = journal.record_keyframe(1, &state, GridkeepConfig::default(), 0);
        let second = journal.record_keyframe(2, &state, GridkeepConfig::default(), 0);
        assert_ne!(first.sequence, second.sequence);
        assert_eq!(journal.keyframe_by_sequence(first.sequence).map(|k| k.tick), Some(1));
        assert_eq!(journal.keyframe_by_sequence(second.sequence).map(|k| k.tick), Some(2));
        assert!(journal.keyframe_by_sequence(9999).is_none());
    }

    #[test]
    fn effect_event_rejects_out_of_order_and_unknown_id() {
        let mut journal = Journal::new(JournalConfig::default());
        let effect_id = gridkeep_model::EffectId::new(1);
        let spawn = |sequence: u64| EffectEvent {
            effect_id,
            sequence,
            tick: 0,
            kind: EffectEventKind::Spawn {
                def_id: gridkeep_model::EffectDefId::new("test"),
                source: gridkeep_model::ActorId::new("a1"),
                position: Vec2::ZERO,
                shape: gridkeep_model::EffectShape::Circle { radius: 1.0 },
            },
        };
        let update = |sequence: u64| EffectEvent {
            effect_id,
            sequence,
            tick: 0,
            kind: EffectEventKind::Update { position: Vec2::ZERO },
        };

        journal.append_effect_event(update(1));
        assert_eq!(journal.drop_counts().unknown_id, 1);
        assert_eq!(journal.effect_events().count(), 0);

        journal.append_effect_event(spawn(1));
        assert_eq!(journal.effect_events().count(), 1);

        journal.append_effect_event(update(1));
        assert_eq!(journal.drop_counts().out_of_order, 1);
        assert_eq!(journal.effect_events().count(), 1);

        journal.append_effect_event(update(2));
        assert_eq!(journal.effect_events().count(), 2);
    }

    #[test]
    fn resync_hint_latches_past_threshold() {
        let mut journal = Journal::new(JournalConfig {
            effect_event_capacity: 1,
            resync_threshold_per_ten_thousand: 1,
            ..JournalConfig::default()
        });
        assert!(!journal.resync_hint());
        for i in 0..5u64 {
            journal.append_effect_event(EffectEvent {
                effect_id: gridkeep_model::EffectId::new(i),
                sequence: 1,
                tick: i,
                kind: EffectEventKind::Spawn {
                    def_id: gridkeep_model::EffectDefId::new("test"),
                    source: gridkeep_model::ActorId::new("a1"),
                    position: Vec2::ZERO,
                    shape: gridkeep_model::EffectShape::Circle { radius: 1.0 },
                },
            });
        }
        assert!(journal.resync_hint());
        journal.clear_resync_hint();
        assert!(!journal.resync_hint());
    }
}
