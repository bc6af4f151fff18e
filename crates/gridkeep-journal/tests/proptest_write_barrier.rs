// SPDX-License-Identifier: Apache-2.0
//! Property tests for the write-barrier mutators' quantified invariants and
//! boundary behaviours: a patch (and version bump) appears exactly when a
//! field actually changes beyond epsilon, health always clamps into range,
//! and intent is always normalised to at most unit magnitude.
#![allow(missing_docs, clippy::expect_used)]

use gridkeep_journal::{mutate, Journal, JournalConfig, PatchKind};
use gridkeep_model::{ActorId, Player, Vec2, WorldBounds, WorldState, EQUALITY_EPSILON};
use proptest::prelude::*;

const MAX_HEALTH: f64 = 20.0;

fn world_with_player() -> (WorldState, Journal, ActorId) {
    let mut state = WorldState::new(WorldBounds::new(Vec2::new(-500.0, -500.0), Vec2::new(500.0, 500.0)));
    let id = ActorId::new("p1");
    state.players.insert(id.clone(), Player::new(id.clone(), Vec2::ZERO, MAX_HEALTH, 4));
    (state, Journal::new(JournalConfig::default()), id)
}

fn finite_small() -> impl Strategy<Value = f64> {
    (-10_000i32..10_000i32).prop_map(|v| f64::from(v) * 0.01)
}

proptest! {
    /// Applies one position write, from a known starting position, and checks
    /// that a patch (with a strictly higher version) appears iff the move
    /// exceeds the epsilon threshold, never otherwise.
    #[test]
    fn position_patch_emitted_iff_beyond_epsilon(dx in finite_small(), dy in finite_small()) {
        let (mut state, mut journal, id) = world_with_player();
        let before_version = state.players.get(&id).map(|p| p.core.version);
        let target = Vec2::new(dx, dy);
        mutate::set_player_position(&mut state, &mut journal, 1, id.clone(), target)
            .expect("within bounds and finite");
        let after_version = state.players.get(&id).map(|p| p.core.version);
        let moved = target.distance(Vec2::ZERO) > EQUALITY_EPSILON;

        prop_assert_eq!(journal.has_pending_patches(), moved);
        if moved {
            prop_assert!(after_version > before_version);
            let patches = journal.drain_patches();
            let position_patches: Vec<_> = patches.iter().filter(|p| p.kind == PatchKind::PlayerPos).collect();
            prop_assert_eq!(position_patches.len(), 1);
        } else {
            prop_assert_eq!(after_version, before_version);
        }
    }

    /// Health always clamps into `[0, max_health]` no matter what raw value
    /// is requested.
    #[test]
    fn health_always_clamps_into_range(requested in -10_000.0f64..10_000.0) {
        let (mut state, mut journal, id) = world_with_player();
        mutate::set_player_health(&mut state, &mut journal, 1, id.clone(), requested).expect("finite");
        let health = state.players.get(&id).map(|p| p.core.health).expect("player present");
        prop_assert!((0.0..=MAX_HEALTH).contains(&health));
        if requested > MAX_HEALTH {
            prop_assert!((health - MAX_HEALTH).abs() < 1e-9);
        } else if requested < 0.0 {
            prop_assert!(health.abs() < 1e-9);
        }
    }

    /// Intent is stored verbatim under unit magnitude, and scaled down to
    /// exactly unit magnitude otherwise; it is never left with magnitude
    /// greater than one.
    #[test]
    fn intent_never_exceeds_unit_magnitude(x in -100.0f64..100.0, y in -100.0f64..100.0) {
        let (mut state, mut journal, id) = world_with_player();
        let raw = Vec2::new(x, y);
        mutate::set_player_intent(&mut state, &mut journal, 1, id.clone(), Some(raw)).expect("finite");
        let stored = state
            .players
            .get(&id)
            .and_then(|p| p.intent)
            .expect("a Some(..) write always leaves intent Some(..)");
        let magnitude = stored.distance(Vec2::ZERO);
        prop_assert!(magnitude <= 1.0 + 1e-9);
        let raw_magnitude = raw.distance(Vec2::ZERO);
        if raw_magnitude <= 1.0 {
            prop_assert!((stored.x - raw.x).abs() < 1e-9);
            prop_assert!((stored.y - raw.y).abs() < 1e-9);
        }
    }
}
