// SPDX-License-Identifier: Apache-2.0
//! A bare multi-player world state, and a small builder for assembling
//! scenario-specific variants of it.

use gridkeep_model::{ActorId, Npc, Player, Vec2, WorldState};

use crate::default_bounds;

/// Builds a [`WorldState`] with two players, `"p1"` at the origin and
/// `"p2"` ten units to the east, and nothing else.
#[must_use]
pub fn two_player_world_state() -> WorldState {
    TestWorldBuilder::new().with_player("p1", Vec2::ZERO).with_player("p2", Vec2::new(10.0, 0.0)).build()
}

/// Builder for a [`WorldState`] fixture: start from [`Self::new`] (empty,
/// default bounds) and add players/NPCs as the scenario needs.
///
/// ```
/// use gridkeep_testkit::TestWorldBuilder;
/// use gridkeep_model::Vec2;
///
/// let state = TestWorldBuilder::new().with_player("p1", Vec2::ZERO).build();
/// assert_eq!(state.players.len(), 1);
/// ```
pub struct TestWorldBuilder {
    state: WorldState,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorldBuilder {
    /// Starts from an empty world at [`default_bounds`].
    #[must_use]
    pub fn new() -> Self {
        Self { state: WorldState::new(default_bounds()) }
    }

    /// Adds a full-health player at `position`, default inventory capacity.
    #[must_use]
    pub fn with_player(mut self, id: &str, position: Vec2) -> Self {
        let id = ActorId::new(id);
        self.state.players.insert(id.clone(), Player::new(id, position, 100.0, 20));
        self
    }

    /// Inserts a pre-built NPC (e.g. from
    /// [`crate::goblin_patrol::goblin_patrol_npc`]).
    #[must_use]
    pub fn with_npc(mut self, npc: Npc) -> Self {
        self.state.npcs.insert(npc.core.id.clone(), npc);
        self
    }

    /// Finishes the build.
    #[must_use]
    pub fn build(self) -> WorldState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_player_world_has_two_distinct_players() {
        let state = two_player_world_state();
        assert_eq!(state.players.len(), 2);
        assert_eq!(state.players.get(&ActorId::new("p1")).map(|p| p.core.position), Some(Vec2::ZERO));
        assert_eq!(
            state.players.get(&ActorId::new("p2")).map(|p| p.core.position),
            Some(Vec2::new(10.0, 0.0))
        );
    }

    #[test]
    fn builder_combines_players_and_npcs() {
        let npc = crate::goblin_patrol::goblin_patrol_npc("goblin-1");
        let state = TestWorldBuilder::new().with_player("p1", Vec2::ZERO).with_npc(npc).build();
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.npcs.len(), 1);
    }
}
