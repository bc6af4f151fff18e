// SPDX-License-Identifier: Apache-2.0
use gridkeep_model::Npc;

/// Thresholds governing stuck detection. The per-displacement epsilon lives
/// on each NPC's own blackboard (`stuck_epsilon`); this only carries the
/// tick-count threshold, which is a runtime-wide tuning knob rather than
/// per-NPC content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StuckConfig {
    /// Number of consecutive stuck ticks before the corrective action
    /// fires.
    pub stuck_ticks_threshold: u32,
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            stuck_ticks_threshold: 30,
        }
    }
}

/// Checks whether `npc` has made progress since the last check, and if it
/// has been stuck for `cfg.stuck_ticks_threshold` consecutive ticks, clears
/// its blackboard state so the next tick re-plans from scratch — advancing
/// past whatever waypoint it couldn't reach, rather than applying a nudge
/// vector.
pub fn detect_stuck(npc: &mut Npc, tick: u64, cfg: StuckConfig) {
    let moved = npc
        .core
        .position
        .distance(npc.blackboard.last_progress_position);

    if moved >= npc.blackboard.stuck_epsilon {
        npc.blackboard.last_progress_position = npc.core.position;
        npc.blackboard.ticks_without_progress = 0;
        return;
    }

    npc.blackboard.ticks_without_progress = npc.blackboard.ticks_without_progress.saturating_add(1);

    if npc.blackboard.ticks_without_progress >= cfg.stuck_ticks_threshold {
        npc.blackboard.state.clear();
        npc.blackboard.next_decision_tick = tick;
        npc.blackboard.ticks_without_progress = 0;
        npc.blackboard.last_progress_position = npc.core.position;
        if !npc.patrol_route.is_empty() {
            npc.blackboard.waypoint_index =
                (npc.blackboard.waypoint_index + 1) % npc.patrol_route.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use gridkeep_model::{ActorId, AiConfigId, PatrolWaypoint, Vec2};

    use super::*;

    fn stuck_npc() -> Npc {
        let mut npc = Npc::new(
            ActorId::new("goblin-1"),
            Vec2::ZERO,
            10.0,
            4,
            "goblin",
            AiConfigId::new("goblin_patrol"),
        );
        npc.patrol_route = vec![
            PatrolWaypoint {
                position: Vec2::new(100.0, 100.0),
                dwell_ticks: 1,
            },
            PatrolWaypoint {
                position: Vec2::new(0.0, 0.0),
                dwell_ticks: 1,
            },
        ];
        npc.blackboard.state = "move_to_waypoint".to_string();
        npc
    }

    #[test]
    fn progress_resets_counter() {
        let mut npc = stuck_npc();
        let cfg = StuckConfig::default();
        npc.core.position = Vec2::new(1.0, 0.0);
        detect_stuck(&mut npc, 1, cfg);
        assert_eq!(npc.blackboard.ticks_without_progress, 0);
    }

    #[test]
    fn sustained_lack_of_progress_forces_replan() {
        let mut npc = stuck_npc();
        npc.blackboard.stuck_epsilon = 10.0;
        let cfg = StuckConfig {
            stuck_ticks_threshold: 3,
        };
        for tick in 0..3u64 {
            detect_stuck(&mut npc, tick, cfg);
        }
        assert!(npc.blackboard.state.is_empty());
        assert_eq!(npc.blackboard.waypoint_index, 1);
        assert_eq!(npc.blackboard.ticks_without_progress, 0);
    }
}
