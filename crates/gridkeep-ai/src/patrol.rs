// SPDX-License-Identifier: Apache-2.0
use gridkeep_model::{Facing, Npc, Vec2};

use crate::behavior::{AiBehavior, AiDecision};

const STATE_MOVE_TO_WAYPOINT: &str = "move_to_waypoint";
const STATE_WAIT: &str = "wait";

/// The reference behaviour: walk a fixed patrol route, pausing at each
/// waypoint for its configured dwell time before moving to the next.
///
/// Two states: `move_to_waypoint` (the default, including on an unset or
/// stuck-cleared blackboard) and `wait`. An NPC with an empty patrol route
/// simply never moves. Arrival radius is read from the NPC's own
/// blackboard, so different NPCs sharing this behaviour can tune it per
/// archetype.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatrolBehavior;

impl AiBehavior for PatrolBehavior {
    fn tick(&self, npc: &mut Npc, tick: u64) -> AiDecision {
        if npc.patrol_route.is_empty() {
            return AiDecision::default();
        }
        if npc.blackboard.waypoint_index >= npc.patrol_route.len() {
            npc.blackboard.waypoint_index = 0;
        }

        if npc.blackboard.state == STATE_WAIT {
            if tick >= npc.blackboard.next_decision_tick {
                npc.blackboard.waypoint_index =
                    (npc.blackboard.waypoint_index + 1) % npc.patrol_route.len();
                npc.blackboard.state = STATE_MOVE_TO_WAYPOINT.to_string();
            }
            return AiDecision::default();
        }

        let waypoint = npc.patrol_route[npc.blackboard.waypoint_index];
        let to_target = waypoint.position.sub(npc.core.position);
        if to_target.distance(Vec2::ZERO) <= npc.blackboard.arrive_radius {
            npc.blackboard.state = STATE_WAIT.to_string();
            npc.blackboard.next_decision_tick = tick + u64::from(waypoint.dwell_ticks);
            AiDecision::default()
        } else {
            npc.blackboard.state = STATE_MOVE_TO_WAYPOINT.to_string();
            let facing = Facing::from_movement(to_target, npc.core.facing);
            AiDecision {
                move_target: Some(waypoint.position),
                facing: Some(facing),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use gridkeep_model::{ActorId, AiConfigId, PatrolWaypoint};

    use super::*;

    fn npc_with_route(route: Vec<PatrolWaypoint>) -> Npc {
        let mut npc = Npc::new(
            ActorId::new("goblin-1"),
            Vec2::ZERO,
            10.0,
            4,
            "goblin",
            AiConfigId::new("goblin_patrol"),
        );
        npc.patrol_route = route;
        npc
    }

    #[test]
    fn moves_toward_first_waypoint() {
        let mut npc = npc_with_route(vec![PatrolWaypoint {
            position: Vec2::new(10.0, 0.0),
            dwell_ticks: 5,
        }]);
        let behavior = PatrolBehavior;
        let decision = behavior.tick(&mut npc, 0);
        assert_eq!(decision.move_target, Some(Vec2::new(10.0, 0.0)));
        assert_eq!(npc.blackboard.state, STATE_MOVE_TO_WAYPOINT);
    }

    #[test]
    fn arriving_transitions_to_wait_then_advances() {
        let mut npc = npc_with_route(vec![
            PatrolWaypoint {
                position: Vec2::ZERO,
                dwell_ticks: 3,
            },
            PatrolWaypoint {
                position: Vec2::new(5.0, 0.0),
                dwell_ticks: 3,
            },
        ]);
        let behavior = PatrolBehavior;

        let decision = behavior.tick(&mut npc, 0);
        assert_eq!(decision.move_target, None);
        assert_eq!(npc.blackboard.state, STATE_WAIT);
        assert_eq!(npc.blackboard.next_decision_tick, 3);

        let decision = behavior.tick(&mut npc, 1);
        assert_eq!(decision.move_target, None);
        assert_eq!(npc.blackboard.state, STATE_WAIT);

        let decision = behavior.tick(&mut npc, 3);
        assert_eq!(npc.blackboard.state, STATE_MOVE_TO_WAYPOINT);
        assert_eq!(npc.blackboard.waypoint_index, 1);
        assert_eq!(decision.move_target, Some(Vec2::new(5.0, 0.0)));
    }

    #[test]
    fn empty_route_never_moves() {
        let mut npc = npc_with_route(vec![]);
        let behavior = PatrolBehavior;
        assert_eq!(behavior.tick(&mut npc, 0), AiDecision::default());
    }
}
