// SPDX-License-Identifier: Apache-2.0
//! Movement integration: normalised-direction stepping, world-bounds
//! clamping, and axis-sliding obstacle resolution.

use std::collections::BTreeMap;

use gridkeep_journal::{mutate, Journal, MutateError};
use gridkeep_model::{Aabb, ActorId, Facing, Obstacle, ObstacleId, PathGoal, Vec2, WorldBounds, WorldState};

/// Half-extent used for every actor's collision box. The distilled
/// requirement tests movement against "the actor's half-size" without
/// pinning a number; fixed here so collision sweeps are reproducible.
pub const ACTOR_HALF_EXTENT: Vec2 = Vec2::new(0.4, 0.4);

fn blocked_by_obstacle(obstacles: &BTreeMap<ObstacleId, Obstacle>, candidate: Vec2) -> bool {
    let box_ = Aabb::new(candidate, ACTOR_HALF_EXTENT);
    obstacles.values().any(|o| o.bounds.intersects(&box_))
}

/// Resolves one actor's proposed step from `current` toward `direction`
/// (expected unit length, zero is a no-op) over `distance` world units,
/// sliding along whichever axis avoids an obstacle overlap if the full step
/// is blocked.
#[must_use]
pub fn resolve_step(
    current: Vec2,
    direction: Vec2,
    distance: f64,
    bounds: &WorldBounds,
    obstacles: &BTreeMap<ObstacleId, Obstacle>,
) -> Vec2 {
    if distance <= 0.0 {
        return current;
    }
    let full = bounds.clamp(current.add(direction.scale(distance)));
    if !blocked_by_obstacle(obstacles, full) {
        return full;
    }
    let x_only = bounds.clamp(Vec2::new(full.x, current.y));
    if !blocked_by_obstacle(obstacles, x_only) {
        return x_only;
    }
    let y_only = bounds.clamp(Vec2::new(current.x, full.y));
    if !blocked_by_obstacle(obstacles, y_only) {
        return y_only;
    }
    current
}

/// Integrates movement for every player, preferring an active path goal
/// over raw intent: a player with a path follows it waypoint by waypoint,
/// popping one each time it comes within `path_arrive_radius`, and only
/// falls back to `intent`-driven movement once the path is exhausted or
/// absent. Path mutations bypass the write barrier entirely, the same way
/// heartbeat bookkeeping does, since no patch kind carries a path.
pub fn integrate_players(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    speed_per_tick: f64,
    path_arrive_radius: f64,
) -> Result<(), MutateError> {
    let ids: Vec<ActorId> = state.players.keys().cloned().collect();
    for id in ids {
        let Some(player) = state.players.get(&id) else {
            continue;
        };
        let current = player.core.position;
        let previous_facing = player.core.facing;

        if let Some(path) = player.path.clone() {
            let Some(waypoint) = path.waypoints.first().copied() else {
                if let Some(player) = state.players.get_mut(&id) {
                    player.path = None;
                }
                continue;
            };
            if current.distance(waypoint) <= path_arrive_radius {
                let remaining = path.waypoints[1..].to_vec();
                if let Some(player) = state.players.get_mut(&id) {
                    player.path = if remaining.is_empty() {
                        None
                    } else {
                        Some(PathGoal { waypoints: remaining })
                    };
                }
                continue;
            }
            let Some(direction) = waypoint.sub(current).normalized() else {
                continue;
            };
            let next = resolve_step(current, direction, speed_per_tick, &state.bounds, &state.obstacles);
            mutate::set_player_position(state, journal, tick, id.clone(), next)?;
            let facing = Facing::from_movement(direction, previous_facing);
            mutate::set_player_facing(state, journal, tick, id, facing)?;
            continue;
        }

        let Some(raw_intent) = player.intent else {
            continue;
        };
        let Some(direction) = raw_intent.normalized() else {
            continue;
        };
        let next = resolve_step(current, direction, speed_per_tick, &state.bounds, &state.obstacles);
        mutate::set_player_position(state, journal, tick, id.clone(), next)?;
        let facing = Facing::from_movement(direction, previous_facing);
        mutate::set_player_facing(state, journal, tick, id, facing)?;
    }
    Ok(())
}

/// Integrates movement for every NPC with a pending move target this tick,
/// as decided by the AI stage. `targets` maps NPC id to the world position
/// it wants to move toward; NPCs absent from the map don't move.
pub fn integrate_npcs(
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    speed_per_tick: f64,
    targets: &BTreeMap<ActorId, Vec2>,
) -> Result<(), MutateError> {
    for (id, target) in targets {
        let Some(npc) = state.npcs.get(id) else {
            continue;
        };
        let current = npc.core.position;
        let Some(direction) = target.sub(current).normalized() else {
            continue;
        };
        let next = resolve_step(current, direction, speed_per_tick, &state.bounds, &state.obstacles);
        mutate::set_npc_position(state, journal, tick, id.clone(), next)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use gridkeep_model::{ObstacleKind, WorldBounds};

    use super::*;

    fn bounds() -> WorldBounds {
        WorldBounds::new(Vec2::ZERO, Vec2::new(100.0, 100.0))
    }

    #[test]
    fn unobstructed_step_moves_full_distance() {
        let next = resolve_step(Vec2::ZERO, Vec2::new(1.0, 0.0), 2.0, &bounds(), &BTreeMap::new());
        assert!((next.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn blocked_step_slides_along_open_axis() {
        let mut obstacles = BTreeMap::new();
        obstacles.insert(
            ObstacleId::new("wall"),
            Obstacle {
                id: ObstacleId::new("wall"),
                bounds: Aabb::new(Vec2::new(1.2, 1.6), Vec2::new(0.5, 0.5)),
                kind: ObstacleKind::Solid,
                mineable: None,
            },
        );
        // Diagonal step's full destination overlaps the wall; sliding along
        // x only (keeping y fixed at 0) clears it, so that's what should win.
        let next = resolve_step(Vec2::ZERO, Vec2::new(0.6, 0.8), 2.0, &bounds(), &obstacles);
        assert!((next.x - 1.2).abs() < 1e-9, "expected full x advance: {next:?}");
        assert_eq!(next.y, 0.0, "y should stay put, blocked by the wall: {next:?}");
    }

    #[test]
    fn fully_boxed_in_actor_does_not_move() {
        let mut obstacles = BTreeMap::new();
        for (i, (x, y)) in [(2.0, 0.0), (0.0, 2.0), (-2.0, 0.0), (0.0, -2.0)].iter().enumerate() {
            obstacles.insert(
                ObstacleId::new(format!("wall-{i}")),
                Obstacle {
                    id: ObstacleId::new(format!("wall-{i}")),
                    bounds: Aabb::new(Vec2::new(*x, *y), Vec2::new(1.2, 1.2)),
                    kind: ObstacleKind::Solid,
                    mineable: None,
                },
            );
        }
        let next = resolve_step(Vec2::ZERO, Vec2::new(1.0, 0.0), 2.0, &bounds(), &obstacles);
        assert_eq!(next, Vec2::ZERO);
    }

    #[test]
    fn path_following_takes_priority_over_intent_and_pops_on_arrival() {
        use gridkeep_journal::{Journal, JournalConfig};
        use gridkeep_model::{ActorId, Player, WorldState};

        let mut state = WorldState::new(bounds());
        let id = ActorId::new("p1");
        let mut player = Player::new(id.clone(), Vec2::ZERO, 100.0, 4);
        player.intent = Some(Vec2::new(0.0, -1.0));
        player.path = Some(PathGoal {
            waypoints: vec![Vec2::new(1.0, 0.0)],
        });
        state.players.insert(id.clone(), player);
        let mut journal = Journal::new(JournalConfig::default());

        integrate_players(&mut state, &mut journal, 1, 1.0, 0.5).expect("integrate");
        let pos = state.players.get(&id).expect("player").core.position;
        assert!((pos.x - 1.0).abs() < 1e-9, "expected full advance toward waypoint: {pos:?}");
        assert_eq!(pos.y, 0.0, "path following should ignore the stale intent: {pos:?}");

        integrate_players(&mut state, &mut journal, 2, 1.0, 0.5).expect("integrate");
        let player = state.players.get(&id).expect("player");
        assert!(player.path.is_none(), "waypoint reached within arrive radius should clear the path");
    }
}
