// SPDX-License-Identifier: Apache-2.0
//! The fixed-tick world step: the ten-stage body that turns one tick's
//! drained commands into the next world state.

use std::collections::BTreeMap;
use std::time::Instant;

use gridkeep_ai::tick_npc;
use gridkeep_journal::{mutate, PatchKind};
use gridkeep_model::{ActorId, EffectShape, Facing, PathGoal, Vec2};
use tracing::{info, warn};

use crate::command::{Command, CommandEnvelope};
use crate::effects::EffectIntent;
use crate::movement;
use crate::world::{World, NPC_SPEED_PER_SEC, PLAYER_PATH_ARRIVE_RADIUS, PLAYER_SPEED_PER_SEC};

/// A disconnected/timed-out player is only declared dead after this many
/// missed heartbeat intervals, matching the distilled requirement's
/// `now - lastHeartbeat > 3 x heartbeatInterval` rule.
pub const HEARTBEAT_TIMEOUT_MULTIPLIER: u64 = 3;

/// Summary of one completed tick, returned to the caller (the hub) for
/// telemetry and for deciding whether a broadcast round is due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// The tick just completed.
    pub tick: u64,
    /// Wall-clock time the step took to run.
    pub duration: std::time::Duration,
    /// Commands drained and applied this tick.
    pub commands_applied: usize,
    /// Effect instances spawned this tick.
    pub effects_spawned: u32,
    /// Effect instances ended this tick.
    pub effects_ended: u32,
    /// NPCs garbage-collected this tick (health reached zero).
    pub npcs_removed: usize,
    /// Players disconnected this tick for missing too many heartbeats.
    pub players_disconnected: usize,
}

/// Content-defined mapping from an action name to the effect it spawns.
/// The distilled requirement names "a melee swing" as the example action
/// without pinning the full action table; these three cover the kinds the
/// effect registry already defines.
struct ActionSpec {
    def_id: &'static str,
    shape: EffectShape,
    health_delta: i64,
    lifetime_ticks: Option<u32>,
    projectile_speed_per_tick: Option<f64>,
    spawn_offset: f64,
}

fn action_spec(name: &str) -> Option<ActionSpec> {
    match name {
        "melee_swing" => Some(ActionSpec {
            def_id: "melee_swing",
            shape: EffectShape::Circle { radius: 0.9 },
            health_delta: -4,
            lifetime_ticks: Some(2),
            projectile_speed_per_tick: None,
            spawn_offset: 0.6,
        }),
        "fire_arrow" => Some(ActionSpec {
            def_id: "arrow_projectile",
            shape: EffectShape::Circle { radius: 0.25 },
            health_delta: -3,
            lifetime_ticks: None,
            projectile_speed_per_tick: Some(1.5),
            spawn_offset: 0.5,
        }),
        "ignite" => Some(ActionSpec {
            def_id: "burning_status",
            shape: EffectShape::Circle { radius: 0.2 },
            health_delta: -1,
            lifetime_ticks: Some(60),
            projectile_speed_per_tick: None,
            spawn_offset: 0.3,
        }),
        _ => None,
    }
}

fn facing_unit_vector(facing: Facing) -> Vec2 {
    match facing {
        Facing::North => Vec2::new(0.0, -1.0),
        Facing::South => Vec2::new(0.0, 1.0),
        Facing::East => Vec2::new(1.0, 0.0),
        Facing::West => Vec2::new(-1.0, 0.0),
    }
}

impl World {
    /// Runs one tick: drains commands, runs AI and movement, drives the
    /// effect lifecycle, garbage-collects defeated NPCs, and times out
    /// unresponsive players. Mutation errors from a malformed or stale
    /// command are logged and skipped rather than propagated — a single
    /// bad command must never stall the simulation for everyone else.
    pub fn step(&mut self) -> TickReport {
        let started = Instant::now();
        let tick = self.state.tick + 1;

        let envelopes = self.commands.drain_ordered();
        let commands_applied = envelopes.len();
        for envelope in envelopes {
            self.apply_command(tick, envelope);
        }

        let mut move_targets: BTreeMap<ActorId, Vec2> = BTreeMap::new();
        let npc_ids: Vec<ActorId> = self.state.npcs.keys().cloned().collect();
        for npc_id in npc_ids {
            match tick_npc(
                &mut self.state,
                &mut self.journal,
                tick,
                &self.ai_library,
                npc_id.clone(),
                self.stuck_cfg,
            ) {
                Ok(Some(target)) => {
                    move_targets.insert(npc_id, target);
                }
                Ok(None) => {}
                Err(err) => warn!(npc_id = %npc_id, error = %err, "ai tick failed"),
            }
        }

        let player_speed_per_tick = PLAYER_SPEED_PER_SEC / self.tick_rate_hz;
        let npc_speed_per_tick = NPC_SPEED_PER_SEC / self.tick_rate_hz;
        if let Err(err) = movement::integrate_players(
            &mut self.state,
            &mut self.journal,
            tick,
            player_speed_per_tick,
            PLAYER_PATH_ARRIVE_RADIUS,
        ) {
            warn!(error = %err, "player movement integration failed");
        }
        if let Err(err) = movement::integrate_npcs(
            &mut self.state,
            &mut self.journal,
            tick,
            npc_speed_per_tick,
            &move_targets,
        ) {
            warn!(error = %err, "npc movement integration failed");
        }

        let effects_spawned = self.effects.instantiate_queued(
            &mut self.state,
            &mut self.journal,
            &mut self.spatial,
            &mut self.overflow,
            &mut self.next_effect_id,
            tick,
        );
        self.effects
            .run_updates(&mut self.state, &mut self.journal, &mut self.spatial, &mut self.overflow, tick);
        let effects_ended = self
            .effects
            .evaluate_end_policies(&mut self.state, &mut self.journal, &mut self.spatial, tick);

        let npcs_removed = self.collect_defeated_npcs(tick);
        let players_disconnected = self.disconnect_timed_out_players(tick);

        self.state.tick = tick;
        let duration = started.elapsed();
        if self.config.debug_telemetry {
            tracing::debug!(
                tick,
                ?duration,
                commands_applied,
                effects_spawned,
                effects_ended,
                npcs_removed,
                players_disconnected,
                "tick complete"
            );
        }

        TickReport {
            tick,
            duration,
            commands_applied,
            effects_spawned,
            effects_ended,
            npcs_removed,
            players_disconnected,
        }
    }

    fn apply_command(&mut self, tick: u64, envelope: CommandEnvelope) {
        let actor_id = envelope.actor_id;
        match envelope.command {
            Command::Move { intent, facing } => {
                if let Err(err) =
                    mutate::set_player_intent(&mut self.state, &mut self.journal, tick, actor_id.clone(), Some(intent))
                {
                    warn!(actor_id = %actor_id, error = %err, "move command rejected");
                    return;
                }
                if let Some(facing) = facing {
                    if let Err(err) =
                        mutate::set_player_facing(&mut self.state, &mut self.journal, tick, actor_id.clone(), facing)
                    {
                        warn!(actor_id = %actor_id, error = %err, "facing update rejected");
                    }
                }
                self.touch_last_input(&actor_id, tick);
            }
            Command::Action { name } => {
                self.apply_action(tick, &actor_id, &name);
                self.touch_last_input(&actor_id, tick);
            }
            Command::Heartbeat { rtt_ms, .. } => {
                if let Some(player) = self.state.players.get_mut(&actor_id) {
                    player.last_heartbeat_tick = tick;
                    player.last_rtt_ms = Some(rtt_ms);
                }
            }
            Command::SetPath { target } => {
                let clamped = self.state.bounds.clamp(target);
                if let Some(player) = self.state.players.get_mut(&actor_id) {
                    player.path = Some(PathGoal {
                        waypoints: vec![clamped],
                    });
                }
                self.touch_last_input(&actor_id, tick);
            }
            Command::ClearPath => {
                if let Some(player) = self.state.players.get_mut(&actor_id) {
                    player.path = None;
                }
                self.touch_last_input(&actor_id, tick);
            }
        }
    }

    fn touch_last_input(&mut self, actor_id: &ActorId, tick: u64) {
        if let Some(player) = self.state.players.get_mut(actor_id) {
            player.last_input_tick = tick;
        }
    }

    fn apply_action(&mut self, tick: u64, actor_id: &ActorId, name: &str) {
        let Some(spec) = action_spec(name) else {
            warn!(actor_id = %actor_id, action = name, "unknown action name");
            return;
        };
        let Some((position, velocity)) = self.actor_facing_spawn(actor_id, &spec) else {
            return;
        };
        let mut parameters = BTreeMap::new();
        parameters.insert("healthDelta".to_owned(), spec.health_delta);
        self.effects.queue_intent(EffectIntent {
            def_id: gridkeep_model::EffectDefId::new(spec.def_id),
            owner: actor_id.clone(),
            position,
            shape: spec.shape,
            parameters,
            lifetime_ticks: spec.lifetime_ticks,
            velocity,
        });
        info!(actor_id = %actor_id, action = name, tick, "action triggered effect intent");
    }

    fn actor_facing_spawn(&self, actor_id: &ActorId, spec: &ActionSpec) -> Option<(Vec2, Option<Vec2>)> {
        let (position, facing) = if let Some(player) = self.state.players.get(actor_id) {
            (player.core.position, player.core.facing)
        } else if let Some(npc) = self.state.npcs.get(actor_id) {
            (npc.core.position, npc.core.facing)
        } else {
            return None;
        };
        let direction = facing_unit_vector(facing);
        let spawn_position = position.add(direction.scale(spec.spawn_offset));
        let velocity = spec
            .projectile_speed_per_tick
            .map(|speed| direction.scale(speed));
        Some((spawn_position, velocity))
    }

    fn collect_defeated_npcs(&mut self, tick: u64) -> usize {
        let dead: Vec<(ActorId, u64)> = self
            .state
            .npcs
            .iter()
            .filter(|(_, npc)| npc.core.is_dead())
            .map(|(id, npc)| (id.clone(), npc.core.version))
            .collect();
        for (id, version) in &dead {
            self.state.npcs.remove(id);
            self.journal.discard_patches_for(
                id.as_str(),
                &[PatchKind::NpcPos, PatchKind::NpcFacing, PatchKind::NpcInventory, PatchKind::NpcEquipment],
            );
            mutate::emit_npc_removed(&mut self.journal, tick, id, *version);
            info!(npc_id = %id, tick, "npc removed after defeat");
        }
        dead.len()
    }

    fn disconnect_timed_out_players(&mut self, tick: u64) -> usize {
        let timeout_ticks = self.heartbeat_interval_ticks * HEARTBEAT_TIMEOUT_MULTIPLIER;
        let timed_out: Vec<ActorId> = self
            .state
            .players
            .iter()
            .filter(|(_, player)| tick.saturating_sub(player.last_heartbeat_tick) > timeout_ticks)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &timed_out {
            info!(player_id = %id, tick, "player disconnected: heartbeat timeout");
            self.remove_player(id);
        }
        timed_out.len()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use gridkeep_ai::AiLibrary;
    use gridkeep_config::GridkeepConfig;
    use gridkeep_model::{AiConfigId, Npc, Vec2, WorldBounds};

    use super::*;
    use crate::command::CommandEnvelope;

    fn world() -> World {
        World::new(
            WorldBounds::new(Vec2::ZERO, Vec2::new(50.0, 50.0)),
            AiLibrary::new(),
            GridkeepConfig::default(),
            15.0,
            7,
        )
    }

    #[test]
    fn move_command_advances_player_position_same_tick() {
        let mut w = world();
        let id = ActorId::new("p1");
        w.join_player(id.clone(), Vec2::ZERO).expect("join");
        w.push_command(CommandEnvelope {
            origin_tick: 1,
            actor_id: id.clone(),
            issued_at_ms: 0,
            command: Command::Move {
                intent: Vec2::new(1.0, 0.0),
                facing: None,
            },
        });
        let report = w.step();
        assert_eq!(report.commands_applied, 1);
        let pos = w.state().players.get(&id).expect("player").core.position;
        assert!(pos.x > 0.0, "expected forward movement: {pos:?}");
    }

    #[test]
    fn melee_action_instantiates_and_applies_damage_same_tick() {
        let mut w = world();
        let attacker = ActorId::new("attacker");
        w.join_player(attacker.clone(), Vec2::new(5.0, 5.0)).expect("join");
        w.spawn_npc(Npc::new(
            ActorId::new("goblin"),
            Vec2::new(5.0, 5.6),
            10.0,
            1,
            "goblin",
            AiConfigId::new("patrol"),
        ))
        .expect("spawn npc");
        w.push_command(CommandEnvelope {
            origin_tick: 1,
            actor_id: attacker,
            issued_at_ms: 0,
            command: Command::Action {
                name: "melee_swing".to_owned(),
            },
        });
        let report = w.step();
        assert_eq!(report.effects_spawned, 1, "action applies before the same tick's instantiation drain");
        let health = w.state().npcs.get(&ActorId::new("goblin")).map(|n| n.core.health);
        assert_eq!(health, Some(6.0));
    }

    #[test]
    fn heartbeat_timeout_disconnects_idle_player() {
        let mut w = world();
        let id = ActorId::new("p1");
        w.join_player(id.clone(), Vec2::ZERO).expect("join");
        for _ in 0..(HEARTBEAT_TIMEOUT_MULTIPLIER * 15 + 2) {
            w.step();
        }
        assert!(!w.state().players.contains_key(&id));
    }
}
