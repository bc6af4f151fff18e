// SPDX-License-Identifier: Apache-2.0
//! The effect lifecycle pipeline: intents queued during a tick, drained at a
//! fixed point into live instances, ticked in instance-id order, and retired
//! according to their definition's end policy.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use gridkeep_journal::{mutate, EffectEvent, EffectEventKind, Journal};
use gridkeep_model::{
    ActorId, Aabb, BehaviorState, DeliveryState, EffectDefId, EffectId, EffectInstance,
    EffectShape, EquipSlot, GroundItem, GroundItemId, Inventory, ItemStack, ItemType, Npc,
    ObstacleKind, TileKey, Vec2, WorldState, EQUALITY_EPSILON, EQUIP_SLOTS,
};
use gridkeep_spatial::{OverflowReport, UniformGrid};
use tracing::{info, warn};

use crate::registry::{EffectBehaviorKind, EffectRegistry, EndPolicy, ReplicationSpec};
use crate::{BLOOD_DECAL_DEF_ID, DROP_SCATTER_RADIUS};

/// A request to instantiate an effect, produced by gameplay triggers (a
/// melee swing, a projectile launch, a status rider, a cosmetic trigger)
/// during a tick and drained at a fixed point in the step.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectIntent {
    /// Which effect definition to instantiate.
    pub def_id: EffectDefId,
    /// The actor that caused this effect to exist.
    pub owner: ActorId,
    /// Spawn position.
    pub position: Vec2,
    /// Spawn collision geometry.
    pub shape: EffectShape,
    /// Parameters read-only to the hooks, e.g. `healthDelta`.
    pub parameters: BTreeMap<String, i64>,
    /// Fixed lifetime in ticks, if the definition's end policy is
    /// [`EndPolicy::Duration`].
    pub lifetime_ticks: Option<u32>,
    /// Initial velocity, for projectile-style definitions.
    pub velocity: Option<Vec2>,
}

/// Scatter offsets for ground items dropped on defeat, cycled by drop
/// index. Four fixed directions keep the drop deterministic without
/// needing a RNG draw per item.
const DROP_OFFSETS: [Vec2; 4] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, -1.0),
];

/// Owns the pending intent queue and drives the spawn/update/end pipeline
/// against a [`WorldState`]'s effect table.
#[derive(Debug, Default)]
pub struct EffectManager {
    pending: Vec<EffectIntent>,
}

impl EffectManager {
    /// Builds an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an intent for instantiation at the next drain point.
    pub fn queue_intent(&mut self, intent: EffectIntent) {
        self.pending.push(intent);
    }

    /// Drains queued intents into live instances, running each one's
    /// `on_spawn` hook and emitting a spawn event. Any further intents a
    /// hook raises (e.g. a blood decal on a killing blow) are queued for
    /// the next tick's drain rather than processed immediately, keeping
    /// this pass's instantiation set fixed for the whole tick.
    pub fn instantiate_queued(
        &mut self,
        state: &mut WorldState,
        journal: &mut Journal,
        spatial: &mut UniformGrid,
        overflow: &mut OverflowReport,
        next_effect_id: &mut u64,
        tick: u64,
    ) -> u32 {
        let intents = std::mem::take(&mut self.pending);
        let mut spawned = 0;
        for intent in intents {
            let Some(def) = EffectRegistry::global().get(&intent.def_id) else {
                warn!(def_id = %intent.def_id, "dropping intent for unknown effect definition");
                continue;
            };
            let id = EffectId::new(*next_effect_id);
            *next_effect_id += 1;
            let mut instance = EffectInstance {
                id,
                def_id: intent.def_id.clone(),
                source: intent.owner.clone(),
                position: intent.position,
                shape: intent.shape,
                delivery: DeliveryState::Spawning,
                age_ticks: 0,
                max_age_ticks: intent.lifetime_ticks,
                parameters: intent.parameters,
                sequence: 0,
                last_emitted_sequence: 0,
                behavior: BehaviorState {
                    velocity: intent.velocity,
                    ..BehaviorState::default()
                },
                hit_actors: Vec::new(),
            };

            let bounds = effect_aabb(&instance);
            spatial.upsert(id, &bounds, intent.def_id.as_str(), overflow);

            run_hook(&mut instance, tick, "on_spawn", |instance| {
                dispatch_on_spawn(def.kind, instance, state, journal, tick, &mut self.pending);
            });

            instance.sequence = instance.sequence.max(1);
            instance.last_emitted_sequence = instance.sequence;
            instance.delivery = DeliveryState::Active;
            journal.append_effect_event(EffectEvent {
                effect_id: id,
                sequence: instance.sequence,
                tick,
                kind: EffectEventKind::Spawn {
                    def_id: instance.def_id.clone(),
                    source: instance.source.clone(),
                    position: instance.position,
                    shape: instance.shape,
                },
            });
            state.effects.insert(id, instance);
            spawned += 1;
        }
        spawned
    }

    /// Runs every live instance's `on_update` hook in instance-id order
    /// (the map's natural, deterministic iteration order), emitting update
    /// events per each definition's replication policy.
    pub fn run_updates(
        &mut self,
        state: &mut WorldState,
        journal: &mut Journal,
        spatial: &mut UniformGrid,
        overflow: &mut OverflowReport,
        tick: u64,
    ) {
        let ids: Vec<EffectId> = state.effects.keys().copied().collect();
        for id in ids {
            let Some(mut instance) = state.effects.remove(&id) else {
                continue;
            };
            let Some(def) = EffectRegistry::global().get(&instance.def_id) else {
                state.effects.insert(id, instance);
                continue;
            };
            instance.age_ticks += 1;

            let before = (instance.position, instance.hit_actors.len());
            let panicked = run_hook(&mut instance, tick, "on_update", |instance| {
                dispatch_on_update(def.kind, instance, state, journal, tick, &mut self.pending);
            });
            let changed = panicked || before != (instance.position, instance.hit_actors.len());

            if !panicked {
                let bounds = effect_aabb(&instance);
                spatial.upsert(id, &bounds, instance.def_id.as_str(), overflow);
            }

            if changed && matches!(def.replication, ReplicationSpec::Always) {
                let sequence = instance.next_sequence();
                instance.last_emitted_sequence = sequence;
                journal.append_effect_event(EffectEvent {
                    effect_id: id,
                    sequence,
                    tick,
                    kind: EffectEventKind::Update {
                        position: instance.position,
                    },
                });
            }

            state.effects.insert(id, instance);
        }
    }

    /// Evaluates every live instance's end policy, ending (and purging from
    /// the spatial index) any instance whose policy is satisfied this tick.
    /// Returns the number of instances ended.
    pub fn evaluate_end_policies(
        &mut self,
        state: &mut WorldState,
        journal: &mut Journal,
        spatial: &mut UniformGrid,
        tick: u64,
    ) -> u32 {
        let ids: Vec<EffectId> = state.effects.keys().copied().collect();
        let mut ended = 0;
        for id in ids {
            let Some(mut instance) = state.effects.remove(&id) else {
                continue;
            };
            let Some(def) = EffectRegistry::global().get(&instance.def_id) else {
                continue;
            };
            let owner_gone = !state.has_actor(instance.source.clone());
            let policy_done = match def.end_policy {
                EndPolicy::Duration => instance
                    .max_age_ticks
                    .is_some_and(|max| instance.age_ticks >= max),
                EndPolicy::FirstHit => !instance.hit_actors.is_empty(),
                EndPolicy::OwnerGone => owner_gone,
            };

            if policy_done || owner_gone {
                let reason = if owner_gone && !policy_done {
                    "owner_gone"
                } else {
                    match def.end_policy {
                        EndPolicy::Duration => "duration",
                        EndPolicy::FirstHit => "first_hit",
                        EndPolicy::OwnerGone => "owner_gone",
                    }
                };
                instance.delivery = DeliveryState::Ending;
                let sequence = instance.next_sequence();
                journal.append_effect_event(EffectEvent {
                    effect_id: id,
                    sequence,
                    tick,
                    kind: EffectEventKind::End {
                        reason: reason.to_owned(),
                    },
                });
                spatial.remove(id);
                ended += 1;
            } else {
                state.effects.insert(id, instance);
            }
        }
        ended
    }
}

/// Runs `body` inside [`catch_unwind`], the one place in the tick loop
/// allowed to catch a panic: a content-authored hook must never be able to
/// bring down the simulation. A caught panic is treated as the instance's
/// end-of-life and surfaced as a telemetry anomaly; the instance itself is
/// left in a safe, inert state (age maxed out so the next end-policy pass
/// retires it).
fn run_hook<F>(instance: &mut EffectInstance, tick: u64, hook_name: &'static str, body: F) -> bool
where
    F: FnOnce(&mut EffectInstance),
{
    let result = catch_unwind(AssertUnwindSafe(|| body(instance)));
    if result.is_err() {
        tracing::error!(
            event = "effects.hook_panic",
            effect_id = %instance.id,
            def_id = %instance.def_id,
            hook = hook_name,
            tick,
            "effect hook panicked; retiring instance"
        );
        instance.max_age_ticks = Some(instance.age_ticks);
        true
    } else {
        false
    }
}

fn effect_aabb(instance: &EffectInstance) -> Aabb {
    match instance.shape {
        EffectShape::Circle { radius } => Aabb::new(instance.position, Vec2::new(radius, radius)),
        EffectShape::Rect { half_extent } => Aabb::new(instance.position, half_extent),
    }
}

fn dispatch_on_spawn(
    kind: EffectBehaviorKind,
    instance: &mut EffectInstance,
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    new_intents: &mut Vec<EffectIntent>,
) {
    if let EffectBehaviorKind::MeleeSwing = kind {
        let bounds = effect_aabb(instance);
        for target in overlapping_actor_ids(state, &bounds, &instance.source) {
            let health_delta = instance.parameters.get("healthDelta").copied().unwrap_or(0);
            apply_hit(instance, state, journal, tick, target, health_delta, new_intents);
        }
        mine_overlapping_obstacles(instance, state, journal, tick);
    }
}

/// Awards whoever owns this swing the yield of any mineable obstacle (gold
/// ore etc.) its bounds overlap. Obstacles never deplete, so a swing against
/// one always awards its full `yield_per_hit`, even if the actor's last
/// swing already hit the same obstacle.
fn mine_overlapping_obstacles(instance: &EffectInstance, state: &mut WorldState, journal: &mut Journal, tick: u64) {
    let bounds = effect_aabb(instance);
    let yields: Vec<(ItemType, u32)> = state
        .obstacles
        .values()
        .filter(|obstacle| obstacle.bounds.intersects(&bounds))
        .filter_map(|obstacle| obstacle.mineable.as_ref())
        .filter(|resource| resource.yield_per_hit > 0)
        .map(|resource| (resource.item_type.clone(), resource.yield_per_hit))
        .collect();
    if yields.is_empty() {
        return;
    }

    let owner = instance.source.clone();
    let is_npc = state.npcs.contains_key(&owner);
    for (item_type, yield_per_hit) in yields {
        let stack = ItemStack::with_canonical_key(item_type.clone(), yield_per_hit);
        let result = if is_npc {
            mutate::mutate_npc_inventory(state, journal, tick, owner.clone(), |inventory| inventory.add_stack(stack))
        } else {
            mutate::mutate_player_inventory(state, journal, tick, owner.clone(), |inventory| inventory.add_stack(stack))
        };
        match result {
            Ok(()) => info!(
                event = "economy.gold_dropped",
                actor = %owner,
                item = %item_type.0,
                yield_per_hit,
                "obstacle mined"
            ),
            Err(error) => warn!(
                event = "economy.gold_dropped",
                actor = %owner,
                item = %item_type.0,
                %error,
                outcome = "lost",
                "mined resource lost, inventory has no free slot"
            ),
        }
    }
}

fn dispatch_on_update(
    kind: EffectBehaviorKind,
    instance: &mut EffectInstance,
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    new_intents: &mut Vec<EffectIntent>,
) {
    match kind {
        EffectBehaviorKind::MeleeSwing | EffectBehaviorKind::BloodDecal => {}
        EffectBehaviorKind::Projectile { speed_per_tick } => {
            let velocity = instance
                .behavior
                .velocity
                .and_then(Vec2::normalized)
                .unwrap_or(Vec2::ZERO)
                .scale(speed_per_tick);
            instance.position = instance.position.add(velocity);

            let clamped = state.bounds.clamp(instance.position);
            if !clamped.approx_eq(instance.position, EQUALITY_EPSILON) {
                instance.hit_actors.push(instance.source.clone());
                return;
            }
            let bounds = effect_aabb(instance);
            let blocked = state
                .obstacles
                .values()
                .filter(|o| o.kind == ObstacleKind::Solid)
                .any(|o| o.bounds.intersects(&bounds));
            if blocked {
                instance.hit_actors.push(instance.source.clone());
                return;
            }
            if let Some(target) = overlapping_actor_ids(state, &bounds, &instance.source)
                .into_iter()
                .next()
            {
                let health_delta = instance.parameters.get("healthDelta").copied().unwrap_or(0);
                apply_hit(instance, state, journal, tick, target, health_delta, new_intents);
            }
        }
        EffectBehaviorKind::BurningStatus {
            damage_interval_ticks,
        } => {
            let default_remaining = instance.max_age_ticks.unwrap_or(damage_interval_ticks).max(1);
            let ticks_remaining = instance
                .behavior
                .ticks_remaining
                .get_or_insert(default_remaining);
            *ticks_remaining = ticks_remaining.saturating_sub(1);

            if instance.age_ticks % damage_interval_ticks.max(1) == 0 {
                *instance.behavior.extra.entry("pulses".to_owned()).or_insert(0) += 1;
                let health_delta = instance.parameters.get("healthDelta").copied().unwrap_or(0);
                let source = instance.source.clone();
                apply_hit(instance, state, journal, tick, source, health_delta, new_intents);
            }
        }
    }
}

fn overlapping_actor_ids(state: &WorldState, bounds: &Aabb, exclude: &ActorId) -> Vec<ActorId> {
    let player_ids = state
        .players
        .values()
        .filter(|p| p.core.id != *exclude)
        .filter(|p| bounds.contains_point(p.core.position))
        .map(|p| p.core.id.clone());
    let npc_ids = state
        .npcs
        .values()
        .filter(|n| n.core.id != *exclude)
        .filter(|n| bounds.contains_point(n.core.position))
        .map(|n| n.core.id.clone());
    player_ids.chain(npc_ids).collect()
}

/// Health delta magnitude beyond the representable `f64` mantissa range is
/// not a concern here (damage values are small content-authored integers),
/// so the lossless-enough `i64 -> f64` conversion is explicit and local.
#[allow(clippy::cast_precision_loss)]
fn apply_health_delta(current: f64, delta: i64) -> f64 {
    current + delta as f64
}

/// Applies a hit's damage through the appropriate health write barrier,
/// records the target as already hit, emits combat telemetry, and on an
/// NPC's alive-to-defeated transition queues a blood decal intent and drops
/// its inventory and equipment to the ground. Actual NPC removal from the
/// world happens in the tick loop's garbage-collection stage, once all of a
/// tick's hits have landed.
fn apply_hit(
    instance: &mut EffectInstance,
    state: &mut WorldState,
    journal: &mut Journal,
    tick: u64,
    target: ActorId,
    health_delta: i64,
    new_intents: &mut Vec<EffectIntent>,
) {
    if instance.hit_actors.contains(&target) {
        return;
    }
    instance.hit_actors.push(target.clone());

    let is_npc = state.npcs.contains_key(&target);
    let current_health = if is_npc {
        state.npcs.get(&target).map(|n| n.core.health)
    } else {
        state.players.get(&target).map(|p| p.core.health)
    };
    let Some(current_health) = current_health else {
        return;
    };
    let new_health = apply_health_delta(current_health, health_delta);

    let mutate_result = if is_npc {
        mutate::set_npc_health(state, journal, tick, target.clone(), new_health)
    } else {
        mutate::set_player_health(state, journal, tick, target.clone(), new_health)
    };
    if mutate_result.is_err() {
        return;
    }

    info!(
        event = "combat.damage",
        target = %target,
        health_delta,
        effect_id = %instance.id,
        "applied effect hit"
    );

    if !is_npc {
        return;
    }
    let Some(npc) = state.npcs.get(&target) else {
        return;
    };
    if !npc_is_dead(npc) {
        return;
    }

    info!(event = "combat.defeat", target = %target, "npc defeated");

    new_intents.push(EffectIntent {
        def_id: EffectDefId::new(BLOOD_DECAL_DEF_ID),
        owner: target.clone(),
        position: npc.core.position,
        shape: EffectShape::Circle { radius: 0.25 },
        parameters: BTreeMap::new(),
        lifetime_ticks: Some(1),
        velocity: None,
    });
    drop_inventory_and_equipment(state, journal, target, tick);
}

fn npc_is_dead(npc: &Npc) -> bool {
    npc.core.is_dead()
}

/// Moves a defeated NPC's inventory and equipped items to ground items,
/// bypassing the inventory/equipment write barriers entirely: the NPC is
/// about to be removed from the world this tick, so there's no point
/// versioning its now-empty inventory. A stack merges into an existing
/// ground item on the same tile with the same fungibility key rather than
/// creating a second entry (an NPC can hold the same key both equipped and
/// stacked in its inventory), so the world never carries two ground-item
/// entries for one tile/key pair. Each touched ground item gets its own
/// `ground_item_qty` patch since that's the only wire signal a client has
/// that it exists, or changed, before the next keyframe.
fn drop_inventory_and_equipment(state: &mut WorldState, journal: &mut Journal, target: ActorId, tick: u64) {
    let Some(npc) = state.npcs.get_mut(&target) else {
        return;
    };
    let tile = TileKey::from_position(npc.core.position, 1.0);
    let base_position = npc.core.position;

    let mut stacks: Vec<ItemStack> = npc.core.inventory.slots().iter().flatten().cloned().collect();
    for slot in EQUIP_SLOTS {
        if let Some(stack) = npc.core.equipment.unequip(slot) {
            stacks.push(stack);
        }
    }
    npc.core.inventory = Inventory::with_capacity(npc.core.inventory.capacity());

    for (index, stack) in stacks.into_iter().enumerate() {
        if let Some(existing) = state
            .ground_items
            .values_mut()
            .find(|item| item.tile == tile && item.stack.fungibility_key == stack.fungibility_key)
        {
            existing.stack.quantity += stack.quantity;
            existing.version += 1;
            let id = existing.id.clone();
            let quantity = existing.stack.quantity;
            let version = existing.version;
            mutate::emit_ground_item_spawned(journal, tick, &id, quantity, version);
            continue;
        }

        let offset = DROP_OFFSETS[index % DROP_OFFSETS.len()].scale(DROP_SCATTER_RADIUS * 0.5);
        let position = base_position.add(offset);
        let ground_id = GroundItemId::new(format!("{target}-drop-{index}"));
        let quantity = stack.quantity;
        state.ground_items.insert(
            ground_id.clone(),
            GroundItem {
                id: ground_id.clone(),
                position,
                tile,
                stack,
                dropped_tick: tick,
                version: 0,
            },
        );
        mutate::emit_ground_item_spawned(journal, tick, &ground_id, quantity, 0);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use gridkeep_journal::JournalConfig;
    use gridkeep_model::{AiConfigId, WorldBounds};

    use super::*;

    fn setup() -> (WorldState, Journal, UniformGrid, OverflowReport) {
        (
            WorldState::new(WorldBounds::new(Vec2::ZERO, Vec2::new(100.0, 100.0))),
            Journal::new(JournalConfig::default()),
            UniformGrid::new(4.0, 16),
            OverflowReport::default(),
        )
    }

    #[test]
    fn melee_swing_applies_damage_on_spawn() {
        let (mut state, mut journal, mut spatial, mut overflow) = setup();
        let attacker = ActorId::new("attacker");
        let target = ActorId::new("goblin-1");
        state.npcs.insert(
            target.clone(),
            Npc::new(target.clone(), Vec2::ZERO, 10.0, 4, "goblin", AiConfigId::new("goblin_patrol")),
        );

        let mut manager = EffectManager::new();
        let mut params = BTreeMap::new();
        params.insert("healthDelta".to_owned(), -4);
        manager.queue_intent(EffectIntent {
            def_id: EffectDefId::new("melee_swing"),
            owner: attacker,
            position: Vec2::ZERO,
            shape: EffectShape::Circle { radius: 1.0 },
            parameters: params,
            lifetime_ticks: Some(1),
            velocity: None,
        });

        let mut next_id = 1;
        manager.instantiate_queued(&mut state, &mut journal, &mut spatial, &mut overflow, &mut next_id, 1);

        assert_eq!(state.npcs.get(&target).map(|n| n.core.health), Some(6.0));
    }

    #[test]
    fn defeat_drops_inventory_and_equipment() {
        let (mut state, ..) = setup();
        let target = ActorId::new("goblin-1");
        let mut npc = Npc::new(target.clone(), Vec2::new(10.0, 10.0), 10.0, 4, "goblin", AiConfigId::new("goblin_patrol"));
        npc.core
            .inventory
            .add_stack(ItemStack::with_canonical_key(gridkeep_model::ItemType::new("gold"), 3))
            .expect("capacity");
        npc.core.equipment.equip(
            EquipSlot::MainHand,
            ItemStack::with_canonical_key(gridkeep_model::ItemType::new("rusty_dagger"), 1),
        );
        state.npcs.insert(target.clone(), npc);
        let mut journal = Journal::new(JournalConfig::default());

        drop_inventory_and_equipment(&mut state, &mut journal, target.clone(), 1);

        assert!(state.npcs.get(&target).is_some_and(|n| n.core.inventory.slot(0).is_none()));
        assert_eq!(state.ground_items.len(), 2);
        assert_eq!(journal.drain_patches().len(), 2);
    }
}
