// SPDX-License-Identifier: Apache-2.0
//! Effect definitions as a tagged capability set, not inheritance, and the
//! process-wide immutable registry that holds them.
//!
//! An [`EffectDefinition`] bundles the handful of things content needs to
//! say about an effect: what it *is* (melee swing, projectile, status,
//! decal — [`EffectBehaviorKind`]), when it ends ([`EndPolicy`]), and
//! whether its updates are worth replicating every tick
//! ([`ReplicationSpec`]). The lifecycle hooks themselves live in
//! [`crate::effects`], dispatched by matching on the kind, exactly the way
//! the distilled design calls for "tagged variants... not inheritance".

use std::collections::BTreeMap;
use std::sync::OnceLock;

use gridkeep_model::EffectDefId;

/// What kind of lifecycle behaviour an effect definition has.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectBehaviorKind {
    /// Instantaneous melee hit: applies damage to overlapping actors on
    /// spawn, nothing on update.
    MeleeSwing,
    /// A moving projectile that advances each tick and ends on its first
    /// obstacle or actor collision.
    Projectile {
        /// World units travelled per tick.
        speed_per_tick: f64,
    },
    /// A persistent status effect that pulses damage at a fixed cadence
    /// until its duration expires.
    BurningStatus {
        /// Ticks between damage pulses.
        damage_interval_ticks: u32,
    },
    /// Pure cosmetic effect with no gameplay hooks.
    BloodDecal,
}

/// When an effect instance's lifetime ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndPolicy {
    /// Ends when `age_ticks` reaches `max_age_ticks`.
    Duration,
    /// Ends the first time its update hook reports a hit.
    FirstHit,
    /// Ends when the owning actor is no longer in the world.
    OwnerGone,
}

/// Whether an effect's per-tick position/state changes are worth
/// replicating to clients every tick, or only on spawn/end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationSpec {
    /// Emit an update event whenever state actually changes.
    Always,
    /// Never emit update events; clients only see spawn and end.
    SuppressUpdates,
}

/// Content-defined parameters for one effect kind, shared by every instance
/// spawned from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDefinition {
    /// Stable id content and intents reference.
    pub id: EffectDefId,
    /// Lifecycle behaviour.
    pub kind: EffectBehaviorKind,
    /// End condition.
    pub end_policy: EndPolicy,
    /// Update replication policy.
    pub replication: ReplicationSpec,
}

/// Process-wide, immutable-after-init table of effect definitions.
///
/// Built once via [`EffectRegistry::global`] and read lock-free afterward —
/// the same "construct once, read lock-free" discipline the design notes
/// call for, implemented with a `OnceLock` since nothing in the pack exposes
/// a reusable registry type for this shape.
pub struct EffectRegistry {
    definitions: BTreeMap<EffectDefId, EffectDefinition>,
}

impl EffectRegistry {
    fn builtin() -> Self {
        let mut definitions = BTreeMap::new();
        for def in [
            EffectDefinition {
                id: EffectDefId::new("melee_swing"),
                kind: EffectBehaviorKind::MeleeSwing,
                end_policy: EndPolicy::Duration,
                replication: ReplicationSpec::SuppressUpdates,
            },
            EffectDefinition {
                id: EffectDefId::new("arrow_projectile"),
                kind: EffectBehaviorKind::Projectile { speed_per_tick: 1.5 },
                end_policy: EndPolicy::FirstHit,
                replication: ReplicationSpec::Always,
            },
            EffectDefinition {
                id: EffectDefId::new("burning_status"),
                kind: EffectBehaviorKind::BurningStatus {
                    damage_interval_ticks: 15,
                },
                end_policy: EndPolicy::Duration,
                replication: ReplicationSpec::SuppressUpdates,
            },
            EffectDefinition {
                id: EffectDefId::new(crate::BLOOD_DECAL_DEF_ID),
                kind: EffectBehaviorKind::BloodDecal,
                end_policy: EndPolicy::Duration,
                replication: ReplicationSpec::SuppressUpdates,
            },
        ] {
            definitions.insert(def.id.clone(), def);
        }
        Self { definitions }
    }

    /// Returns the process-wide registry, constructing it on first access.
    #[must_use]
    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<EffectRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::builtin)
    }

    /// Looks up a definition by id.
    #[must_use]
    pub fn get(&self, id: &EffectDefId) -> Option<&EffectDefinition> {
        self.definitions.get(id)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn builtin_registry_has_blood_decal() {
        let registry = EffectRegistry::global();
        let def = registry
            .get(&EffectDefId::new(crate::BLOOD_DECAL_DEF_ID))
            .expect("blood_decal registered");
        assert_eq!(def.kind, EffectBehaviorKind::BloodDecal);
    }
}
