// SPDX-License-Identifier: Apache-2.0
//! The session layer: subscriber bookkeeping, the tick-loop driver, and
//! per-round keyframe/diff broadcasting on top of [`gridkeep_sim::World`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use gridkeep_journal::Keyframe;
use gridkeep_model::{ActorId, Vec2};
use gridkeep_proto::{build_state_message, ServerMessage, StatePayload};
use gridkeep_sim::{CommandEnvelope, TickReport, World, WorldError};
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0).try_into().unwrap_or(u64::MAX)
}

/// Outcome of an attempt to join a new player.
pub struct JoinResult {
    /// The id assigned to the new player.
    pub id: ActorId,
    /// The keyframe the client should render before applying any diffs.
    pub keyframe: Keyframe,
}

/// Round-trip-relevant broadcast bookkeeping the hub carries between ticks.
/// Grouped so a single lock covers values that must stay mutually
/// consistent across one broadcast round.
struct BroadcastState {
    sequence: u64,
    effect_cursors: BTreeMap<String, u64>,
    force_keyframe: bool,
    last_forced_keyframe_tick: u64,
}

impl Default for BroadcastState {
    fn default() -> Self {
        Self { sequence: 0, effect_cursors: BTreeMap::new(), force_keyframe: true, last_forced_keyframe_tick: 0 }
    }
}

/// Owns the world, the per-actor subscriber table, and the broadcast
/// sequencing state. One `Hub` per server process.
pub struct Hub {
    world: Mutex<World>,
    subscribers: Mutex<BTreeMap<ActorId, mpsc::Sender<ServerMessage>>>,
    broadcast: Mutex<BroadcastState>,
    last_report: Mutex<Option<TickReport>>,
    start: SystemTime,
    keyframe_force_interval_ticks: AtomicU64,
    next_player_seq: AtomicU64,
}

impl Hub {
    /// Wraps a freshly constructed world. `heartbeat_interval_ticks` is
    /// also the period at which a keyframe is force-broadcast, satisfying
    /// the "a configurable heartbeat interval elapses" keyframe-policy
    /// clause with the same cadence the world already tracks.
    #[must_use]
    pub fn new(world: World) -> Arc<Self> {
        let keyframe_force_interval_ticks = world.heartbeat_interval_ticks();
        Arc::new(Self {
            world: Mutex::new(world),
            subscribers: Mutex::new(BTreeMap::new()),
            broadcast: Mutex::new(BroadcastState::default()),
            last_report: Mutex::new(None),
            start: SystemTime::now(),
            keyframe_force_interval_ticks: AtomicU64::new(keyframe_force_interval_ticks),
            next_player_seq: AtomicU64::new(1),
        })
    }

    /// Allocates a fresh, process-unique player id for an unauthenticated
    /// `/join` request.
    fn generate_player_id(&self) -> ActorId {
        let seq = self.next_player_seq.fetch_add(1, Ordering::Relaxed);
        ActorId::new(format!("player-{seq}"))
    }

    /// Milliseconds elapsed since this hub started, for heartbeat replies
    /// and the `serverTime` field on every broadcast.
    #[must_use]
    pub fn server_time_ms(&self) -> u64 {
        self.start.elapsed().unwrap_or_default().as_millis().try_into().unwrap_or(u64::MAX)
    }

    /// Allocates a new player at `position` and returns the snapshot it
    /// should render before its websocket connects.
    pub async fn join(&self, position: Vec2) -> Result<JoinResult, WorldError> {
        let mut world = self.world.lock().await;
        let id = self.generate_player_id();
        world.join_player(id.clone(), position)?;
        let tick = world.tick();
        let config = world.config();
        let state = world.state().clone();
        let keyframe = world.journal_mut().record_keyframe(tick, &state, config, now_ms());
        Ok(JoinResult { id, keyframe })
    }

    /// Registers (or replaces) the websocket subscriber for `id`. A prior
    /// subscriber for the same actor is dropped, which closes its writer
    /// task — the single-writer-per-session rule.
    pub async fn subscribe(&self, id: ActorId, tx: mpsc::Sender<ServerMessage>) -> Keyframe {
        let mut subs = self.subscribers.lock().await;
        if subs.insert(id.clone(), tx).is_some() {
            info!(actor_id = %id, "replacing existing subscriber");
        }
        drop(subs);
        self.broadcast.lock().await.force_keyframe = true;
        let mut world = self.world.lock().await;
        let tick = world.tick();
        let config = world.config();
        let state = world.state().clone();
        world.journal_mut().record_keyframe(tick, &state, config, now_ms())
    }

    /// Removes a subscriber, e.g. on socket close or write failure. Also
    /// removes the underlying player, matching the heartbeat-timeout path.
    pub async fn unsubscribe(&self, id: &ActorId) {
        self.subscribers.lock().await.remove(id);
        self.world.lock().await.remove_player(id);
    }

    /// Enqueues a client command for the next tick's drain.
    pub async fn push_command(&self, envelope: CommandEnvelope) {
        self.world.lock().await.push_command(envelope);
    }

    /// Handles a client's request for the keyframe at `sequence`. If the
    /// journal still retains it, sends it directly to that subscriber;
    /// otherwise the ring has aged it out or it was never recorded, so this
    /// falls back to forcing the next broadcast round to carry a fresh one.
    pub async fn request_keyframe(&self, id: &ActorId, sequence: u64) {
        let world = self.world.lock().await;
        let retained = world.journal().keyframe_by_sequence(sequence).cloned();
        drop(world);

        let Some(keyframe) = retained else {
            self.broadcast.lock().await.force_keyframe = true;
            return;
        };
        let subs = self.subscribers.lock().await;
        if let Some(tx) = subs.get(id) {
            let tick = keyframe.tick;
            let message = ServerMessage::State(StatePayload {
                tick,
                sequence: 0,
                resync: true,
                keyframe: Some(keyframe),
                players: None,
                npcs: None,
                ground_items: None,
                effect_spawned: None,
                effect_update: None,
                effect_ended: None,
                effect_seq_cursors: None,
                server_time: self.server_time_ms(),
            });
            if tx.try_send(message).is_err() {
                warn!(actor_id = %id, "subscriber mailbox full or closed, dropping requested keyframe");
            }
        }
    }

    /// Runs the fixed-rate tick loop until the process exits. Never
    /// returns under normal operation.
    pub async fn run_tick_loop(self: Arc<Self>, tick_rate_hz: f64) {
        let dt = Duration::from_secs_f64(1.0 / tick_rate_hz);
        let mut interval = tokio::time::interval(dt);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.step_and_broadcast().await;
        }
    }

    async fn step_and_broadcast(&self) {
        let message = {
            let mut world = self.world.lock().await;
            let report = world.step();
            let mut broadcast = self.broadcast.lock().await;

            let resync_hint = world.journal().resync_hint();
            let heartbeat_due = report.tick.saturating_sub(broadcast.last_forced_keyframe_tick)
                >= self.keyframe_force_interval_ticks.load(Ordering::Relaxed);
            let force = broadcast.force_keyframe || resync_hint || heartbeat_due;

            let patches = world.journal_mut().drain_patches();
            let keyframe = if force {
                broadcast.force_keyframe = false;
                broadcast.last_forced_keyframe_tick = report.tick;
                if resync_hint {
                    world.journal_mut().clear_resync_hint();
                }
                let config = world.config();
                let state = world.state().clone();
                Some(world.journal_mut().record_keyframe(report.tick, &state, config, now_ms()))
            } else {
                None
            };

            let new_events: Vec<_> = world
                .journal()
                .effect_events()
                .filter(|event| {
                    let cursor = broadcast.effect_cursors.get(event.effect_id.to_string().as_str()).copied().unwrap_or(0);
                    event.sequence > cursor
                })
                .cloned()
                .collect();
            let cursors: BTreeMap<String, u64> = new_events
                .iter()
                .map(|event| (event.effect_id.to_string(), event.sequence))
                .collect();
            for (id, seq) in &cursors {
                broadcast.effect_cursors.insert(id.clone(), *seq);
            }

            *self.last_report.lock().await = Some(report.clone());

            broadcast.sequence += 1;
            build_state_message(
                report.tick,
                broadcast.sequence,
                resync_hint,
                keyframe,
                patches,
                &new_events,
                cursors,
                self.server_time_ms(),
            )
        };

        self.broadcast_to_subscribers(message).await;
    }

    async fn broadcast_to_subscribers(&self, message: ServerMessage) {
        let mut dead = Vec::new();
        {
            let subs = self.subscribers.lock().await;
            for (id, tx) in subs.iter() {
                if tx.try_send(message.clone()).is_err() {
                    warn!(actor_id = %id, "subscriber mailbox full or closed, dropping");
                    dead.push(id.clone());
                }
            }
        }
        for id in dead {
            self.unsubscribe(&id).await;
        }
    }

    /// Read-only access for HTTP diagnostics.
    pub async fn with_world<R>(&self, f: impl FnOnce(&World) -> R) -> R {
        let world = self.world.lock().await;
        f(&world)
    }

    /// Number of currently connected subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    /// The most recently completed tick's summary, if any tick has run yet.
    pub async fn last_report(&self) -> Option<TickReport> {
        *self.last_report.lock().await
    }
}
