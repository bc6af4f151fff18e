// SPDX-License-Identifier: Apache-2.0
//! Client command types and the ingress queue that orders them deterministically.

use gridkeep_model::{ActorId, Facing, Vec2};

/// One client-originated instruction. Carries no actor id of its own; that
/// lives on the enclosing [`CommandEnvelope`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Movement intent update. `facing` is `None` when the client only sent
    /// a direction and the movement stage should derive facing from it.
    Move { intent: Vec2, facing: Option<Facing> },
    /// A named, content-defined action (e.g. a melee swing).
    Action { name: String },
    /// Liveness + RTT measurement; updates bookkeeping only, never the
    /// journal (heartbeat fields aren't part of any patch kind).
    Heartbeat {
        client_sent_ms: u64,
        received_ms: u64,
        rtt_ms: u32,
    },
    /// Requests path-following toward a fixed destination.
    SetPath { target: Vec2 },
    /// Cancels any active path-following goal.
    ClearPath,
}

/// One command plus the bookkeeping the tick loop needs to order and age it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEnvelope {
    /// Tick at which the originating client issued this command.
    pub origin_tick: u64,
    /// Which actor this command acts on behalf of.
    pub actor_id: ActorId,
    /// Wall-clock receipt time in milliseconds, for heartbeat RTT bookkeeping.
    pub issued_at_ms: u64,
    /// The instruction itself.
    pub command: Command,
}

/// Multiple-writer, single-reader command buffer. Network tasks push
/// envelopes as they arrive; the tick loop drains the whole buffer once per
/// tick in a deterministic order.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<CommandEnvelope>,
}

impl CommandQueue {
    /// Builds an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a command for the next drain.
    pub fn push(&mut self, envelope: CommandEnvelope) {
        self.pending.push(envelope);
    }

    /// Drains every pending command, ordered by `(origin_tick, actor_id)` so
    /// that two commands from different actors arriving in the same tick
    /// replay in a deterministic, lexicographic-by-actor order regardless of
    /// network arrival order.
    pub fn drain_ordered(&mut self) -> Vec<CommandEnvelope> {
        let mut drained = std::mem::take(&mut self.pending);
        drained.sort_by(|a, b| {
            a.origin_tick
                .cmp(&b.origin_tick)
                .then_with(|| a.actor_id.as_str().cmp(b.actor_id.as_str()))
        });
        drained
    }

    /// True if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(actor: &str, tick: u64) -> CommandEnvelope {
        CommandEnvelope {
            origin_tick: tick,
            actor_id: ActorId::new(actor),
            issued_at_ms: 0,
            command: Command::ClearPath,
        }
    }

    #[test]
    fn drain_orders_by_tick_then_actor_id() {
        let mut queue = CommandQueue::new();
        queue.push(envelope("zebra", 1));
        queue.push(envelope("alpha", 1));
        queue.push(envelope("alpha", 0));
        let drained = queue.drain_ordered();
        let order: Vec<(&str, u64)> = drained
            .iter()
            .map(|e| (e.actor_id.as_str(), e.origin_tick))
            .collect();
        assert_eq!(order, vec![("alpha", 0), ("alpha", 1), ("zebra", 1)]);
        assert!(queue.is_empty());
    }
}
