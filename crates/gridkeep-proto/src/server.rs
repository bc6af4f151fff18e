// SPDX-License-Identifier: Apache-2.0
//! Server → client message shapes.

use std::collections::BTreeMap;

use gridkeep_journal::{Keyframe, Patch};
use gridkeep_model::{ActorId, EffectDefId, EffectId, EffectShape, Vec2};
use serde::{Deserialize, Serialize};

/// One entry in the `effect_spawned` array: a new live instance, derived
/// from the journal's effect event ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSpawnedWire {
    pub effect_id: EffectId,
    pub sequence: u64,
    pub tick: u64,
    pub def_id: EffectDefId,
    pub source: ActorId,
    pub position: Vec2,
    pub shape: EffectShape,
}

/// One entry in the `effect_update` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectUpdatedWire {
    pub effect_id: EffectId,
    pub sequence: u64,
    pub tick: u64,
    pub position: Vec2,
}

/// One entry in the `effect_ended` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectEndedWire {
    pub effect_id: EffectId,
    pub sequence: u64,
    pub tick: u64,
    pub reason: String,
}

/// Body of a `state` frame. Every collection field is `None` (and so
/// omitted from the JSON) when there's nothing of that kind to report this
/// round, keeping an idle broadcast small.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePayload {
    pub tick: u64,
    pub sequence: u64,
    pub resync: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyframe: Option<Keyframe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<Patch>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npcs: Option<Vec<Patch>>,
    #[serde(rename = "groundItems", skip_serializing_if = "Option::is_none")]
    pub ground_items: Option<Vec<Patch>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_spawned: Option<Vec<EffectSpawnedWire>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_update: Option<Vec<EffectUpdatedWire>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_ended: Option<Vec<EffectEndedWire>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_seq_cursors: Option<BTreeMap<String, u64>>,
    #[serde(rename = "serverTime")]
    pub server_time: u64,
}

/// Body of a `heartbeat` frame, answering a client's own heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatPayload {
    #[serde(rename = "serverTime")]
    pub server_time: u64,
    #[serde(rename = "clientTime")]
    pub client_time: u64,
    pub rtt: u32,
}

/// One server-originated WebSocket frame, externally tagged on `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Keyframe and/or diff broadcast for one round.
    #[serde(rename = "state")]
    State(StatePayload),
    /// Liveness reply with round-trip timing.
    #[serde(rename = "heartbeat")]
    Heartbeat(HeartbeatPayload),
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn empty_state_omits_optional_collections() {
        let payload = StatePayload {
            tick: 5,
            sequence: 1,
            resync: false,
            keyframe: None,
            players: None,
            npcs: None,
            ground_items: None,
            effect_spawned: None,
            effect_update: None,
            effect_ended: None,
            effect_seq_cursors: None,
            server_time: 100,
        };
        let json = serde_json::to_value(ServerMessage::State(payload)).expect("serialize");
        let obj = json.as_object().expect("object");
        assert!(!obj.contains_key("players"));
        assert!(!obj.contains_key("keyframe"));
        assert_eq!(obj.get("type").and_then(|v| v.as_str()), Some("state"));
    }

    #[test]
    fn heartbeat_reply_round_trips_with_camel_case_fields() {
        let msg = ServerMessage::Heartbeat(HeartbeatPayload { server_time: 10, client_time: 3, rtt: 7 });
        let json = serde_json::to_string(&msg).expect("serialize");
        assert_eq!(json, r#"{"type":"heartbeat","serverTime":10,"clientTime":3,"rtt":7}"#);
    }
}
