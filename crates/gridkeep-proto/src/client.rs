// SPDX-License-Identifier: Apache-2.0
//! Client → server message shapes.

use serde::{Deserialize, Serialize};

/// One client-originated WebSocket frame, externally tagged on `type`.
///
/// Field names follow the wire contract as given, which mixes `camelCase`
/// (`sentAt`, `targetX`) and `snake_case` (`request_keyframe`) rather than
/// one convention throughout — `#[serde(rename = "...")]` is spelled out
/// per field instead of a blanket `rename_all` so the mix round-trips
/// exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Movement intent. Components are clamped to `[-1, 1]` and the
    /// resulting vector renormalised to magnitude ≤ 1 by the receiver, not
    /// by this type — it carries the client's raw values.
    #[serde(rename = "input")]
    Input {
        dx: f64,
        dy: f64,
        #[serde(rename = "sentAt")]
        sent_at: u64,
    },
    /// A named, content-defined action (e.g. a melee swing).
    #[serde(rename = "action")]
    Action {
        name: String,
        #[serde(rename = "sentAt")]
        sent_at: u64,
    },
    /// Liveness probe; the server echoes it back with round-trip timing.
    #[serde(rename = "heartbeat")]
    Heartbeat {
        #[serde(rename = "sentAt")]
        sent_at: u64,
    },
    /// Requests server-driven path-following toward a fixed destination.
    #[serde(rename = "path")]
    Path {
        #[serde(rename = "targetX")]
        target_x: f64,
        #[serde(rename = "targetY")]
        target_y: f64,
    },
    /// Cancels any active path-following goal.
    #[serde(rename = "clearPath")]
    ClearPath,
    /// Asks for the keyframe at `sequence`. If the journal still retains it,
    /// the server sends it directly; otherwise it forces a fresh keyframe on
    /// the next broadcast, regardless of the journal's own forcing policy.
    #[serde(rename = "request_keyframe")]
    RequestKeyframe { sequence: u64 },
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn input_round_trips_through_json() {
        let msg = ClientMessage::Input { dx: 0.6, dy: 0.8, sent_at: 12345 };
        let json = serde_json::to_string(&msg).expect("serialize");
        assert_eq!(json, r#"{"type":"input","dx":0.6,"dy":0.8,"sentAt":12345}"#);
        let back: ClientMessage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, msg);
    }

    #[test]
    fn clear_path_is_a_bare_type_tag() {
        let msg = ClientMessage::ClearPath;
        let json = serde_json::to_string(&msg).expect("serialize");
        assert_eq!(json, r#"{"type":"clearPath"}"#);
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        let result: Result<ClientMessage, _> = serde_json::from_str(r#"{"type":"nonsense"}"#);
        assert!(result.is_err());
    }
}
