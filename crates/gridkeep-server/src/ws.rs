// SPDX-License-Identifier: Apache-2.0
//! WebSocket upgrade and the per-connection read/write tasks that bridge a
//! client's JSON frames to [`Hub`] commands and broadcasts.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use gridkeep_model::{ActorId, Vec2};
use gridkeep_proto::{ClientMessage, ServerMessage};
use gridkeep_sim::{Command, CommandEnvelope};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::hub::Hub;

/// Bounded mailbox depth for one subscriber's outbound frames. A slow
/// client backs up here rather than ever blocking the tick loop.
const SUBSCRIBER_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    id: String,
}

pub async fn ws_handler(
    State(hub): State<Arc<Hub>>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub, ActorId::new(query.id)))
}

async fn handle_socket(socket: WebSocket, hub: Arc<Hub>, id: ActorId) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(SUBSCRIBER_CHANNEL_CAPACITY);

    let keyframe = hub.subscribe(id.clone(), tx.clone()).await;
    let hello = ServerMessage::State(gridkeep_proto::StatePayload {
        tick: keyframe.tick,
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
        server_time: now_ms(),
    });
    if tx.send(hello).await.is_err() {
        hub.unsubscribe(&id).await;
        return;
    }

    let writer_id = id.clone();
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                warn!(actor_id = %writer_id, "failed to serialize outbound frame");
                continue;
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = ws_rx.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if let Err(err) = handle_client_frame(&hub, &id, &tx, &text).await {
                    warn!(actor_id = %id, error = %err, "dropping malformed client frame");
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                warn!(actor_id = %id, ?err, "websocket read error");
                break;
            }
        }
    }

    info!(actor_id = %id, "websocket closed");
    writer.abort();
    hub.unsubscribe(&id).await;
}

async fn handle_client_frame(
    hub: &Hub,
    id: &ActorId,
    tx: &mpsc::Sender<ServerMessage>,
    text: &str,
) -> Result<(), serde_json::Error> {
    let message: ClientMessage = serde_json::from_str(text)?;
    let received_ms = now_ms();
    match message {
        ClientMessage::Input { dx, dy, sent_at } => {
            let intent = Vec2::new(dx.clamp(-1.0, 1.0), dy.clamp(-1.0, 1.0));
            let intent = intent.normalized().map_or(Vec2::ZERO, |unit| unit.scale(intent.distance(Vec2::ZERO).min(1.0)));
            hub.push_command(envelope(id, received_ms, Command::Move { intent, facing: None })).await;
            let _ = sent_at;
        }
        ClientMessage::Action { name, .. } => {
            hub.push_command(envelope(id, received_ms, Command::Action { name })).await;
        }
        ClientMessage::Heartbeat { sent_at } => {
            let rtt_ms = received_ms.saturating_sub(sent_at).try_into().unwrap_or(u32::MAX);
            hub.push_command(envelope(
                id,
                received_ms,
                Command::Heartbeat { client_sent_ms: sent_at, received_ms, rtt_ms },
            ))
            .await;
            let reply = ServerMessage::Heartbeat(gridkeep_proto::HeartbeatPayload {
                server_time: hub.server_time_ms(),
                client_time: sent_at,
                rtt: rtt_ms,
            });
            let _ = tx.send(reply).await;
        }
        ClientMessage::Path { target_x, target_y } => {
            hub.push_command(envelope(id, received_ms, Command::SetPath { target: Vec2::new(target_x, target_y) }))
                .await;
        }
        ClientMessage::ClearPath => {
            hub.push_command(envelope(id, received_ms, Command::ClearPath)).await;
        }
        ClientMessage::RequestKeyframe { sequence } => {
            hub.request_keyframe(id, sequence).await;
        }
    }
    Ok(())
}

fn envelope(id: &ActorId, issued_at_ms: u64, command: Command) -> CommandEnvelope {
    CommandEnvelope { origin_tick: 0, actor_id: id.clone(), issued_at_ms, command }
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0).try_into().unwrap_or(u64::MAX)
}
