// SPDX-License-Identifier: Apache-2.0
//! The `/diagnostics` HTTP endpoint: a point-in-time telemetry snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::hub::Hub;

#[derive(Debug, Serialize)]
pub struct DiagnosticsResponse {
    tick: u64,
    subscriber_count: usize,
    last_tick_duration_micros: Option<u128>,
    last_commands_applied: Option<usize>,
    last_effects_spawned: Option<u32>,
    last_effects_ended: Option<u32>,
    last_npcs_removed: Option<usize>,
    last_players_disconnected: Option<usize>,
    resync_total_spawn_events: u64,
    resync_lost_spawn_events: u64,
    journal_drop_out_of_order: u64,
    journal_drop_unknown_id: u64,
    journal_drop_expired: u64,
    journal_drop_count: u64,
    spatial_overflow_by_effect_def: BTreeMap<String, u32>,
}

pub async fn diagnostics_handler(State(hub): State<Arc<Hub>>) -> Json<DiagnosticsResponse> {
    let last_report = hub.last_report().await;
    let subscriber_count = hub.subscriber_count().await;
    let (tick, resync_stats, drop_counts, overflow) = hub
        .with_world(|world| {
            (
                world.tick(),
                world.journal().resync_stats(),
                world.journal().drop_counts(),
                world.overflow().counts().clone(),
            )
        })
        .await;

    Json(DiagnosticsResponse {
        tick,
        subscriber_count,
        last_tick_duration_micros: last_report.map(|r| r.duration.as_micros()),
        last_commands_applied: last_report.map(|r| r.commands_applied),
        last_effects_spawned: last_report.map(|r| r.effects_spawned),
        last_effects_ended: last_report.map(|r| r.effects_ended),
        last_npcs_removed: last_report.map(|r| r.npcs_removed),
        last_players_disconnected: last_report.map(|r| r.players_disconnected),
        resync_total_spawn_events: resync_stats.total_spawn_events,
        resync_lost_spawn_events: resync_stats.lost_spawn_events,
        journal_drop_out_of_order: drop_counts.out_of_order,
        journal_drop_unknown_id: drop_counts.unknown_id,
        journal_drop_expired: drop_counts.expired,
        journal_drop_count: drop_counts.count,
        spatial_overflow_by_effect_def: overflow,
    })
}
