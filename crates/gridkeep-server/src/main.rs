// SPDX-License-Identifier: Apache-2.0
//! Entry point: parses CLI args, loads config, builds the initial world,
//! wires up the HTTP/WebSocket surface, and drives the tick loop.

mod content;
mod diagnostics;
mod error;
mod hub;
mod ws;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use clap::Parser;
use gridkeep_config::{ConfigService, EnvConfigSource};
use gridkeep_model::{Vec2, WorldBounds};
use gridkeep_sim::{World, DEFAULT_TICK_RATE_HZ};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use crate::error::ApiError;
use crate::hub::{Hub, JoinResult};

/// Default world extent, in world units, along each axis.
const WORLD_EXTENT: f64 = 1000.0;

#[derive(Parser, Debug)]
#[command(author, version, about = "Gridkeep authoritative game server")]
struct Args {
    /// TCP listener for HTTP and WebSocket clients.
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
    /// Directory served at the site root for the browser client.
    #[arg(long, default_value = "../client")]
    client_dir: PathBuf,
    /// World tick rate, in Hertz.
    #[arg(long, default_value_t = DEFAULT_TICK_RATE_HZ)]
    tick_rate_hz: f64,
    /// RNG seed for the world's deterministic simulation.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// TLS certificate (PEM). If provided, key must also be provided.
    #[arg(long)]
    tls_cert: Option<PathBuf>,
    /// TLS private key (PEM). If provided, cert must also be provided.
    #[arg(long)]
    tls_key: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct JoinResponse {
    id: String,
    keyframe: gridkeep_journal::Keyframe,
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn join_handler(State(hub): State<Arc<Hub>>) -> Result<Json<JoinResponse>, ApiError> {
    let spawn = Vec2::new(WORLD_EXTENT / 2.0, WORLD_EXTENT / 2.0);
    let JoinResult { id, keyframe } = hub.join(spawn).await?;
    Ok(Json(JoinResponse { id: id.to_string(), keyframe }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("a rustls crypto provider is already installed"))?;

    let args = Args::parse();
    let config = ConfigService::new(EnvConfigSource).load().context("load config from environment")?;

    let bounds = WorldBounds::new(Vec2::new(0.0, 0.0), Vec2::new(WORLD_EXTENT, WORLD_EXTENT));
    let mut world = World::new(bounds, content::ai_library(), config, args.tick_rate_hz, args.seed);
    content::spawn_default_npcs(&mut world).context("spawn default content")?;

    let hub = Hub::new(world);
    tokio::spawn(Arc::clone(&hub).run_tick_loop(args.tick_rate_hz));

    let app = Router::new()
        .route("/join", post(join_handler))
        .route("/health", get(health_handler))
        .route("/diagnostics", get(diagnostics::diagnostics_handler))
        .route("/ws", get(ws::ws_handler))
        .fallback_service(ServeDir::new(&args.client_dir))
        .with_state(hub);

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        shutdown.shutdown();
    });

    match (args.tls_cert, args.tls_key) {
        (Some(cert), Some(key)) => {
            let tls_config = RustlsConfig::from_pem_file(cert, key).await.context("load tls config")?;
            tracing::info!("gridkeep server listening (TLS) on {}", args.listen);
            axum_server::bind_rustls(args.listen, tls_config).handle(handle).serve(app.into_make_service()).await?;
        }
        (None, None) => {
            tracing::info!("gridkeep server listening on {}", args.listen);
            axum_server::bind(args.listen).handle(handle).serve(app.into_make_service()).await?;
        }
        _ => return Err(anyhow!("must provide both --tls-cert and --tls-key or neither")),
    }

    Ok(())
}
