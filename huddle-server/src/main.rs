use anyhow::Context;
use clap::Parser;
use huddle_server::{RoomManager, ServerConfig, router};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Signaling relay for two-party peer-to-peer calls.
#[derive(Debug, Parser)]
#[command(name = "huddle-server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Seconds an empty room survives before being reaped.
    #[arg(long, default_value_t = 30)]
    room_grace_secs: u64,

    /// Maximum number of live rooms.
    #[arg(long, default_value_t = 1024)]
    max_rooms: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = ServerConfig {
        room_grace: Duration::from_secs(args.room_grace_secs),
        max_rooms: args.max_rooms,
    };

    let rooms = RoomManager::new(&config);
    let app = router(rooms);

    info!(bind = %args.bind, "signaling relay listening");

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
