//! Poker league binary entrypoint wiring the player store, game socket, and REST routes.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use poker_league::{
    config::AppConfig,
    dao::player_store::{FileSystemPlayerStore, InMemoryPlayerStore, PlayerStore},
    routes,
    state::{AppState, SharedState},
};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_STORE_PATH: &str = "game.db.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = open_store().await?;
    let app_state = AppState::new(&config, store);

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Open the player store named by `PLAYER_STORE_PATH`; an empty value keeps wins in memory.
///
/// A store that cannot be read or parsed aborts startup.
async fn open_store() -> anyhow::Result<Arc<dyn PlayerStore>> {
    let path = env::var("PLAYER_STORE_PATH").unwrap_or_else(|_| DEFAULT_STORE_PATH.into());
    if path.is_empty() {
        info!("PLAYER_STORE_PATH is empty; wins will not survive a restart");
        return Ok(Arc::new(InMemoryPlayerStore::new()));
    }

    let store = FileSystemPlayerStore::open(&path)
        .await
        .with_context(|| format!("opening player store `{path}`"))?;
    Ok(Arc::new(store))
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(err) => {
                tracing::warn!(error = %err, "cannot listen for SIGTERM; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
