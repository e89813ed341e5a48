use std::{net::SocketAddr, sync::Arc};

use crate::{
    Res,
    api::{self, AppState},
    config::{Config, SessionBackend},
    management::{MemorySessionStore, RedisSessionStore, SessionStore},
    spotify::SpotifyClient,
};

/// Wires the Spotify client and the configured session backend into the app state.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built or Redis is unreachable.
pub async fn build_state(config: Config) -> Res<AppState> {
    let spotify = Arc::new(SpotifyClient::new(config.spotify.clone())?);

    let store: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Redis => {
            let store =
                RedisSessionStore::connect(&config.redis.url(), config.session.ttl_secs).await?;
            tracing::info!(host = %config.redis.host, port = config.redis.port, "connected to session cache");
            Arc::new(store)
        }
        SessionBackend::Memory => {
            tracing::warn!("using in-memory sessions; they are lost on restart");
            Arc::new(MemorySessionStore::new(config.session.ttl_secs))
        }
    };

    Ok(AppState::new(config, spotify, store))
}

/// Serves the portal until Ctrl-C.
///
/// # Errors
/// Returns an error if the address is invalid or the listener cannot bind.
pub async fn start_api_server(config: Config) -> Res<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = build_state(config).await?;
    let app = api::app_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
