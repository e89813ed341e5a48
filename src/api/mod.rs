//! # API Module
//!
//! HTTP surface of the portal, built on [Axum](https://docs.rs/axum).
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - `GET /` - portal page showing whether Spotify is connected
//! - `GET /spotify_login` - starts the OAuth authorization-code flow with PKCE
//!   and an anti-forgery `state`
//! - `GET /spotify_callback` - verifies `state`, exchanges the code, stores
//!   the credential in the session
//! - `GET /logout` - deletes the session
//!
//! ### Playlists
//!
//! - `GET /spotify_playlists` - HTML grid of the user's playlists
//! - `GET /spotify_playlists_data` - the same data as JSON, paginated
//! - `GET /spotify_playlist/{id}` - HTML track list with Discogs links
//! - `GET /spotify_playlist_tracks` - a page of track views as JSON
//!
//! ### Monitoring
//!
//! - `GET /health` - liveness probe
//!
//! ## State
//!
//! Handlers share nothing but [`AppState`], which is built once at startup:
//! configuration, the Spotify client, the session manager, the Discogs link
//! builder and the cookie signing key. The session cache is the only mutable
//! shared resource and is accessed read-then-write; the last writer wins.

use std::sync::Arc;

use axum::{Router, extract::FromRef, routing::get};
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    config::Config,
    management::{MarketplaceSearch, SessionManager, SessionStore},
    spotify::SpotifyApi,
};

mod auth;
mod health;
mod playlists;
mod session;

pub use auth::{callback, index, login, logout};
pub use health::health;
pub use playlists::{next_offset, playlist_page, playlist_tracks, playlists_data, playlists_page};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub spotify: Arc<dyn SpotifyApi>,
    pub sessions: SessionManager,
    pub search: MarketplaceSearch,
    cookie_key: Key,
}

impl AppState {
    pub fn new(config: Config, spotify: Arc<dyn SpotifyApi>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            cookie_key: cookie_key(&config.session.secret_key),
            search: MarketplaceSearch::new(config.discogs_search_url.clone()),
            sessions: SessionManager::new(store),
            config: Arc::new(config),
            spotify,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("spotify", &self.spotify)
            .field("sessions", &self.sessions)
            .field("search", &self.search)
            .finish_non_exhaustive()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Stretches the configured secret of any length to the 64 bytes a [`Key`] needs.
fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Configures and returns the application router.
pub fn app_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        .route("/", get(index))
        .route("/spotify_login", get(login))
        .route("/spotify_callback", get(callback))
        .route("/spotify_playlists", get(playlists_page))
        .route("/spotify_playlists_data", get(playlists_data))
        .route("/spotify_playlist/{id}", get(playlist_page))
        .route("/spotify_playlist_tracks", get(playlist_tracks))
        .route("/logout", get(logout))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
