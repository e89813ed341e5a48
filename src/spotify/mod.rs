//! # Spotify Integration Module
//!
//! Thin client for the two Spotify services the portal talks to:
//!
//! - the **accounts service** (`accounts.spotify.com`), for the OAuth 2.0
//!   authorization-code flow with PKCE: building the authorize URL, exchanging
//!   the callback code and refreshing access tokens;
//! - the **Web API** (`api.spotify.com/v1`), for the read-only playlist
//!   endpoints.
//!
//! ```text
//! Request handlers / TokenManager
//!          ↓
//!     SpotifyApi (trait)
//!          ↓
//!   SpotifyClient (reqwest)
//!          ↓
//! Accounts service, Web API
//! ```
//!
//! Handlers never hold a `SpotifyClient` directly. They receive an
//! `Arc<dyn SpotifyApi>` through the application state, which lets tests swap
//! in a fake without a network.
//!
//! ## Error Handling
//!
//! Every call makes exactly one request. A `401` from the Web API surfaces as
//! [`SpotifyError::Unauthorized`] so the caller can send the user back through
//! login; any other failure status or transport error is
//! [`SpotifyError::Http`]. There is no retry or backoff.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::SpotifyConfig,
    error::SpotifyError,
    types::{Page, Paging, Playlist, PlaylistItem, SimplifiedPlaylist, TokenResponse},
};

pub mod auth;
pub mod playlists;

/// Operations the portal needs from Spotify.
#[async_trait]
pub trait SpotifyApi: Send + Sync + Debug {
    /// URL the browser is sent to in order to grant access.
    ///
    /// # Arguments
    ///
    /// * `state` - Anti-forgery value echoed back on the callback
    /// * `code_challenge` - S256 PKCE challenge derived from the session's verifier
    fn authorize_url(&self, state: &str, code_challenge: &str) -> String;

    /// Exchanges the authorization code from the callback for tokens.
    ///
    /// # Arguments
    ///
    /// * `code` - Authorization code returned by the accounts service
    /// * `code_verifier` - PKCE verifier stored when the login started
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyError::Http`] if the request fails or the code is rejected.
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, SpotifyError>;

    /// Trades a refresh token for a new access token.
    ///
    /// The response usually omits `refresh_token`; callers keep the old one.
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyError::Http`] if the request fails or the refresh token
    /// has been revoked.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError>;

    /// One page of the current user's playlists.
    ///
    /// # Errors
    ///
    /// [`SpotifyError::Unauthorized`] when Spotify rejects `access_token`,
    /// [`SpotifyError::Http`] for any other failure.
    async fn current_user_playlists(
        &self,
        access_token: &str,
        page: Page,
    ) -> Result<Paging<SimplifiedPlaylist>, SpotifyError>;

    /// A playlist with the first page of its items embedded.
    async fn playlist(
        &self,
        access_token: &str,
        playlist_id: &str,
    ) -> Result<Playlist, SpotifyError>;

    /// One page of a playlist's items, in playlist order.
    async fn playlist_items(
        &self,
        access_token: &str,
        playlist_id: &str,
        page: Page,
    ) -> Result<Paging<PlaylistItem>, SpotifyError>;
}

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
}

impl SpotifyClient {
    /// Builds a client whose requests time out after `config.timeout_secs`.
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(config: SpotifyConfig) -> Result<Self, SpotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    fn authorize_url(&self, state: &str, code_challenge: &str) -> String {
        self.build_authorize_url(state, code_challenge)
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, SpotifyError> {
        self.exchange_code_pkce(code, code_verifier).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError> {
        self.refresh_access_token(refresh_token).await
    }

    async fn current_user_playlists(
        &self,
        access_token: &str,
        page: Page,
    ) -> Result<Paging<SimplifiedPlaylist>, SpotifyError> {
        self.get_current_user_playlists(access_token, page).await
    }

    async fn playlist(
        &self,
        access_token: &str,
        playlist_id: &str,
    ) -> Result<Playlist, SpotifyError> {
        self.get_playlist(access_token, playlist_id).await
    }

    async fn playlist_items(
        &self,
        access_token: &str,
        playlist_id: &str,
        page: Page,
    ) -> Result<Paging<PlaylistItem>, SpotifyError> {
        self.get_playlist_items(access_token, playlist_id, page).await
    }
}
