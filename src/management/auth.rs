use chrono::Utc;

use crate::{
    error::AuthError,
    management::SessionManager,
    spotify::SpotifyApi,
    types::{Credential, DEFAULT_TOKEN_LIFETIME_SECS, STALENESS_BUFFER_SECS, TokenResponse},
};

impl Credential {
    /// Builds a credential from a token endpoint response obtained at `now`.
    ///
    /// `prior_refresh_token` is kept when the response does not carry a new
    /// one, which is what Spotify does on most refreshes.
    pub fn from_token_response(
        response: TokenResponse,
        prior_refresh_token: Option<String>,
        now: i64,
    ) -> Self {
        let lifetime = response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(prior_refresh_token),
            expires_at: Some(now.saturating_add(lifetime)),
        }
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn is_stale(&self, now: i64) -> bool {
        if !self.has_access_token() {
            return true;
        }
        match self.expires_at {
            Some(expires_at) => expires_at.saturating_sub(now) <= STALENESS_BUFFER_SECS,
            None => self.refresh_token.is_some(),
        }
    }
}

/// Keeps the credential of one browser session usable.
pub struct TokenManager<'a> {
    sessions: &'a SessionManager,
    spotify: &'a dyn SpotifyApi,
}

impl<'a> TokenManager<'a> {
    pub fn new(sessions: &'a SessionManager, spotify: &'a dyn SpotifyApi) -> Self {
        TokenManager { sessions, spotify }
    }

    /// Returns an access token for the session, refreshing it at most once.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotAuthenticated`] if there is no session, no credential,
    ///   or a stale credential without a refresh token.
    /// - [`AuthError::RefreshFailed`] if the single refresh attempt fails; the
    ///   stored credential is left as it was.
    pub async fn ensure_valid_credential(
        &self,
        session_id: Option<&str>,
    ) -> Result<String, AuthError> {
        let Some(session_id) = session_id else {
            return Err(AuthError::NotAuthenticated);
        };

        let mut session = self.sessions.load(session_id).await?;
        let Some(credential) = session.spotify.clone() else {
            return Err(AuthError::NotAuthenticated);
        };

        let now = Utc::now().timestamp();
        if !credential.is_stale(now) {
            return Ok(credential.access_token);
        }

        let Some(refresh_token) = credential.refresh_token.clone() else {
            tracing::debug!("Credential is stale and cannot be refreshed");
            return Err(AuthError::NotAuthenticated);
        };

        tracing::debug!(expires_at = ?credential.expires_at, "Refreshing access token");
        let response = self
            .spotify
            .refresh_token(&refresh_token)
            .await
            .map_err(AuthError::RefreshFailed)?;

        let refreshed = Credential::from_token_response(
            response,
            Some(refresh_token),
            Utc::now().timestamp(),
        );
        let access_token = refreshed.access_token.clone();
        session.spotify = Some(refreshed);
        self.sessions.save(session_id, &session).await?;

        Ok(access_token)
    }

    /// Whether the session holds a credential at all, fresh or not.
    pub async fn is_logged_in(&self, session_id: Option<&str>) -> Result<bool, AuthError> {
        let Some(session_id) = session_id else {
            return Ok(false);
        };
        let session = self.sessions.load(session_id).await?;
        Ok(session.spotify.is_some())
    }
}
