use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
};
use axum_extra::extract::cookie::SignedCookieJar;
use chrono::Utc;

use crate::{
    api::{AppState, session},
    error::{AppError, Result},
    management::TokenManager,
    types::{Credential, PendingAuthorization},
    utils, views,
};

/// Portal landing page.
///
/// Shows a connect link, or links to the playlists and logout once the
/// session holds a Spotify credential. Never calls Spotify.
pub async fn index(State(state): State<AppState>, jar: SignedCookieJar) -> Result<Html<String>> {
    let session_id = session::session_id(&jar, &state.config.session);
    let logged_in = TokenManager::new(&state.sessions, state.spotify.as_ref())
        .is_logged_in(session_id.as_deref())
        .await?;
    Ok(Html(views::index(logged_in)))
}

/// Starts the OAuth authorization-code flow.
///
/// Creates the session cookie if the browser has none, stores a fresh
/// `state` and PKCE verifier in the session and redirects to Spotify's
/// authorize page.
///
/// # Errors
///
/// Returns [`AppError::Session`] if the session cannot be saved.
pub async fn login(State(state): State<AppState>, jar: SignedCookieJar) -> Result<impl IntoResponse> {
    let (jar, session_id) = session::ensure_session(jar, &state.config.session);

    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let auth_state = utils::generate_state();

    let mut data = state.sessions.load(&session_id).await?;
    data.oauth = Some(PendingAuthorization {
        state: auth_state.clone(),
        code_verifier,
    });
    state.sessions.save(&session_id, &data).await?;

    let auth_url = state.spotify.authorize_url(&auth_state, &code_challenge);
    tracing::debug!("Redirecting to Spotify authorization");
    Ok((jar, Redirect::to(&auth_url)))
}

/// Completes the OAuth flow on `GET /spotify_callback?code&state`.
///
/// The pending handshake is removed from the session before anything is
/// checked, so every callback consumes it.
///
/// # Errors
///
/// - [`AppError::InvalidState`] without a session, a pending handshake, or a
///   matching `state`
/// - [`AppError::MissingAuthorizationCode`] when Spotify sent no `code`
///   (for example after the user declined)
/// - [`AppError::Spotify`] if the code exchange fails
pub async fn callback(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let Some(session_id) = session::session_id(&jar, &state.config.session) else {
        return Err(AppError::InvalidState);
    };

    let mut data = state.sessions.load(&session_id).await?;
    // The handshake is single-use, whatever the outcome below.
    let Some(pending) = data.oauth.take() else {
        return Err(AppError::InvalidState);
    };
    state.sessions.save(&session_id, &data).await?;

    let returned_state = params.get("state").map(String::as_str).unwrap_or_default();
    if returned_state.is_empty() || returned_state != pending.state {
        return Err(AppError::InvalidState);
    }

    if let Some(error) = params.get("error") {
        tracing::info!(error = %error, "Spotify authorization was declined");
    }
    let Some(code) = params.get("code").filter(|code| !code.is_empty()) else {
        return Err(AppError::MissingAuthorizationCode);
    };

    let response = state
        .spotify
        .exchange_code(code, &pending.code_verifier)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Authorization code exchange failed");
            AppError::Spotify(e)
        })?;

    data.spotify = Some(Credential::from_token_response(
        response,
        None,
        Utc::now().timestamp(),
    ));
    state.sessions.save(&session_id, &data).await?;

    tracing::info!("Spotify login completed");
    Ok((jar, Redirect::to("/")))
}

/// Deletes the session document and the cookie, then redirects home.
pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> Result<impl IntoResponse> {
    if let Some(session_id) = session::session_id(&jar, &state.config.session) {
        state.sessions.destroy(&session_id).await?;
        tracing::info!("Session cleared");
    }

    let jar = session::clear_session(jar, &state.config.session);
    Ok((jar, Redirect::to("/")))
}
