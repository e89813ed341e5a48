//! Error taxonomy of the portal.
//!
//! Each layer has its own `thiserror` enum: [`SessionError`] for the session
//! cache, [`SpotifyError`] for outbound calls, [`AuthError`] for the token
//! manager. Request handlers fold them into [`AppError`], which decides how a
//! failure reaches the browser: a redirect to the login route, a fixed 400, or
//! a JSON error body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session cache error: {0}")]
    Cache(#[from] redis::RedisError),
    #[error("Session document is malformed: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SpotifyError {
    #[error("Spotify request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Spotify rejected the access token")]
    Unauthorized,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Token refresh failed: {0}")]
    RefreshFailed(SpotifyError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Token refresh failed: {0}")]
    RefreshFailed(SpotifyError),
    #[error("Invalid state parameter")]
    InvalidState,
    #[error("Authorization code missing")]
    MissingAuthorizationCode,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Spotify(SpotifyError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Where unauthenticated browsers are sent.
pub const LOGIN_ROUTE: &str = "/spotify_login";

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotAuthenticated => Self::NotAuthenticated,
            AuthError::RefreshFailed(e) => Self::RefreshFailed(e),
            AuthError::Session(e) => Self::Session(e),
        }
    }
}

impl From<SpotifyError> for AppError {
    fn from(err: SpotifyError) -> Self {
        match err {
            SpotifyError::Unauthorized => Self::NotAuthenticated,
            other => Self::Spotify(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotAuthenticated => {
                tracing::debug!("Not authenticated, redirecting to login");
                return Redirect::to(LOGIN_ROUTE).into_response();
            }
            Self::RefreshFailed(e) => {
                tracing::warn!(error = %e, "Token refresh failed, redirecting to login");
                return Redirect::to(LOGIN_ROUTE).into_response();
            }
            Self::InvalidState => {
                tracing::warn!("OAuth callback state mismatch");
                return (StatusCode::BAD_REQUEST, "Invalid state parameter").into_response();
            }
            Self::MissingAuthorizationCode => {
                tracing::debug!("OAuth callback without authorization code");
                return (StatusCode::BAD_REQUEST, "Authorization failed").into_response();
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Spotify(e) => {
                tracing::error!(error = %e, "Spotify error");
                (StatusCode::BAD_GATEWAY, "Upstream service error".to_string())
            }
            Self::Session(e) => {
                tracing::error!(error = %e, "Session store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
