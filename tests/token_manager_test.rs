mod common;

use chrono::Utc;
use common::{FakeSpotify, TestStore, session_manager};
use cratedigger::{
    error::AuthError,
    management::TokenManager,
    types::{Credential, SessionData, TokenResponse},
};

fn session_with(credential: Credential) -> SessionData {
    SessionData {
        spotify: Some(credential),
        oauth: None,
    }
}

#[tokio::test]
async fn fresh_credential_is_returned_without_refresh() {
    let store = TestStore::default();
    store.put(
        "sid",
        &session_with(Credential {
            access_token: "fresh".to_string(),
            refresh_token: Some("r".to_string()),
            expires_at: Some(Utc::now().timestamp() + 600),
        }),
    );
    let sessions = session_manager(&store);
    let spotify = FakeSpotify::default();

    let token = TokenManager::new(&sessions, &spotify)
        .ensure_valid_credential(Some("sid"))
        .await
        .unwrap();

    assert_eq!(token, "fresh");
    assert_eq!(spotify.refresh_count(), 0);
}

#[tokio::test]
async fn missing_session_is_not_authenticated() {
    let store = TestStore::default();
    let sessions = session_manager(&store);
    let spotify = FakeSpotify::default();
    let manager = TokenManager::new(&sessions, &spotify);

    let err = manager.ensure_valid_credential(None).await.unwrap_err();
    assert!(matches!(err, AuthError::NotAuthenticated));

    let err = manager
        .ensure_valid_credential(Some("unknown"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NotAuthenticated));
    assert_eq!(spotify.refresh_count(), 0);
}

#[tokio::test]
async fn empty_credential_without_refresh_token_is_not_authenticated() {
    let store = TestStore::default();
    store.put(
        "sid",
        &session_with(Credential {
            access_token: String::new(),
            refresh_token: None,
            expires_at: None,
        }),
    );
    let sessions = session_manager(&store);
    let spotify = FakeSpotify::default();

    let err = TokenManager::new(&sessions, &spotify)
        .ensure_valid_credential(Some("sid"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::NotAuthenticated));
    assert_eq!(spotify.refresh_count(), 0);
}

#[tokio::test]
async fn expired_credential_without_refresh_token_is_not_authenticated() {
    let store = TestStore::default();
    store.put(
        "sid",
        &session_with(Credential {
            access_token: "old".to_string(),
            refresh_token: None,
            expires_at: Some(Utc::now().timestamp() - 10),
        }),
    );
    let sessions = session_manager(&store);
    let spotify = FakeSpotify::default();

    let err = TokenManager::new(&sessions, &spotify)
        .ensure_valid_credential(Some("sid"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::NotAuthenticated));
    assert_eq!(spotify.refresh_count(), 0);
}

#[tokio::test]
async fn stale_credential_is_refreshed_and_stored() {
    let store = TestStore::default();
    let now = Utc::now().timestamp();
    store.put(
        "sid",
        &session_with(Credential {
            access_token: "old".to_string(),
            refresh_token: Some("r1".to_string()),
            // Inside the staleness buffer.
            expires_at: Some(now + 20),
        }),
    );
    let sessions = session_manager(&store);
    let spotify = FakeSpotify::default();
    *spotify.refresh_response.lock().unwrap() = Some(TokenResponse {
        access_token: "new".to_string(),
        refresh_token: None,
        expires_in: None,
        scope: None,
    });

    let token = TokenManager::new(&sessions, &spotify)
        .ensure_valid_credential(Some("sid"))
        .await
        .unwrap();

    assert_eq!(token, "new");
    assert_eq!(spotify.refresh_count(), 1);

    let stored = store.session("sid").unwrap().spotify.unwrap();
    assert_eq!(stored.access_token, "new");
    assert_eq!(stored.refresh_token.as_deref(), Some("r1"));
    let expires_at = stored.expires_at.unwrap();
    assert!(expires_at >= now + 3600 && expires_at <= Utc::now().timestamp() + 3600);
}

#[tokio::test]
async fn rotated_refresh_token_replaces_the_old_one() {
    let store = TestStore::default();
    store.put(
        "sid",
        &session_with(Credential {
            access_token: "old".to_string(),
            refresh_token: Some("r1".to_string()),
            expires_at: Some(Utc::now().timestamp() - 100),
        }),
    );
    let sessions = session_manager(&store);
    let spotify = FakeSpotify::default();
    *spotify.refresh_response.lock().unwrap() = Some(TokenResponse {
        access_token: "new".to_string(),
        refresh_token: Some("r2".to_string()),
        expires_in: Some(1800),
        scope: None,
    });

    TokenManager::new(&sessions, &spotify)
        .ensure_valid_credential(Some("sid"))
        .await
        .unwrap();

    let stored = store.session("sid").unwrap().spotify.unwrap();
    assert_eq!(stored.refresh_token.as_deref(), Some("r2"));
}

#[tokio::test]
async fn failed_refresh_leaves_session_untouched() {
    let store = TestStore::default();
    let original = session_with(Credential {
        access_token: "old".to_string(),
        refresh_token: Some("r1".to_string()),
        expires_at: Some(Utc::now().timestamp() - 100),
    });
    store.put("sid", &original);
    let sessions = session_manager(&store);
    let spotify = FakeSpotify::default();
    *spotify.refresh_response.lock().unwrap() = None;

    let err = TokenManager::new(&sessions, &spotify)
        .ensure_valid_credential(Some("sid"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::RefreshFailed(_)));
    assert_eq!(spotify.refresh_count(), 1);
    assert_eq!(store.session("sid").unwrap(), original);
}

#[tokio::test]
async fn legacy_session_is_usable_after_migration() {
    let store = TestStore::default();
    let expires_at = Utc::now().timestamp() + 600;
    store.entries.lock().unwrap().insert(
        "sid".to_string(),
        format!(r#"{{"spotify":{{"token":"legacy","refresh_token":"r","expires_at":{expires_at}}}}}"#),
    );
    let sessions = session_manager(&store);
    let spotify = FakeSpotify::default();

    let token = TokenManager::new(&sessions, &spotify)
        .ensure_valid_credential(Some("sid"))
        .await
        .unwrap();

    assert_eq!(token, "legacy");
    let raw = store.entries.lock().unwrap().get("sid").cloned().unwrap();
    assert!(raw.contains(r#""access_token":"legacy""#));
}
