#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex, Once,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use clap::Parser;
use cratedigger::{
    api::{self, AppState},
    config::Config,
    error::{SessionError, SpotifyError},
    management::{SessionManager, SessionStore},
    spotify::SpotifyApi,
    types::{
        Album, Artist, Image, Page, Paging, Playlist, PlaylistItem, SessionData,
        SimplifiedPlaylist, TokenResponse, Track, TracksRef,
    },
};
use reqwest::{Response, redirect::Policy};

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("cratedigger=debug".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config() -> Config {
    Config::parse_from([
        "serve",
        "--spotify-client-id",
        "test-client",
        "--spotify-client-secret",
        "test-secret",
        "--spotify-auth-url",
        "https://accounts.test/authorize",
        "--session-secret-key",
        "test_secret",
        "--session-backend",
        "memory",
        "--session-cookie-name",
        "test_session",
    ])
}

pub fn track(name: &str, album: &str, artists: &[&str], images: &[&str]) -> Option<PlaylistItem> {
    Some(PlaylistItem {
        track: Some(Track {
            name: name.to_string(),
            album: Some(Album {
                name: album.to_string(),
                images: images
                    .iter()
                    .map(|url| Image {
                        url: (*url).to_string(),
                        width: None,
                        height: None,
                    })
                    .collect(),
            }),
            artists: artists
                .iter()
                .map(|a| Artist {
                    name: (*a).to_string(),
                })
                .collect(),
        }),
    })
}

/// An item whose track was removed from the catalogue.
pub fn removed_track() -> Option<PlaylistItem> {
    Some(PlaylistItem { track: None })
}

pub fn playlist(id: &str, name: &str, total: u32) -> SimplifiedPlaylist {
    SimplifiedPlaylist {
        id: id.to_string(),
        name: name.to_string(),
        images: Some(vec![Image {
            url: format!("https://img.test/{id}.jpg"),
            width: Some(300),
            height: Some(300),
        }]),
        tracks: Some(TracksRef { total }),
    }
}

fn paginate<T: Clone>(all: &[Option<T>], page: Page) -> Paging<T> {
    let start = (page.offset as usize).min(all.len());
    let end = (start + page.limit as usize).min(all.len());
    Paging {
        items: all[start..end].to_vec(),
        next: (end < all.len()).then(|| format!("https://api.test/next?offset={end}")),
        total: u32::try_from(all.len()).unwrap(),
        offset: page.offset,
        limit: page.limit,
    }
}

/// In-process stand-in for Spotify.
#[derive(Debug)]
pub struct FakeSpotify {
    pub exchange_response: Mutex<TokenResponse>,
    /// `None` makes every refresh fail.
    pub refresh_response: Mutex<Option<TokenResponse>>,
    pub refresh_calls: AtomicUsize,
    pub api_calls: AtomicUsize,
    pub playlists: Vec<Option<SimplifiedPlaylist>>,
    pub items: Vec<Option<PlaylistItem>>,
}

impl Default for FakeSpotify {
    fn default() -> Self {
        Self {
            exchange_response: Mutex::new(TokenResponse {
                access_token: "access-1".to_string(),
                refresh_token: Some("refresh-1".to_string()),
                expires_in: Some(3600),
                scope: None,
            }),
            refresh_response: Mutex::new(Some(TokenResponse {
                access_token: "access-2".to_string(),
                refresh_token: None,
                expires_in: Some(3600),
                scope: None,
            })),
            refresh_calls: AtomicUsize::new(0),
            api_calls: AtomicUsize::new(0),
            playlists: (0..3)
                .map(|i| Some(playlist(&format!("p{i}"), &format!("Playlist {i}"), 10 + i)))
                .collect(),
            items: vec![
                track("Song A", "First Album", &["Alpha"], &["https://img.test/a-640.jpg", "https://img.test/a-64.jpg"]),
                removed_track(),
                track("Song B", "Second Album", &["Beta", "Gamma"], &[]),
            ],
        }
    }
}

impl FakeSpotify {
    /// Serves the `items` of raw Spotify paging documents, parsed the same
    /// way real responses are.
    pub fn from_raw_pages(playlists: serde_json::Value, items: serde_json::Value) -> Self {
        let playlists: Paging<SimplifiedPlaylist> = serde_json::from_value(playlists).unwrap();
        let items: Paging<PlaylistItem> = serde_json::from_value(items).unwrap();
        Self {
            playlists: playlists.items,
            items: items.items,
            ..Self::default()
        }
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn api_count(&self) -> usize {
        self.api_calls.load(Ordering::SeqCst)
    }

    fn check_token(&self, token: &str) -> Result<(), SpotifyError> {
        self.api_calls.fetch_add(1, Ordering::SeqCst);
        if token.is_empty() {
            return Err(SpotifyError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    fn authorize_url(&self, state: &str, code_challenge: &str) -> String {
        format!("https://accounts.test/authorize?state={state}&code_challenge={code_challenge}")
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, SpotifyError> {
        if code == "bad-code" || code_verifier.is_empty() {
            return Err(SpotifyError::Unauthorized);
        }
        Ok(self.exchange_response.lock().unwrap().clone())
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenResponse, SpotifyError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_response
            .lock()
            .unwrap()
            .clone()
            .ok_or(SpotifyError::Unauthorized)
    }

    async fn current_user_playlists(
        &self,
        access_token: &str,
        page: Page,
    ) -> Result<Paging<SimplifiedPlaylist>, SpotifyError> {
        self.check_token(access_token)?;
        Ok(paginate(&self.playlists, page))
    }

    async fn playlist(
        &self,
        access_token: &str,
        playlist_id: &str,
    ) -> Result<Playlist, SpotifyError> {
        self.check_token(access_token)?;
        Ok(Playlist {
            id: playlist_id.to_string(),
            name: format!("Playlist {playlist_id}"),
            tracks: paginate(&self.items, Page { offset: 0, limit: 100 }),
        })
    }

    async fn playlist_items(
        &self,
        access_token: &str,
        _playlist_id: &str,
        page: Page,
    ) -> Result<Paging<PlaylistItem>, SpotifyError> {
        self.check_token(access_token)?;
        Ok(paginate(&self.items, page))
    }
}

/// Session store whose contents tests can inspect and seed directly.
#[derive(Debug, Default, Clone)]
pub struct TestStore {
    pub entries: Arc<Mutex<HashMap<String, String>>>,
}

impl TestStore {
    pub fn ids(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }

    pub fn session(&self, id: &str) -> Option<SessionData> {
        self.entries
            .lock()
            .unwrap()
            .get(id)
            .map(|raw| serde_json::from_str(raw).unwrap())
    }

    pub fn put(&self, id: &str, data: &SessionData) {
        self.entries
            .lock()
            .unwrap()
            .insert(id.to_string(), serde_json::to_string(data).unwrap());
    }
}

#[async_trait]
impl SessionStore for TestStore {
    async fn get(&self, id: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.lock().unwrap().get(id).cloned())
    }

    async fn set(&self, id: &str, payload: &str) -> Result<(), SessionError> {
        self.entries
            .lock()
            .unwrap()
            .insert(id.to_string(), payload.to_string());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        self.entries.lock().unwrap().remove(id);
        Ok(())
    }
}

pub fn session_manager(store: &TestStore) -> SessionManager {
    SessionManager::new(Arc::new(store.clone()))
}

pub struct TestApp {
    pub url: String,
    pub client: reqwest::Client,
    pub spotify: Arc<FakeSpotify>,
    pub store: TestStore,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(FakeSpotify::default()).await
    }

    pub async fn spawn_with(spotify: FakeSpotify) -> Self {
        setup_tracing();

        let spotify = Arc::new(spotify);
        let store = TestStore::default();
        let state = AppState::new(get_test_config(), spotify.clone(), Arc::new(store.clone()));
        let app = api::app_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap();

        Self {
            url: format!("http://{addr}"),
            client,
            spotify,
            store,
        }
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response {
        let mut req = self.client.get(format!("{}{}", self.url, path));
        if let Some(cookie) = cookie {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        req.send().await.unwrap()
    }

    /// Starts a login and returns the session cookie and the issued `state`.
    pub async fn begin_login(&self) -> (String, String) {
        let resp = self.get("/spotify_login", None).await;
        assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER);
        let cookie = session_cookie(&resp).expect("login sets the session cookie");
        let state = query_param(location(&resp), "state").expect("authorize url carries state");
        (cookie, state)
    }

    /// Completes the OAuth round trip and returns an authenticated cookie.
    pub async fn login(&self) -> String {
        let (cookie, state) = self.begin_login().await;
        let resp = self
            .get(&format!("/spotify_callback?code=good-code&state={state}"), Some(&cookie))
            .await;
        assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
        cookie
    }

    /// The single session id in the store.
    pub fn only_session_id(&self) -> String {
        let ids = self.store.ids();
        assert_eq!(ids.len(), 1, "expected exactly one session");
        ids[0].clone()
    }
}

pub fn location(resp: &Response) -> &str {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// `name=value` of the first `Set-Cookie` header, ready for a `Cookie` header.
pub fn session_cookie(resp: &Response) -> Option<String> {
    resp.headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
