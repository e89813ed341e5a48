use serde::{Deserialize, Serialize};

/// Lifetime assumed for an access token when the accounts service does not
/// report `expires_in`. This is an approximation, not a provider contract.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Seconds before the recorded expiry at which a token counts as stale.
pub const STALENESS_BUFFER_SECS: i64 = 30;

/// Largest page the Spotify API serves for `/me/playlists`.
pub const PLAYLIST_PAGE_LIMIT: u32 = 50;

/// Largest page the Spotify API serves for `/playlists/{id}/tracks`.
pub const TRACK_PAGE_LIMIT: u32 = 100;

/// Response body of the accounts service token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// The credential stored in a browser session and used to call the Spotify API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// OAuth handshake data kept in the session between login and callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub state: String,
    pub code_verifier: String,
}

/// Everything the portal keeps about one browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify: Option<Credential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<PendingAuthorization>,
}

/// Offset/limit pair forwarded verbatim to the Spotify API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

/// Spotify's generic offset-based paging object.
///
/// Spotify occasionally sends `null` in place of an item (deleted or
/// unavailable content). Those entries are kept as `None` so a page still
/// reports how many items the provider returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<Option<T>>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksRef {
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedPlaylist {
    pub id: String,
    #[serde(default)]
    pub name: String,
    // Spotify sends `null` instead of an empty list for playlists without a cover.
    #[serde(default)]
    pub images: Option<Vec<Image>>,
    #[serde(default)]
    pub tracks: Option<TracksRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub tracks: Paging<PlaylistItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub album: Option<Album>,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
}

/// UI and JSON ready representation of one playlist track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackView {
    pub name: String,
    pub album_img: String,
    pub artists: String,
    pub discogs_url: String,
    pub discogs_artist_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistView {
    pub id: String,
    pub name: String,
    pub tracks_total: u32,
    pub image: Option<String>,
}

/// Body of `GET /spotify_playlists_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistsPage {
    pub items: Vec<PlaylistView>,
    pub next: Option<String>,
    pub total: u32,
    pub offset: u32,
    pub limit: u32,
}

/// Body of `GET /spotify_playlist_tracks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksPage {
    pub items: Vec<TrackView>,
    pub offset: u32,
    pub limit: u32,
    pub total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u32>,
}
