use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::{
    error::SpotifyError,
    spotify::SpotifyClient,
    types::{Page, Paging, Playlist, PlaylistItem, SimplifiedPlaylist},
};

impl SpotifyClient {
    /// Retrieves a page of the authenticated user's playlists.
    ///
    /// Calls `GET /me/playlists` with the given offset and limit. Playlists the
    /// user owns and the ones they follow are both included.
    ///
    /// # Arguments
    ///
    /// * `token` - Valid access token for Spotify API authentication
    /// * `page` - Offset and limit (1-50) forwarded verbatim
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Paging<SimplifiedPlaylist>)` - The page; `null` entries are kept as `None`
    /// - `Err(SpotifyError)` - `Unauthorized` on 401, `Http` on any other failure
    pub(crate) async fn get_current_user_playlists(
        &self,
        token: &str,
        page: Page,
    ) -> Result<Paging<SimplifiedPlaylist>, SpotifyError> {
        let api_url = format!("{uri}/me/playlists", uri = self.config.api_url);
        self.get_json(token, &api_url, &page_query(page)).await
    }

    /// Retrieves a playlist with the first page of its items embedded.
    ///
    /// # Arguments
    ///
    /// * `token` - Valid access token for Spotify API authentication
    /// * `playlist_id` - Spotify ID of the playlist
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Playlist)` - Name, id and the first page of items (up to 100)
    /// - `Err(SpotifyError)` - `Unauthorized` on 401, `Http` on any other failure
    pub(crate) async fn get_playlist(
        &self,
        token: &str,
        playlist_id: &str,
    ) -> Result<Playlist, SpotifyError> {
        let api_url = format!(
            "{uri}/playlists/{id}",
            uri = self.config.api_url,
            id = urlencoding::encode(playlist_id)
        );
        self.get_json(token, &api_url, &[]).await
    }

    /// Retrieves a page of a playlist's items via `GET /playlists/{id}/tracks`.
    ///
    /// # Arguments
    ///
    /// * `token` - Valid access token for Spotify API authentication
    /// * `playlist_id` - Spotify ID of the playlist
    /// * `page` - Offset and limit (1-100) forwarded verbatim
    ///
    /// # Errors
    ///
    /// `Unauthorized` on 401, `Http` on any other failure.
    pub(crate) async fn get_playlist_items(
        &self,
        token: &str,
        playlist_id: &str,
        page: Page,
    ) -> Result<Paging<PlaylistItem>, SpotifyError> {
        let api_url = format!(
            "{uri}/playlists/{id}/tracks",
            uri = self.config.api_url,
            id = urlencoding::encode(playlist_id)
        );
        self.get_json(token, &api_url, &page_query(page)).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        api_url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SpotifyError> {
        let response = self
            .http
            .get(api_url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(SpotifyError::Unauthorized);
        }

        Ok(response.error_for_status()?.json::<T>().await?)
    }
}

fn page_query(page: Page) -> [(&'static str, String); 2] {
    [
        ("offset", page.offset.to_string()),
        ("limit", page.limit.to_string()),
    ]
}
