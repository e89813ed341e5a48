use crate::types::{Image, PlaylistItem, PlaylistView, SimplifiedPlaylist, TrackView};

/// Builds Discogs marketplace search links.
#[derive(Debug, Clone)]
pub struct MarketplaceSearch {
    base_url: String,
}

impl MarketplaceSearch {
    /// `base_url` already carries a query string; search terms are appended as `&q=`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        format!("{}&q={}", self.base_url, urlencoding::encode(query))
    }
}

/// Maps raw playlist items to track views.
///
/// `null` entries and items without a track are dropped. A track without an
/// album gets no cover and is searched by its artists only.
pub fn simplify(items: &[Option<PlaylistItem>], search: &MarketplaceSearch) -> Vec<TrackView> {
    items
        .iter()
        .filter_map(|item| item.as_ref()?.track.as_ref())
        .map(|track| {
            let artists = track
                .artists
                .iter()
                .map(|artist| artist.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let (album_name, album_img) = match &track.album {
                Some(album) => (
                    album.name.as_str(),
                    smallest_image(&album.images).unwrap_or_default(),
                ),
                None => ("", String::new()),
            };
            let album_query = format!("{album_name} {artists}");

            TrackView {
                name: track.name.clone(),
                album_img,
                discogs_url: search.search_url(album_query.trim()),
                discogs_artist_url: search.search_url(&artists),
                artists,
            }
        })
        .collect()
}

/// Maps raw playlists to playlist views, dropping `null` entries.
pub fn summarize_playlists(playlists: &[Option<SimplifiedPlaylist>]) -> Vec<PlaylistView> {
    playlists
        .iter()
        .flatten()
        .map(|playlist| PlaylistView {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
            tracks_total: playlist.tracks.as_ref().map_or(0, |t| t.total),
            image: playlist.images.as_deref().and_then(smallest_image),
        })
        .collect()
}

// Spotify orders images largest first.
fn smallest_image(images: &[Image]) -> Option<String> {
    images.last().map(|image| image.url.clone())
}
