use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::{
    api::{AppState, session},
    error::{AppError, Result},
    management::{TokenManager, simplify, summarize_playlists},
    types::{Page, PLAYLIST_PAGE_LIMIT, PlaylistsPage, TRACK_PAGE_LIMIT, TracksPage},
    utils, views,
};

async fn access_token(state: &AppState, jar: &SignedCookieJar) -> Result<String> {
    let session_id = session::session_id(jar, &state.config.session);
    let token = TokenManager::new(&state.sessions, state.spotify.as_ref())
        .ensure_valid_credential(session_id.as_deref())
        .await?;
    Ok(token)
}

/// Offset of the page after one that started at `offset` and held `returned` items.
pub fn next_offset(offset: u32, returned: usize) -> Option<u32> {
    if returned == 0 {
        return None;
    }
    u32::try_from(returned).ok().map(|n| offset.saturating_add(n))
}

/// HTML grid with the first page of the user's playlists.
///
/// Further pages are fetched by the browser from [`playlists_data`].
///
/// # Errors
///
/// Redirects to login when the session has no usable credential;
/// [`AppError::Spotify`] when the playlist request fails.
pub async fn playlists_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<Html<String>> {
    let token = access_token(&state, &jar).await?;
    let page = Page {
        offset: 0,
        limit: PLAYLIST_PAGE_LIMIT,
    };
    let res = state.spotify.current_user_playlists(&token, page).await?;

    let items = summarize_playlists(&res.items);
    let more = res
        .next
        .as_ref()
        .and_then(|_| next_offset(page.offset, res.items.len()));
    Ok(Html(views::playlists(&items, more, PLAYLIST_PAGE_LIMIT)))
}

/// Paginated playlists as JSON on `GET /spotify_playlists_data?offset&limit`.
///
/// # Arguments
///
/// * `offset` - Defaults to 0
/// * `limit` - 1-50, defaults to 50
///
/// # Returns
///
/// `{items, next, total, offset, limit}` where `offset` and `limit` echo the
/// request and `next` is Spotify's next-page URL, if any.
///
/// # Errors
///
/// [`AppError::BadRequest`] for malformed paging, checked before the session.
pub async fn playlists_data(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PlaylistsPage>> {
    let page = utils::parse_page(&params, PLAYLIST_PAGE_LIMIT).map_err(AppError::BadRequest)?;
    let token = access_token(&state, &jar).await?;
    let res = state.spotify.current_user_playlists(&token, page).await?;

    Ok(Json(PlaylistsPage {
        items: summarize_playlists(&res.items),
        next: res.next,
        total: res.total,
        offset: page.offset,
        limit: page.limit,
    }))
}

/// HTML track list of one playlist with Discogs search links.
pub async fn playlist_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(playlist_id): Path<String>,
) -> Result<Html<String>> {
    let token = access_token(&state, &jar).await?;
    let playlist = state.spotify.playlist(&token, &playlist_id).await?;

    let tracks = simplify(&playlist.tracks.items, &state.search);
    let more = playlist
        .tracks
        .next
        .as_ref()
        .and_then(|_| next_offset(0, playlist.tracks.items.len()));
    Ok(Html(views::playlist(
        &playlist.id,
        &playlist.name,
        &tracks,
        more,
        TRACK_PAGE_LIMIT,
    )))
}

/// Paginated track views as JSON on
/// `GET /spotify_playlist_tracks?playlist_id&offset&limit`.
///
/// # Arguments
///
/// * `playlist_id` - Required
/// * `offset` - Defaults to 0
/// * `limit` - 1-100, defaults to 100
///
/// # Returns
///
/// `{items, offset, limit, total, next_offset}`. `next_offset` advances by
/// the number of raw items Spotify returned, dropped ones included, and is
/// absent once a page comes back empty.
///
/// # Errors
///
/// [`AppError::BadRequest`] for a missing `playlist_id` or malformed paging.
pub async fn playlist_tracks(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TracksPage>> {
    let playlist_id = params
        .get("playlist_id")
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("playlist_id is required".to_string()))?
        .to_string();
    let page = utils::parse_page(&params, TRACK_PAGE_LIMIT).map_err(AppError::BadRequest)?;

    let token = access_token(&state, &jar).await?;
    let res = state
        .spotify
        .playlist_items(&token, &playlist_id, page)
        .await?;

    Ok(Json(TracksPage {
        items: simplify(&res.items, &state.search),
        offset: page.offset,
        limit: page.limit,
        total: res.total,
        next_offset: next_offset(page.offset, res.items.len()),
    }))
}
