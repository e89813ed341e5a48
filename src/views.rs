//! Server-rendered HTML pages.
//!
//! Pages are small enough to be assembled with `format!`. Every value that
//! comes from Spotify goes through [`escape`] before it is embedded.

use crate::types::{PlaylistView, TrackView};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body_attrs: &str, content: &str, scripts: &[&str]) -> String {
    let scripts: String = scripts
        .iter()
        .map(|src| format!(r#"<script src="/static/js/{src}" defer></script>"#))
        .collect();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/css/portal.css">
{scripts}
</head>
<body{body_attrs}>
<header><a href="/">cratedigger</a></header>
<main>
{content}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

pub fn index(spotify_logged_in: bool) -> String {
    let content = if spotify_logged_in {
        r#"<h1>Spotify connected</h1>
<p><a href="/spotify_playlists">Browse your playlists</a></p>
<p><a href="/logout">Log out</a></p>"#
    } else {
        r#"<h1>Find your playlists on vinyl</h1>
<p><a href="/spotify_login">Connect Spotify</a></p>"#
    };
    layout("cratedigger", "", content, &[])
}

fn playlist_card(playlist: &PlaylistView) -> String {
    let cover = match &playlist.image {
        Some(url) => format!(
            r#"<img data-src="{}" loading="lazy" alt="playlist cover">"#,
            escape(url)
        ),
        None => r#"<svg width="72" height="72" aria-hidden="true"><rect width="24" height="24" rx="4"/></svg>"#
            .to_string(),
    };
    let name: &str = if playlist.name.is_empty() {
        "Untitled"
    } else {
        &playlist.name
    };

    format!(
        r#"<div class="card">
<div class="cover">{cover}</div>
<a class="title" href="/spotify_playlist/{id}">{name}</a>
<div class="meta">{total} tracks</div>
</div>"#,
        id = urlencoding::encode(&playlist.id),
        name = escape(name),
        total = playlist.tracks_total,
    )
}

/// First page of the playlist grid; `next_offset` is set while more pages exist.
pub fn playlists(items: &[PlaylistView], next_offset: Option<u32>, page_limit: u32) -> String {
    let cards: String = items.iter().map(playlist_card).collect();
    let more = match next_offset {
        Some(offset) => format!(
            r#"<button id="load-more" data-offset="{offset}">Load more playlists</button>
<div id="scroll-sentinel"></div>"#
        ),
        None => String::new(),
    };
    let content = format!(
        r#"<h1>Your playlists</h1>
<div id="playlists-grid">{cards}</div>
{more}"#
    );

    layout(
        "Your playlists",
        &format!(r#" data-page-limit="{page_limit}""#),
        &content,
        &["lazy-images.js", "infinite-scroll.js", "playlists.js"],
    )
}

fn track_row(track: &TrackView) -> String {
    let cover = if track.album_img.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img data-src="{}" loading="lazy" alt="album cover">"#,
            escape(&track.album_img)
        )
    };

    format!(
        r#"<li class="track">
<div class="cover">{cover}</div>
<div class="track-content">
<div class="title">{name}</div>
<div class="meta">{artists}</div>
<a href="{album_url}" target="_blank" rel="noopener">Find on Discogs</a>
<a href="{artist_url}" target="_blank" rel="noopener">Artist on Discogs</a>
</div>
</li>"#,
        name = escape(&track.name),
        artists = escape(&track.artists),
        album_url = escape(&track.discogs_url),
        artist_url = escape(&track.discogs_artist_url),
    )
}

pub fn playlist(
    playlist_id: &str,
    playlist_name: &str,
    tracks: &[TrackView],
    next_offset: Option<u32>,
    page_limit: u32,
) -> String {
    let rows: String = tracks.iter().map(track_row).collect();
    let more = match next_offset {
        Some(offset) => format!(
            r#"<button id="load-more" data-offset="{offset}">Load more tracks</button>
<div id="scroll-sentinel"></div>"#
        ),
        None => String::new(),
    };
    let content = format!(
        r#"<h1>{name}</h1>
<p><a href="/spotify_playlists">Back to playlists</a></p>
<ul id="tracks-list">{rows}</ul>
{more}"#,
        name = escape(playlist_name),
    );

    layout(
        playlist_name,
        &format!(
            r#" data-playlist-id="{}" data-page-limit="{page_limit}""#,
            escape(playlist_id)
        ),
        &content,
        &["lazy-images.js", "infinite-scroll.js", "tracks.js"],
    )
}
