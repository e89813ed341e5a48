//! cratedigger library
//!
//! A small web portal that signs a user in with Spotify, lists their playlists
//! and tracks, and links every track to a Discogs marketplace search for the
//! record on vinyl.
//!
//! # Modules
//!
//! - `api` - HTTP routes, handlers and application state
//! - `config` - Configuration from flags, environment and `.env` files
//! - `error` - Error taxonomy and its mapping to HTTP responses
//! - `management` - Session storage, token lifecycle and track adaptation
//! - `server` - Startup wiring and the HTTP listener
//! - `spotify` - Spotify accounts service and Web API client
//! - `telemetry` - `tracing` subscriber setup
//! - `types` - Data structures and type definitions
//! - `utils` - Random tokens, PKCE helpers and query parsing
//! - `views` - Server-rendered HTML pages
//!
//! # Example
//!
//! ```
//! use clap::Parser;
//! use cratedigger::{config::{self, Config}, server};
//!
//! #[tokio::main]
//! async fn main() -> cratedigger::Res<()> {
//!     config::load_env().await?;
//!     server::start_api_server(Config::parse()).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod telemetry;
pub mod types;
pub mod utils;
pub mod views;

/// A convenient Result type alias for startup code that may fail.
///
/// Request handling uses [`error::Result`] instead, whose error type knows how
/// to turn itself into an HTTP response.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
