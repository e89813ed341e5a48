//! Configuration management for the portal.
//!
//! Every setting is a `clap` argument backed by an environment variable, so the
//! server can be configured from flags, the process environment or a `.env`
//! file. Resolution order:
//! 1. Command-line flags (highest priority)
//! 2. Environment variables, including those loaded by [`load_env`]
//! 3. Defaults declared on the fields below

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

/// Loads environment variables from `.env` files.
///
/// A `.env` in the working directory is read first. Afterwards the file in
/// the platform-specific local data directory is read, which only fills in
/// variables that are still unset:
/// - Linux: `~/.local/share/cratedigger/.env`
/// - macOS: `~/Library/Application Support/cratedigger/.env`
/// - Windows: `%LOCALAPPDATA%/cratedigger/.env`
///
/// Missing files are not an error; the process environment may already carry
/// everything. A file that exists but cannot be parsed is.
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created or a
/// present `.env` file is malformed.
pub async fn load_env() -> Result<(), String> {
    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            return Err(e.to_string());
        }
    }

    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("cratedigger/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

#[derive(Clone, Debug, Parser)]
#[command(about = "Run the portal web server")]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub spotify: SpotifyConfig,

    #[command(flatten)]
    pub session: SessionConfig,

    #[command(flatten)]
    pub redis: RedisConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,

    /// Base URL of the Discogs marketplace search; the query is appended as `&q=`
    #[arg(
        long,
        env = "DISCOGS_SEARCH_URL",
        default_value = "https://www.discogs.com/sell/list?format=Vinyl&ships_from=United+States"
    )]
    pub discogs_search_url: String,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Directory served under `/static`
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct SpotifyConfig {
    /// Client ID of the application registered with Spotify
    #[arg(long = "spotify-client-id", env = "SPOTIFY_CLIENT_ID")]
    pub client_id: String,

    /// Client secret of the application registered with Spotify
    #[arg(
        long = "spotify-client-secret",
        env = "SPOTIFY_CLIENT_SECRET",
        hide_env_values = true
    )]
    pub client_secret: String,

    /// Callback URL registered with Spotify
    #[arg(
        long = "spotify-redirect-uri",
        env = "SPOTIFY_REDIRECT_URI",
        default_value = "http://127.0.0.1:5000/spotify_callback"
    )]
    pub redirect_uri: String,

    /// Space separated OAuth scopes requested at login
    #[arg(
        long = "spotify-scope",
        env = "SPOTIFY_API_AUTH_SCOPE",
        default_value = "playlist-read-private playlist-read-collaborative"
    )]
    pub scope: String,

    /// Authorization endpoint of the Spotify accounts service
    #[arg(
        long = "spotify-auth-url",
        env = "SPOTIFY_API_AUTH_URL",
        default_value = "https://accounts.spotify.com/authorize"
    )]
    pub auth_url: String,

    /// Token endpoint of the Spotify accounts service
    #[arg(
        long = "spotify-token-url",
        env = "SPOTIFY_API_TOKEN_URL",
        default_value = "https://accounts.spotify.com/api/token"
    )]
    pub token_url: String,

    /// Base URL of the Spotify Web API
    #[arg(
        long = "spotify-api-url",
        env = "SPOTIFY_API_URL",
        default_value = "https://api.spotify.com/v1"
    )]
    pub api_url: String,

    /// Timeout for every outbound Spotify request
    #[arg(long = "spotify-timeout-secs", env = "SPOTIFY_HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SessionBackend {
    /// Sessions live in Redis
    Redis,
    /// Sessions live in process memory and vanish on restart
    Memory,
}

#[derive(Clone, Debug, Args)]
pub struct SessionConfig {
    /// Secret used to sign the session cookie
    #[arg(long = "session-secret-key", env = "SESSION_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Where session documents are stored
    #[arg(long = "session-backend", env = "SESSION_BACKEND", value_enum, default_value_t = SessionBackend::Redis)]
    pub backend: SessionBackend,

    /// Time-to-live of a session document in seconds
    #[arg(long = "session-ttl-secs", env = "SESSION_TTL_SECS", default_value_t = 604_800)]
    pub ttl_secs: u64,

    /// Name of the session cookie
    #[arg(long = "session-cookie-name", env = "SESSION_COOKIE_NAME", default_value = "cratedigger_session")]
    pub cookie_name: String,

    /// Only send the session cookie over HTTPS
    #[arg(long = "session-cookie-secure", env = "SESSION_COOKIE_SECURE")]
    pub cookie_secure: bool,
}

#[derive(Clone, Debug, Args)]
pub struct RedisConfig {
    #[arg(id = "redis_host", long = "redis-host", env = "REDIS_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(id = "redis_port", long = "redis-port", env = "REDIS_PORT", default_value_t = 6379)]
    pub port: u16,

    #[arg(long = "redis-password", env = "REDIS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long = "redis-db", env = "REDIS_DB", default_value_t = 0)]
    pub db: i64,
}

impl RedisConfig {
    /// Connection URL in the form understood by `redis::Client::open`.
    #[must_use]
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) if !password.is_empty() => format!(
                "redis://:{}@{}:{}/{}",
                urlencoding::encode(password),
                self.host,
                self.port,
                self.db
            ),
            _ => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Enable debug logging
    #[arg(long, env = "DEBUG")]
    pub debug: bool,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
