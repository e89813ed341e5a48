mod auth;
mod session;
mod tracks;

pub use auth::TokenManager;
pub use session::MemorySessionStore;
pub use session::RedisSessionStore;
pub use session::SessionManager;
pub use session::SessionStore;
pub use session::migrate_legacy_credential;
pub use tracks::MarketplaceSearch;
pub use tracks::simplify;
pub use tracks::summarize_playlists;
