use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use redis::AsyncCommands;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{error::SessionError, types::SessionData};

/// Raw key-value backend holding serialized session documents.
#[async_trait]
pub trait SessionStore: Send + Sync + Debug {
    async fn get(&self, id: &str) -> Result<Option<String>, SessionError>;
    async fn set(&self, id: &str, payload: &str) -> Result<(), SessionError>;
    async fn delete(&self, id: &str) -> Result<(), SessionError>;
}

#[derive(Clone)]
pub struct RedisSessionStore {
    conn: redis::aio::ConnectionManager,
    prefix: String,
    ttl_secs: u64,
}

impl Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore")
            .field("prefix", &self.prefix)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    /// Opens a managed connection to the session cache.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the first connection fails.
    pub async fn connect(url: &str, ttl_secs: u64) -> Result<Self, SessionError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self {
            conn,
            prefix: "session:".to_string(),
            ttl_secs,
        })
    }

    fn key(&self, id: &str) -> String {
        format!("{}{id}", self.prefix)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, id: &str) -> Result<Option<String>, SessionError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(self.key(id)).await?;
        Ok(payload)
    }

    async fn set(&self, id: &str, payload: &str) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(self.key(id), payload, self.ttl_secs).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.key(id)).await?;
        Ok(())
    }
}

/// Process-local store for development and tests.
///
/// Entries expire after the configured TTL like Redis keys do; expired
/// entries are dropped on read and swept on every write.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, (String, Option<Instant>)>>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: Arc::default(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &str) -> Result<Option<String>, SessionError> {
        let mut entries = self.entries.lock().await;
        if let Some((payload, expires_at)) = entries.get(id) {
            if live(*expires_at, Instant::now()) {
                return Ok(Some(payload.clone()));
            }
        }
        entries.remove(id);
        Ok(None)
    }

    async fn set(&self, id: &str, payload: &str) -> Result<(), SessionError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (_, expires_at)| live(*expires_at, now));
        // A TTL too large for `Instant` never expires.
        entries.insert(id.to_string(), (payload.to_string(), now.checked_add(self.ttl)));
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        self.entries.lock().await.remove(id);
        Ok(())
    }
}

fn live(expires_at: Option<Instant>, now: Instant) -> bool {
    expires_at.is_none_or(|at| now < at)
}

/// Typed access to session documents on top of a [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Loads a session document, or an empty one if the id is unknown.
    ///
    /// Documents written before the credential field was renamed are migrated
    /// and written back once.
    pub async fn load(&self, id: &str) -> Result<SessionData, SessionError> {
        let Some(payload) = self.store.get(id).await? else {
            return Ok(SessionData::default());
        };

        let mut raw: Value = serde_json::from_str(&payload)?;
        let migrated = migrate_legacy_credential(&mut raw);
        let data: SessionData = serde_json::from_value(raw)?;

        if migrated {
            tracing::info!("Migrated legacy session credential");
            self.save(id, &data).await?;
        }

        Ok(data)
    }

    pub async fn save(&self, id: &str, data: &SessionData) -> Result<(), SessionError> {
        let payload = serde_json::to_string(data)?;
        self.store.set(id, &payload).await
    }

    pub async fn destroy(&self, id: &str) -> Result<(), SessionError> {
        self.store.delete(id).await
    }
}

/// Renames a stored `spotify.token` to `spotify.access_token`.
///
/// Returns `true` if the document was changed. A document that already has
/// `access_token` only loses the stale legacy key.
pub fn migrate_legacy_credential(raw: &mut Value) -> bool {
    let Some(credential) = raw.get_mut("spotify").and_then(Value::as_object_mut) else {
        return false;
    };
    let Some(legacy) = credential.remove("token") else {
        return false;
    };
    if !credential.contains_key("access_token") {
        credential.insert("access_token".to_string(), legacy);
    }
    true
}
