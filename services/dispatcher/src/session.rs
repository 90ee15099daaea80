//! Per-client session state
//!
//! Handlers never touch a shared session object. The router loads the
//! caller's [`SessionContext`], passes it into the handler by value, and
//! persists whatever context the handler hands back if it changed. A
//! cookie id is only reused when the store already holds it and the
//! player behind it stays the same.

use std::collections::HashMap;
use std::sync::Arc;

use common::cache::RedisPool;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// Errors raised by a session backend
#[derive(Error, Debug)]
pub enum SessionError {
    /// The backend could not be reached or rejected the command
    #[error("Session store error: {0}")]
    Backend(anyhow::Error),

    /// A stored session could not be encoded or decoded
    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Identity and game references carried across requests for one client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub player_id: Option<i64>,
    pub username: Option<String>,
    pub token: Option<String>,
    pub game_id: Option<i64>,
    pub game_token: Option<String>,
}

impl SessionContext {
    /// Record a successful login. Game references belonging to a different
    /// player are dropped.
    pub fn record_login(&mut self, player_id: i64, username: &str, token: &str) {
        if self.player_id != Some(player_id) {
            self.game_id = None;
            self.game_token = None;
        }
        self.player_id = Some(player_id);
        self.username = Some(username.to_string());
        self.token = Some(token.to_string());
    }

    /// Record a freshly created game
    pub fn record_game(&mut self, game_id: i64, game_token: &str) {
        self.game_id = Some(game_id);
        self.game_token = Some(game_token.to_string());
    }
}

/// Session store keeping contexts in Redis under `session:<id>`
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_pool: RedisPool,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(redis_pool: RedisPool, ttl_seconds: u64) -> Self {
        Self {
            redis_pool,
            ttl_seconds,
        }
    }

    fn key(session_id: &str) -> String {
        format!("session:{}", session_id)
    }

    async fn load(&self, session_id: &str) -> SessionResult<Option<SessionContext>> {
        let raw = self
            .redis_pool
            .get(&Self::key(session_id))
            .await
            .map_err(SessionError::Backend)?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session_id: &str, context: &SessionContext) -> SessionResult<()> {
        let raw = serde_json::to_string(context)?;
        self.redis_pool
            .set_ex(&Self::key(session_id), &raw, self.ttl_seconds)
            .await
            .map_err(SessionError::Backend)
    }
}

/// In-process session store. Entries live until the process exits.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, SessionContext>>>,
}

impl MemorySessionStore {
    async fn load(&self, session_id: &str) -> SessionResult<Option<SessionContext>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, context: &SessionContext) -> SessionResult<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(session_id.to_string(), context.clone());
        Ok(())
    }
}

/// Session backend selected at startup
#[derive(Clone)]
pub enum SessionStore {
    Redis(RedisSessionStore),
    Memory(MemorySessionStore),
}

impl SessionStore {
    /// Load the context stored for `session_id`, if any
    pub async fn load(&self, session_id: &str) -> SessionResult<Option<SessionContext>> {
        match self {
            SessionStore::Redis(store) => store.load(session_id).await,
            SessionStore::Memory(store) => store.load(session_id).await,
        }
    }

    /// Persist `context` under `session_id`
    pub async fn save(&self, session_id: &str, context: &SessionContext) -> SessionResult<()> {
        info!("Saving session: {}", session_id);

        match self {
            SessionStore::Redis(store) => store.save(session_id, context).await,
            SessionStore::Memory(store) => store.save(session_id, context).await,
        }
    }
}
