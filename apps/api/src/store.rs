//! Session store — keyed JSON blobs with per-key expiry.
//!
//! Every piece of session state lives under a key namespaced by session id
//! (see [`keys`]). The store is always injected as `Arc<dyn SessionStore>` so
//! the engine never touches a concrete backend; production uses Redis, tests
//! use an in-memory fake.
//!
//! Writes carry the session TTL; reads never refresh it. There is no
//! read-modify-write locking — concurrent writers to the same session are
//! last-write-wins, acceptable for the single-user-per-session access pattern.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Keyed store with per-key expiry. `expire` on a missing key is a no-op.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> Result<(), StoreError>;
    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<(), StoreError>;
}

/// Fetches and deserializes one JSON blob. `None` means the key is absent
/// (never written, or expired).
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn SessionStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serializes and writes one JSON blob, refreshing its TTL.
pub async fn set_json<T: Serialize>(
    store: &dyn SessionStore,
    key: &str,
    value: &T,
    ttl_seconds: u64,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw, ttl_seconds).await
}

/// Redis-backed store. Connections are multiplexed per call; the client
/// itself is cheap to clone.
pub struct RedisSessionStore {
    client: redis::Client,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        use redis::AsyncCommands;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> Result<(), StoreError> {
        use redis::AsyncCommands;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        use redis::AsyncCommands;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: i64 = conn.expire(key, ttl_seconds as i64).await?;
        Ok(())
    }
}

/// Key namespace: one key per logical field, all sharing the session's
/// expiry clock.
pub mod keys {
    use uuid::Uuid;

    pub fn meta(session_id: Uuid) -> String {
        format!("interview:{session_id}:meta")
    }

    pub fn history(session_id: Uuid) -> String {
        format!("interview:{session_id}:history")
    }

    pub fn performance(session_id: Uuid) -> String {
        format!("interview:{session_id}:performance")
    }

    pub fn persona(session_id: Uuid) -> String {
        format!("interview:{session_id}:persona")
    }

    pub fn feedback(session_id: Uuid) -> String {
        format!("interview:{session_id}:feedback")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_keys_are_namespaced_by_session_id() {
        let id = Uuid::new_v4();
        assert_eq!(keys::meta(id), format!("interview:{id}:meta"));
        assert_eq!(keys::history(id), format!("interview:{id}:history"));
        assert_eq!(keys::performance(id), format!("interview:{id}:performance"));
        assert_eq!(keys::persona(id), format!("interview:{id}:persona"));
        assert_eq!(keys::feedback(id), format!("interview:{id}:feedback"));
    }

    #[test]
    fn test_keys_for_distinct_sessions_never_collide() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(keys::meta(a), keys::meta(b));
        assert_ne!(keys::history(a), keys::feedback(a));
    }
}
