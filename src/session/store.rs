//! Session persistence
//!
//! Stores keep sessions as serialized JSON under `backoffice:session:{id}`. A payload
//! that no longer decodes is reported as `SessionStoreUnavailable`.

use super::model::Session;
use crate::access::AccessError;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sqlx::PgPool;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<Session>, AccessError>;

    async fn save(&self, session: &Session) -> Result<(), AccessError>;

    /// Returns whether a record was removed
    async fn remove(&self, key: &str) -> Result<bool, AccessError>;

    /// Drop expired records, returning how many were removed
    async fn purge_expired(&self) -> Result<u64, AccessError>;
}

pub(crate) fn encode(session: &Session) -> Result<String, AccessError> {
    serde_json::to_string(session)
        .map_err(|e| AccessError::SessionStoreUnavailable(format!("failed to encode session: {}", e)))
}

pub(crate) fn decode(payload: &str) -> Result<Session, AccessError> {
    serde_json::from_str(payload).map_err(|e| {
        AccessError::SessionStoreUnavailable(format!("corrupted session payload: {}", e))
    })
}

// ==================== 内存存储 ====================

/// Process-local store, used in development and tests
#[derive(Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a raw payload under `key`, bypassing encoding
    pub fn insert_raw(&self, key: &str, payload: &str) {
        self.entries.insert(key.to_string(), payload.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, key: &str) -> Result<Option<Session>, AccessError> {
        match self.entries.get(key) {
            Some(payload) => decode(payload.value()).map(Some),
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session) -> Result<(), AccessError> {
        let payload = encode(session)?;
        self.entries.insert(session.key(), payload);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, AccessError> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn purge_expired(&self) -> Result<u64, AccessError> {
        let now = Utc::now();
        let mut purged = 0u64;
        // Undecodable payloads are dropped along with expired ones
        self.entries.retain(|_, payload| {
            let keep = match decode(payload) {
                Ok(session) => !session.is_expired_at(now),
                Err(_) => false,
            };
            if !keep {
                purged += 1;
            }
            keep
        });
        Ok(purged)
    }
}

// ==================== PostgreSQL 存储 ====================

pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn unavailable(e: sqlx::Error) -> AccessError {
    AccessError::SessionStoreUnavailable(e.to_string())
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load(&self, key: &str) -> Result<Option<Session>, AccessError> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM sessions WHERE session_key = $1")
                .bind(key)
                .fetch_optional(&self.db)
                .await
                .map_err(unavailable)?;

        payload.as_deref().map(decode).transpose()
    }

    async fn save(&self, session: &Session) -> Result<(), AccessError> {
        let payload = encode(session)?;

        sqlx::query(
            r#"
            INSERT INTO sessions (session_key, user_id, payload, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_key)
            DO UPDATE SET payload = EXCLUDED.payload, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(session.key())
        .bind(session.user_id)
        .bind(payload)
        .bind(session.expires_at)
        .bind(session.issued_at)
        .execute(&self.db)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, AccessError> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_key = $1")
            .bind(key)
            .execute(&self.db)
            .await
            .map_err(unavailable)?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self) -> Result<u64, AccessError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < NOW()")
            .execute(&self.db)
            .await
            .map_err(unavailable)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_memory_store_save_load_remove() {
        let store = MemorySessionStore::new();
        let session = Session::new(Uuid::new_v4(), "anna", "staff", Some("HN-01".to_string()), 60);

        store.save(&session).await.unwrap();
        assert_eq!(store.load(&session.key()).await.unwrap(), Some(session.clone()));

        assert!(store.remove(&session.key()).await.unwrap());
        assert!(!store.remove(&session.key()).await.unwrap());
        assert_eq!(store.load(&session.key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupted_payload_is_unavailable() {
        let store = MemorySessionStore::new();
        store.insert_raw("backoffice:session:broken", "{not json");

        let result = store.load("backoffice:session:broken").await;
        assert!(matches!(result, Err(AccessError::SessionStoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemorySessionStore::new();
        let live = Session::new(Uuid::new_v4(), "anna", "staff", None, 3600);
        let mut stale = Session::new(Uuid::new_v4(), "bob", "owner", None, 3600);
        stale.expires_at = Utc::now() - chrono::Duration::seconds(1);

        store.save(&live).await.unwrap();
        store.save(&stale).await.unwrap();
        store.insert_raw("backoffice:session:broken", "[]");

        assert_eq!(store.purge_expired().await.unwrap(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.load(&live.key()).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_purge_while_sessions_are_saved() {
        let store = Arc::new(MemorySessionStore::new());
        let mut stale = Session::new(Uuid::new_v4(), "bob", "owner", None, 3600);
        stale.expires_at = Utc::now() - chrono::Duration::seconds(1);
        store.save(&stale).await.unwrap();

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..2_000 {
                    let live = Session::new(Uuid::new_v4(), "anna", "staff", None, 3600);
                    store.save(&live).await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut purged = 0;
        for _ in 0..2_000 {
            purged += store.purge_expired().await.unwrap();
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();

        // 只有过期会话被清理，新写入的会话都保留
        assert_eq!(purged, 1);
        assert_eq!(store.len(), 2_000);
    }
}
