//! Session lifecycle accessor
//!
//! `init` at login, `read` on every access check, `teardown` at logout. Nothing else
//! in the crate touches the store directly.

use super::{
    model::{session_key, Session},
    store::SessionStore,
};
use crate::access::AccessError;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionAccessor {
    store: Arc<dyn SessionStore>,
}

impl SessionAccessor {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn init(&self, session: &Session) -> Result<(), AccessError> {
        self.store.save(session).await?;

        tracing::info!(
            session_id = %session.session_id,
            username = %session.username,
            role = %session.role,
            "Session created"
        );
        Ok(())
    }

    /// Current session, or `None` when absent, expired or unreadable
    pub async fn read(&self, session_id: &Uuid) -> Option<Session> {
        let key = session_key(session_id);

        match self.store.load(&key).await {
            Ok(Some(session)) if session.is_expired_at(Utc::now()) => {
                tracing::debug!(session_id = %session_id, "Session expired");
                if let Err(e) = self.store.remove(&key).await {
                    tracing::warn!(error = %e, "Failed to remove expired session");
                }
                None
            }
            Ok(session) => session,
            Err(e) => {
                // 会话不可读时按匿名处理
                tracing::warn!(session_id = %session_id, error = %e, "Session store unavailable, treating as anonymous");
                metrics::counter!("session_store_errors_total").increment(1);
                None
            }
        }
    }

    pub async fn teardown(&self, session_id: &Uuid) -> Result<bool, AccessError> {
        let removed = self.store.remove(&session_key(session_id)).await?;

        tracing::info!(session_id = %session_id, removed, "Session destroyed");
        Ok(removed)
    }

    pub async fn purge_expired(&self) -> Result<u64, AccessError> {
        self.store.purge_expired().await
    }
}
