//! Session record

use crate::access::RoleClaim;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known key prefix of session records in the store
pub const SESSION_KEY_PREFIX: &str = "backoffice:session:";

/// Store key of a session
pub fn session_key(session_id: &Uuid) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, session_id)
}

/// Authenticated identity held for the lifetime of a login
///
/// `role` keeps the raw value read from the user store; classification against the
/// permission mapping happens at every access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
    pub location_id: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        user_id: Uuid,
        username: &str,
        role: &str,
        location_id: Option<String>,
        ttl_secs: u64,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            username: username.to_string(),
            role: role.to_string(),
            location_id,
            issued_at: now,
            expires_at: now + Duration::seconds(ttl_secs as i64),
        }
    }

    pub fn key(&self) -> String {
        session_key(&self.session_id)
    }

    pub fn role_claim(&self) -> RoleClaim {
        RoleClaim::classify(Some(self.role.as_str()))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
