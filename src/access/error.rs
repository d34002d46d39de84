//! Access control conditions

use super::role::Role;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Session role is not part of the permission mapping
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// A recognized role maps to zero resources
    #[error("No accessible resource for role {0}")]
    NoAccessibleResource(Role),

    /// Session state could not be read; callers treat the session as absent
    #[error("Session store unavailable: {0}")]
    SessionStoreUnavailable(String),

    #[error("Invalid permission mapping: {0}")]
    InvalidMapping(String),
}
