//! Session state of authenticated users

pub mod accessor;
pub mod model;
pub mod store;

pub use accessor::SessionAccessor;
pub use model::{session_key, Session, SESSION_KEY_PREFIX};
pub use store::{MemorySessionStore, PgSessionStore, SessionStore};
