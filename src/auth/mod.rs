//! Authentication module

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtService};
pub use middleware::{extract_token, session_middleware, CurrentSession};
pub use password::PasswordHasher;
