//! Role-based access control
//!
//! The resolver owns the permission mapping; the navigation renderer and the route
//! guard both consume the same resolver so the two can never disagree.
//!
//! The role comes from the server-side session created at login. Decisions made here
//! are only as trustworthy as that session; data endpoints must still authorize on
//! their own.

pub mod check;
pub mod error;
pub mod guard;
pub mod mapping;
pub mod navigation;
pub mod resolver;
pub mod resource;
pub mod role;

pub use check::self_check;
pub use error::AccessError;
pub use guard::{DenyReason, GuardDecision, GuardRun, GuardState, RouteGuard, UnknownRolePolicy};
pub use mapping::{PermissionMapping, MAPPING_VERSION};
pub use navigation::{NavEntry, NavigationRenderer};
pub use resolver::AccessResolver;
pub use resource::Resource;
pub use role::{Role, RoleClaim};
