//! Route guard
//!
//! Re-evaluated on every navigation; nothing survives a path change. A guard run
//! starts in `Checking` and ends in `Authorized` or `Denied`, passing through
//! `Redirecting` when the requested path is outside the role's grants.

use super::{error::AccessError, resolver::AccessResolver, role::RoleClaim};
use crate::session::Session;
use serde::{Deserialize, Serialize};

/// Policy for sessions whose role is missing or not part of the mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownRolePolicy {
    /// Fail open: navigate as if no guard were installed
    #[default]
    Allow,
    /// Fail closed: show the access-denied state
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    Checking,
    Authorized,
    Redirecting,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    UnknownRole,
    NoAccessibleResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    Authorized,
    Redirect { location: String },
    Denied { reason: DenyReason },
}

impl GuardDecision {
    /// State the guard settles in after this decision
    pub fn state(&self) -> GuardState {
        match self {
            GuardDecision::Authorized => GuardState::Authorized,
            GuardDecision::Redirect { .. } => GuardState::Redirecting,
            GuardDecision::Denied { .. } => GuardState::Denied,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GuardDecision::Authorized => "authorized",
            GuardDecision::Redirect { .. } => "redirect",
            GuardDecision::Denied { .. } => "denied",
        }
    }
}

/// Outcome of following a navigation through the guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardRun {
    /// Path the navigation ended on
    pub path: String,
    pub decision: GuardDecision,
    pub states: Vec<GuardState>,
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    resolver: AccessResolver,
    on_unknown_role: UnknownRolePolicy,
}

impl RouteGuard {
    pub fn new(resolver: AccessResolver, on_unknown_role: UnknownRolePolicy) -> Self {
        Self {
            resolver,
            on_unknown_role,
        }
    }

    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }

    pub fn policy(&self) -> UnknownRolePolicy {
        self.on_unknown_role
    }

    /// Decide a single navigation to `path`
    pub fn evaluate(&self, session: Option<&Session>, path: &str) -> GuardDecision {
        let Some(session) = session else {
            tracing::debug!(path = %path, "No session, guard inactive");
            return GuardDecision::Authorized;
        };

        let role = match session.role_claim() {
            RoleClaim::Known(role) => role,
            claim => return self.unknown_role(session, &claim, path),
        };

        if self.resolver.is_path_permitted(role, path) {
            tracing::debug!(role = %role, path = %path, "Navigation authorized");
            return GuardDecision::Authorized;
        }

        match self.resolver.default_landing_path(role) {
            Ok(location) => {
                tracing::info!(
                    username = %session.username,
                    role = %role,
                    path = %path,
                    location = %location,
                    "Access denied, redirecting to landing page"
                );
                GuardDecision::Redirect { location }
            }
            Err(AccessError::NoAccessibleResource(role)) => {
                tracing::error!(
                    role = %role,
                    mapping_version = self.resolver.mapping().version(),
                    "Role has no accessible resource, check the permission mapping"
                );
                GuardDecision::Denied {
                    reason: DenyReason::NoAccessibleResource,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Unexpected access condition");
                GuardDecision::Denied {
                    reason: DenyReason::NoAccessibleResource,
                }
            }
        }
    }

    /// Follow `path` through the guard, including the redirect to the landing page
    ///
    /// Redirects always target a landing page, which is one of the role's own
    /// resources, so a run takes at most one redirect.
    pub fn navigate(&self, session: Option<&Session>, path: &str) -> GuardRun {
        let mut states = vec![GuardState::Checking];

        let (path, decision) = match self.evaluate(session, path) {
            GuardDecision::Redirect { location } => {
                states.push(GuardState::Redirecting);
                states.push(GuardState::Checking);
                let decision = self.evaluate(session, &location);
                (location, decision)
            }
            decision => (path.to_string(), decision),
        };

        states.push(decision.state());
        GuardRun {
            path,
            decision,
            states,
        }
    }

    fn unknown_role(&self, session: &Session, claim: &RoleClaim, path: &str) -> GuardDecision {
        match self.on_unknown_role {
            UnknownRolePolicy::Allow => {
                tracing::warn!(
                    username = %session.username,
                    role = %session.role,
                    claim = claim.kind(),
                    path = %path,
                    "No valid role found, allowing navigation"
                );
                GuardDecision::Authorized
            }
            UnknownRolePolicy::Deny => {
                tracing::warn!(
                    username = %session.username,
                    role = %session.role,
                    claim = claim.kind(),
                    path = %path,
                    "No valid role found, denying navigation"
                );
                GuardDecision::Denied {
                    reason: DenyReason::UnknownRole,
                }
            }
        }
    }
}
