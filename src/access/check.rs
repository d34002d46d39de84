//! Startup consistency check between navigation and the route guard

use super::{
    error::AccessError,
    guard::{GuardDecision, RouteGuard},
    navigation::NavigationRenderer,
    role::Role,
};
use crate::session::Session;
use uuid::Uuid;

/// Validate the mapping and verify that every link the navigation shows is one the
/// guard lets through, including each role's landing page.
pub fn self_check(guard: &RouteGuard, navigation: &NavigationRenderer) -> Result<(), AccessError> {
    let resolver = guard.resolver();
    resolver.mapping().validate()?;

    for role in Role::ALL {
        let probe = Session::new(Uuid::nil(), "self-check", role.as_str(), None, 60);

        for entry in navigation.render(Some(&probe), "") {
            let decision = guard.evaluate(Some(&probe), &entry.path);
            if decision != GuardDecision::Authorized {
                return Err(AccessError::InvalidMapping(format!(
                    "navigation entry {} of {} is not authorized by the guard ({})",
                    entry.path,
                    role,
                    decision.label()
                )));
            }
        }

        let landing = resolver.default_landing_path(role)?;
        if guard.evaluate(Some(&probe), &landing) != GuardDecision::Authorized {
            return Err(AccessError::InvalidMapping(format!(
                "landing page {} of {} is not authorized by the guard",
                landing, role
            )));
        }
    }

    tracing::info!(
        mapping_version = resolver.mapping().version(),
        policy = ?guard.policy(),
        "Access mapping verified"
    );

    Ok(())
}
