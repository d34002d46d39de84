//! Navigation entries for the side panel

use super::{resolver::AccessResolver, resource::Resource, role::RoleClaim};
use crate::session::Session;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub resource: Resource,
    pub label: &'static str,
    pub path: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NavigationRenderer {
    resolver: AccessResolver,
}

impl NavigationRenderer {
    pub fn new(resolver: AccessResolver) -> Self {
        Self { resolver }
    }

    /// Entries for the session's role, in mapping order
    ///
    /// Anonymous visitors and unrecognized roles get no navigation chrome.
    pub fn render(&self, session: Option<&Session>, current_path: &str) -> Vec<NavEntry> {
        let Some(session) = session else {
            return Vec::new();
        };

        let RoleClaim::Known(role) = session.role_claim() else {
            tracing::debug!(role = %session.role, "Unrecognized role, rendering no navigation");
            return Vec::new();
        };

        self.resolver
            .resources_for(role)
            .iter()
            .map(|resource| {
                let path = resource.canonical_path(role);
                NavEntry {
                    resource: *resource,
                    label: resource.label(),
                    active: path == current_path,
                    path,
                }
            })
            .collect()
    }
}
