//! Navigable panels

use super::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dashboard panel reachable under `/{role}/{slug}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    TableReservation,
    ProductInventory,
    Revenue,
    Users,
    Employees,
    TableStatus,
    OrderedItem,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::TableReservation,
        Resource::ProductInventory,
        Resource::Revenue,
        Resource::Users,
        Resource::Employees,
        Resource::TableStatus,
        Resource::OrderedItem,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Resource::TableReservation => "table-reservation",
            Resource::ProductInventory => "product-inventory",
            Resource::Revenue => "revenue",
            Resource::Users => "users",
            Resource::Employees => "employees",
            Resource::TableStatus => "table-status",
            Resource::OrderedItem => "ordered-item",
        }
    }

    /// Navigation label
    pub fn label(&self) -> &'static str {
        match self {
            Resource::TableReservation => "Table Reservation",
            Resource::ProductInventory => "Product & Inventory",
            Resource::Revenue => "Revenue",
            Resource::Users => "Users",
            Resource::Employees => "Employees",
            Resource::TableStatus => "Table Status",
            Resource::OrderedItem => "Ordered Items",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Resource> {
        Resource::ALL.into_iter().find(|resource| resource.slug() == slug)
    }

    pub fn canonical_path(&self, role: Role) -> String {
        format!("/{}/{}", role.as_str(), self.slug())
    }

    /// `path` addresses this resource for `role`, either exactly or through a sub-route
    pub fn covers(&self, role: Role, path: &str) -> bool {
        let canonical = self.canonical_path(role);
        match path.strip_prefix(canonical.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_path() {
        assert_eq!(
            Resource::TableReservation.canonical_path(Role::Staff),
            "/staff/table-reservation"
        );
        assert_eq!(Resource::Revenue.canonical_path(Role::Owner), "/owner/revenue");
    }

    #[test]
    fn test_from_slug() {
        for resource in Resource::ALL {
            assert_eq!(Resource::from_slug(resource.slug()), Some(resource));
        }
        assert_eq!(Resource::from_slug("payments"), None);
    }

    #[test]
    fn test_covers_sub_routes() {
        let resource = Resource::TableStatus;
        assert!(resource.covers(Role::Staff, "/staff/table-status"));
        assert!(resource.covers(Role::Staff, "/staff/table-status/"));
        assert!(resource.covers(Role::Staff, "/staff/table-status/12/edit"));
        assert!(!resource.covers(Role::Staff, "/staff/table-statuses"));
        assert!(!resource.covers(Role::Manager, "/staff/table-status"));
        assert!(!resource.covers(Role::Staff, "/staff"));
    }
}
