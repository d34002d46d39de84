//! Role to resource permission mapping
//!
//! The mapping is static configuration shared by navigation and the route guard.
//! Order matters: the first resource of a role is its landing page.

use super::{error::AccessError, resource::Resource, role::Role};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Bumped whenever the standard grants change
pub const MAPPING_VERSION: u32 = 3;

const STANDARD_GRANTS: &[(Role, &[Resource])] = &[
    (
        Role::Manager,
        &[
            Resource::TableReservation,
            Resource::ProductInventory,
            Resource::Revenue,
            Resource::TableStatus,
            Resource::OrderedItem,
        ],
    ),
    (
        Role::Staff,
        &[
            Resource::TableReservation,
            Resource::ProductInventory,
            Resource::TableStatus,
        ],
    ),
    (
        Role::Kitchen,
        &[Resource::ProductInventory, Resource::OrderedItem],
    ),
    (
        Role::Owner,
        &[
            Resource::Employees,
            Resource::TableReservation,
            Resource::Users,
            Resource::ProductInventory,
            Resource::Revenue,
            Resource::TableStatus,
        ],
    ),
    (
        Role::Admin,
        &[
            Resource::Employees,
            Resource::TableReservation,
            Resource::Users,
            Resource::ProductInventory,
            Resource::Revenue,
        ],
    ),
];

static STANDARD: Lazy<PermissionMapping> = Lazy::new(|| {
    PermissionMapping::new(
        MAPPING_VERSION,
        STANDARD_GRANTS
            .iter()
            .map(|(role, resources)| (*role, resources.to_vec())),
    )
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMapping {
    version: u32,
    grants: HashMap<Role, Vec<Resource>>,
}

impl PermissionMapping {
    pub fn new<I>(version: u32, grants: I) -> Self
    where
        I: IntoIterator<Item = (Role, Vec<Resource>)>,
    {
        Self {
            version,
            grants: grants.into_iter().collect(),
        }
    }

    /// The mapping shipped with the dashboard
    pub fn standard() -> &'static PermissionMapping {
        &STANDARD
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Ordered resources of a role; empty when the role has no entry
    pub fn resources(&self, role: Role) -> &[Resource] {
        self.grants.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Startup check of the configuration invariants
    pub fn validate(&self) -> Result<(), AccessError> {
        for role in Role::ALL {
            let resources = self.resources(role);
            if resources.is_empty() {
                return Err(AccessError::NoAccessibleResource(role));
            }

            let mut seen = HashSet::new();
            for resource in resources {
                if !seen.insert(*resource) {
                    return Err(AccessError::InvalidMapping(format!(
                        "{} is granted twice to {}",
                        resource, role
                    )));
                }
            }
        }

        Ok(())
    }
}
