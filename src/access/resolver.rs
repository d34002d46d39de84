//! Access control resolver
//!
//! Single source of truth for what a role may reach. Every function here is a pure
//! lookup over the permission mapping; policy for absent or unknown roles belongs to
//! the caller.

use super::{
    error::AccessError,
    mapping::PermissionMapping,
    resource::Resource,
    role::{Role, RoleClaim},
};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AccessResolver {
    mapping: Arc<PermissionMapping>,
}

impl AccessResolver {
    pub fn new(mapping: PermissionMapping) -> Self {
        Self {
            mapping: Arc::new(mapping),
        }
    }

    /// Resolver over the standard mapping
    pub fn standard() -> Self {
        Self::new(PermissionMapping::standard().clone())
    }

    pub fn mapping(&self) -> &PermissionMapping {
        &self.mapping
    }

    pub fn classify(&self, raw: Option<&str>) -> RoleClaim {
        RoleClaim::classify(raw)
    }

    /// Ordered resources for a raw role value; empty for absent or unknown roles
    pub fn permitted_resources(&self, role: Option<&str>) -> &[Resource] {
        match self.classify(role) {
            RoleClaim::Known(role) => self.resources_for(role),
            RoleClaim::Absent | RoleClaim::Unknown(_) => &[],
        }
    }

    pub fn resources_for(&self, role: Role) -> &[Resource] {
        self.mapping.resources(role)
    }

    /// Canonical path of the role's first permitted resource
    pub fn default_landing_path(&self, role: Role) -> Result<String, AccessError> {
        self.resources_for(role)
            .first()
            .map(|resource| resource.canonical_path(role))
            .ok_or(AccessError::NoAccessibleResource(role))
    }

    pub fn is_path_permitted(&self, role: Role, requested_path: &str) -> bool {
        self.resources_for(role)
            .iter()
            .any(|resource| resource.covers(role, requested_path))
    }
}

impl Default for AccessResolver {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_has_resources() {
        let resolver = AccessResolver::standard();
        for role in Role::ALL {
            assert!(!resolver.resources_for(role).is_empty(), "{} has no resources", role);
        }
    }

    #[test]
    fn test_every_canonical_path_is_permitted() {
        let resolver = AccessResolver::standard();
        for role in Role::ALL {
            for resource in resolver.resources_for(role) {
                let path = resource.canonical_path(role);
                assert!(resolver.is_path_permitted(role, &path), "{} -> {}", role, path);
            }
        }
    }

    #[test]
    fn test_foreign_paths_are_rejected() {
        let resolver = AccessResolver::standard();
        for role in Role::ALL {
            let permitted = resolver.resources_for(role);
            for resource in Resource::ALL {
                if !permitted.contains(&resource) {
                    let path = resource.canonical_path(role);
                    assert!(!resolver.is_path_permitted(role, &path), "{} -> {}", role, path);
                }
            }

            // Paths of other roles never match
            for other in Role::ALL.into_iter().filter(|other| *other != role) {
                for resource in resolver.resources_for(other) {
                    assert!(!resolver.is_path_permitted(role, &resource.canonical_path(other)));
                }
            }

            assert!(!resolver.is_path_permitted(role, "/"));
            assert!(!resolver.is_path_permitted(role, &format!("/{}", role)));
        }
    }

    #[test]
    fn test_landing_path_is_first_resource() {
        let resolver = AccessResolver::standard();
        for role in Role::ALL {
            let first = resolver.resources_for(role)[0];
            assert_eq!(
                resolver.default_landing_path(role).unwrap(),
                first.canonical_path(role)
            );
        }
        assert_eq!(
            resolver.default_landing_path(Role::Kitchen).unwrap(),
            "/kitchen/product-inventory"
        );
    }

    #[test]
    fn test_permitted_resources_for_raw_values() {
        let resolver = AccessResolver::standard();
        assert!(resolver.permitted_resources(None).is_empty());
        assert!(resolver.permitted_resources(Some("superadmin")).is_empty());
        assert_eq!(
            resolver.permitted_resources(Some("kitchen")),
            &[Resource::ProductInventory, Resource::OrderedItem]
        );
    }

    #[test]
    fn test_empty_role_has_no_landing_path() {
        let resolver = AccessResolver::new(PermissionMapping::new(
            1,
            vec![(Role::Owner, vec![Resource::Revenue])],
        ));

        assert_eq!(
            resolver.default_landing_path(Role::Staff),
            Err(AccessError::NoAccessibleResource(Role::Staff))
        );
        assert!(!resolver.is_path_permitted(Role::Staff, "/staff/revenue"));
        assert_eq!(resolver.default_landing_path(Role::Owner).unwrap(), "/owner/revenue");
    }

    #[test]
    fn test_sub_routes_are_permitted() {
        let resolver = AccessResolver::standard();
        assert!(resolver.is_path_permitted(Role::Owner, "/owner/users/42"));
        assert!(!resolver.is_path_permitted(Role::Staff, "/staff/users/42"));
    }
}
