//! Role identities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access class of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Staff,
    Kitchen,
    Owner,
    Admin,
}

impl Role {
    /// Every role that can authenticate, in declaration order
    pub const ALL: [Role; 5] = [
        Role::Manager,
        Role::Staff,
        Role::Kitchen,
        Role::Owner,
        Role::Admin,
    ];

    /// Wire value, identical to the `role` column of the user store
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::Staff => "staff",
            Role::Kitchen => "kitchen",
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Manager => "Manager",
            Role::Staff => "Staff",
            Role::Kitchen => "Kitchen Staff",
            Role::Owner => "Owner",
            Role::Admin => "Admin",
        }
    }

    /// Roles offered on the position chooser before login
    pub fn is_selectable(&self) -> bool {
        matches!(self, Role::Manager | Role::Staff | Role::Kitchen)
    }

    /// Case-sensitive parse of a stored role value
    pub fn parse(value: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of the role value carried by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleClaim {
    /// No role value at all
    Absent,
    /// A value that is not part of the permission mapping
    Unknown(String),
    Known(Role),
}

impl RoleClaim {
    pub fn classify(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => RoleClaim::Absent,
            Some(value) => match Role::parse(value) {
                Some(role) => RoleClaim::Known(role),
                None => RoleClaim::Unknown(value.to_string()),
            },
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            RoleClaim::Known(role) => Some(*role),
            _ => None,
        }
    }

    /// Label used in logs and API responses
    pub fn kind(&self) -> &'static str {
        match self {
            RoleClaim::Absent => "absent",
            RoleClaim::Unknown(_) => "unknown",
            RoleClaim::Known(_) => "known",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(Role::parse("staff"), Some(Role::Staff));
        assert_eq!(Role::parse("Staff"), None);
        assert_eq!(Role::parse("superadmin"), None);
    }

    #[test]
    fn test_round_trip_through_wire_value() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
            assert_eq!(role.to_string(), role.as_str());
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(RoleClaim::classify(None), RoleClaim::Absent);
        assert_eq!(RoleClaim::classify(Some("")), RoleClaim::Absent);
        assert_eq!(
            RoleClaim::classify(Some("superadmin")),
            RoleClaim::Unknown("superadmin".to_string())
        );
        assert_eq!(RoleClaim::classify(Some("owner")), RoleClaim::Known(Role::Owner));
    }

    #[test]
    fn test_selectable_roles() {
        let selectable: Vec<_> = Role::ALL.into_iter().filter(Role::is_selectable).collect();
        assert_eq!(selectable, vec![Role::Manager, Role::Staff, Role::Kitchen]);
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&Role::Kitchen).unwrap();
        assert_eq!(json, "\"kitchen\"");
    }
}
