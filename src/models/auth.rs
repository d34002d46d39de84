//! Authentication-related models

use super::user::UserResponse;
use crate::access::{GuardDecision, GuardState, NavEntry, Resource, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64, message = "username must be 1-64 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 256, message = "password must be 1-256 characters"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    /// Where the client should navigate after login
    pub landing_path: String,
    pub user: UserResponse,
}

/// Current session identity
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
    /// absent, unknown or known
    pub role_status: &'static str,
    pub location_id: Option<String>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// Entry of the position chooser
#[derive(Debug, Serialize)]
pub struct RoleOption {
    pub role: Role,
    pub display_name: &'static str,
    pub selectable: bool,
    pub landing_path: Option<String>,
}

/// Query of the navigation and access check endpoints
#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub entries: Vec<NavEntry>,
}

#[derive(Debug, Serialize)]
pub struct AccessCheckResponse {
    pub path: String,
    pub role_status: &'static str,
    #[serde(flatten)]
    pub decision: GuardDecision,
    /// Path the navigation settles on after redirects
    pub final_path: String,
    pub states: Vec<GuardState>,
}

/// Descriptor of a dashboard panel
#[derive(Debug, Serialize)]
pub struct PanelResponse {
    pub role: Role,
    pub resource: Resource,
    pub label: &'static str,
    pub path: String,
    pub navigation: Vec<NavEntry>,
}

/// Response of `/` and `/{role}` for visitors the guard lets through
#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub landing_path: Option<String>,
    pub navigation: Vec<NavEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            username: "anna".to_string(),
            password: "secret".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = LoginRequest {
            username: String::new(),
            password: "secret".to_string(),
        };
        assert!(empty.validate().is_err());

        let long = LoginRequest {
            username: "a".repeat(65),
            password: "secret".to_string(),
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_path_query_defaults_to_root() {
        let query: PathQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.path, "/");
    }

    #[test]
    fn test_access_check_flattens_decision() {
        let response = AccessCheckResponse {
            path: "/staff/users".to_string(),
            role_status: "known",
            decision: GuardDecision::Redirect {
                location: "/staff/table-reservation".to_string(),
            },
            final_path: "/staff/table-reservation".to_string(),
            states: vec![GuardState::Checking, GuardState::Redirecting],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["decision"], "redirect");
        assert_eq!(json["location"], "/staff/table-reservation");
        assert_eq!(json["states"][1], "redirecting");
    }
}
