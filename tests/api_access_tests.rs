//! 导航与访问预检 API 集成测试

use axum::http::StatusCode;
use backoffice_gate::access::UnknownRolePolicy;

mod common;
use common::{get, send, TestApp};

#[tokio::test]
async fn test_navigation_for_staff() {
    let app = TestApp::new(UnknownRolePolicy::Allow);
    let (_, token) = app.session_token("anna", "staff").await;

    let (status, _, json) = send(
        app.router(),
        get("/api/v1/navigation?path=/staff/table-status", Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entries = json["entries"].as_array().unwrap();
    let paths: Vec<_> = entries.iter().map(|e| e["path"].as_str().unwrap()).collect();
    assert_eq!(
        paths,
        vec![
            "/staff/table-reservation",
            "/staff/product-inventory",
            "/staff/table-status",
        ]
    );
    assert_eq!(entries[1]["label"], "Product & Inventory");
    assert_eq!(entries[2]["active"], true);
    assert_eq!(entries[0]["active"], false);
}

#[tokio::test]
async fn test_navigation_empty_without_known_role() {
    let app = TestApp::new(UnknownRolePolicy::Allow);

    let (status, _, json) = send(app.router(), get("/api/v1/navigation", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["entries"].as_array().unwrap().len(), 0);

    let (_, token) = app.session_token("root", "superadmin").await;
    let (_, _, json) = send(app.router(), get("/api/v1/navigation", Some(&token))).await;
    assert_eq!(json["entries"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_access_check_redirect() {
    let app = TestApp::new(UnknownRolePolicy::Allow);
    let (_, token) = app.session_token("anna", "staff").await;

    let (status, _, json) = send(
        app.router(),
        get("/api/v1/access/check?path=/staff/users", Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["path"], "/staff/users");
    assert_eq!(json["role_status"], "known");
    assert_eq!(json["decision"], "redirect");
    assert_eq!(json["location"], "/staff/table-reservation");
    assert_eq!(json["final_path"], "/staff/table-reservation");
    assert_eq!(
        json["states"],
        serde_json::json!(["checking", "redirecting", "checking", "authorized"])
    );
}

#[tokio::test]
async fn test_access_check_authorized() {
    let app = TestApp::new(UnknownRolePolicy::Allow);
    let (_, token) = app.session_token("olga", "owner").await;

    let (_, _, json) = send(
        app.router(),
        get("/api/v1/access/check?path=/owner/revenue/2024", Some(&token)),
    )
    .await;

    assert_eq!(json["decision"], "authorized");
    assert_eq!(json["final_path"], "/owner/revenue/2024");
    assert_eq!(json["states"], serde_json::json!(["checking", "authorized"]));
}

#[tokio::test]
async fn test_access_check_anonymous() {
    let app = TestApp::new(UnknownRolePolicy::Deny);

    let (_, _, json) = send(
        app.router(),
        get("/api/v1/access/check?path=/admin/users", None),
    )
    .await;

    assert_eq!(json["role_status"], "absent");
    assert_eq!(json["decision"], "authorized");
}

#[tokio::test]
async fn test_access_check_unknown_role_denied() {
    let app = TestApp::new(UnknownRolePolicy::Deny);
    let (_, token) = app.session_token("root", "superadmin").await;

    let (status, _, json) = send(
        app.router(),
        get("/api/v1/access/check?path=/admin/users", Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["role_status"], "unknown");
    assert_eq!(json["decision"], "denied");
    assert_eq!(json["reason"], "unknown_role");
    assert_eq!(json["states"], serde_json::json!(["checking", "denied"]));
}
