// =====================================
// tests/integration/dashboard_tests.rs
// =====================================
use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use gymdesk_backend::{
    audit::DASHBOARD_AUDIT_LIMIT,
    auth::AuthService,
    storage::Storage,
};

use crate::test_utils::*;

#[tokio::test]
async fn test_dashboard_shows_counts_and_recent_activity() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);
    let token = login(&app, "admin").await;

    let response = get(&app, "/dashboard", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    assert!(page.contains("<strong>0</strong> active members"));
    assert!(page.contains("<td>LOGIN</td>"));
    assert!(page.contains("<td>admin</td>"));
}

#[tokio::test]
async fn test_dashboard_lists_at_most_five_entries() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    for _ in 0..4 {
        let token = login(&app, "desk").await;
        state.auth.logout(&token).await;
    }
    assert!(state.storage.recent_audit(100).await.unwrap().len() > DASHBOARD_AUDIT_LIMIT);

    let token = login(&app, "desk").await;
    let page = body_string(get(&app, "/dashboard", Some(&token)).await).await;
    let rows = page.matches("<tr><td>").count();
    assert_eq!(rows, DASHBOARD_AUDIT_LIMIT);
}

#[tokio::test]
async fn test_welcome_flash_is_shown_once() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    let response = post_login(&app, "member", TEST_PASSWORD, "127.0.0.1").await;
    let token = set_cookie(&response, "gymdesk_session").unwrap();
    let flash = set_cookie(&response, "gymdesk_flash").unwrap();

    let request = axum::http::Request::builder()
        .uri("/dashboard")
        .header(
            axum::http::header::COOKIE,
            format!("gymdesk_session={token}; gymdesk_flash={flash}"),
        )
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();

    // the page clears the flash cookie it displayed
    let cleared = response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .filter_map(|v| Cookie::parse(v.to_str().unwrap()).ok())
        .any(|c| c.name() == "gymdesk_flash" && c.value().is_empty());
    assert!(cleared);
    assert!(body_string(response).await.contains("Welcome, Regular Member!"));
}

#[tokio::test]
async fn test_audit_failure_does_not_block_login() {
    let (state, temp_dir) = setup_test_env().await;
    let app = app(&state);

    // a directory in place of the log file makes every append fail
    std::fs::remove_file(temp_dir.path().join("audit.log")).unwrap();
    std::fs::create_dir(temp_dir.path().join("audit.log")).unwrap();

    let response = post_login(&app, "admin", TEST_PASSWORD, "127.0.0.1").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let token = set_cookie(&response, "gymdesk_session").unwrap();
    assert!(state.auth.current_session(&token).await.is_some());
}

#[tokio::test]
async fn test_dashboard_renders_when_store_queries_fail() {
    let (state, _temp_dir) = dashboard_down_state().await;
    let app = app(&state);
    let token = login(&app, "admin").await;

    let response = get(&app, "/dashboard", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_string(response).await;
    for label in ["active members", "payments today", "check-ins today", "active classes"] {
        assert!(page.contains(&format!("<strong>0</strong> {label}")), "missing zero {label}");
    }
    assert!(page.contains("No activity recorded yet."));
    // both queries fail but the message is shown once
    assert_eq!(page.matches("Could not connect to the database.").count(), 1);
}
