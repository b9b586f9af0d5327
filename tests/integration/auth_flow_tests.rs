// ==================================
// tests/integration/auth_flow_tests.rs
// ==================================
//! Login and logout through the router
use axum::http::StatusCode;
use gymdesk_backend::{auth::AuthService, config::Settings, storage::Storage};
use gymdesk_common::{AuditAction, Role};

use crate::test_utils::*;

#[tokio::test]
async fn test_admin_login_opens_session_and_audits() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    let response = post_login(&app, "admin", TEST_PASSWORD, "10.0.0.1").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));
    assert_eq!(flash_messages(&response), ["Welcome, Administrator!"]);

    let token = set_cookie(&response, "gymdesk_session").unwrap();
    let session = state.auth.current_session(&token).await.unwrap();
    assert_eq!(session.role, Role::Admin);
    assert_eq!(session.username, "admin");

    let dashboard = get(&app, "/dashboard", Some(&token)).await;
    assert_eq!(dashboard.status(), StatusCode::OK);

    let log = state.storage.recent_audit(10).await.unwrap();
    let logins: Vec<_> = log.iter().filter(|r| r.entry.action == AuditAction::Login).collect();
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0].entry.user_id, session.user_id);
    assert_eq!(logins[0].entry.affected_table, "users");
    assert_eq!(logins[0].entry.record_id, Some(session.user_id));
    assert_eq!(logins[0].entry.detail.as_deref(), Some("Successful login"));
}

#[tokio::test]
async fn test_wrong_password_stays_on_login_page() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    let response = post_login(&app, "admin", "wrong-password", "10.0.0.2").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&response, "gymdesk_session").is_none());

    let page = body_string(response).await;
    assert!(page.contains("Incorrect username or password."));
    assert!(page.contains("action=\"/login\""));

    assert_eq!(state.sessions.active_count().await, 0);
    assert!(state.storage.recent_audit(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_look_identical() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    let wrong = post_login(&app, "admin", "wrong-password", "10.0.0.3").await;
    let unknown = post_login(&app, "nobody", TEST_PASSWORD, "10.0.0.4").await;
    assert_eq!(wrong.status(), unknown.status());

    let wrong = body_string(wrong).await;
    let unknown = body_string(unknown).await;
    assert!(wrong.contains("Incorrect username or password."));
    assert!(unknown.contains("Incorrect username or password."));
}

#[tokio::test]
async fn test_unreachable_store_reports_connection_failure() {
    let state = unreachable_state();
    let app = app(&state);

    let response = post_login(&app, "admin", TEST_PASSWORD, "10.0.0.5").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(set_cookie(&response, "gymdesk_session").is_none());

    let page = body_string(response).await;
    assert!(page.contains("Could not connect to the database."));
    assert!(!page.contains("Incorrect username or password."));
}

#[tokio::test]
async fn test_logout_audits_and_ends_session() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);
    let token = login(&app, "desk").await;

    let response = get(&app, "/logout", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    assert_eq!(flash_messages(&response), ["Logged out successfully."]);
    assert!(set_cookie(&response, "gymdesk_session").is_none());
    assert!(state.auth.current_session(&token).await.is_none());

    let log = state.storage.recent_audit(10).await.unwrap();
    let actions: Vec<_> = log.iter().map(|r| r.entry.action.clone()).collect();
    assert_eq!(actions, [AuditAction::Logout, AuditAction::Login]);
    assert_eq!(log[0].entry.detail.as_deref(), Some("Logout"));
    assert_eq!(log[0].username, "desk");

    // the old cookie no longer opens the dashboard
    let response = get(&app, "/dashboard", Some(&token)).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_logout_without_session_still_redirects() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    let response = get(&app, "/logout", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    assert!(state.storage.recent_audit(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_repeated_failures_lock_out_client() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    for _ in 0..5 {
        let response = post_login(&app, "admin", "wrong-password", "192.0.2.50").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = post_login(&app, "admin", TEST_PASSWORD, "192.0.2.50").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(body_string(response)
        .await
        .contains("Too many login attempts, please try again later."));

    // other clients are unaffected
    let response = post_login(&app, "admin", TEST_PASSWORD, "192.0.2.51").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_forwarded_headers_do_not_reset_lockout() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    for n in 0..6 {
        let mut request = login_request("admin", "wrong-password", "192.0.2.60");
        let spoofed = format!("198.51.100.{n}");
        request.headers_mut().insert("x-real-ip", spoofed.parse().unwrap());
        request.headers_mut().insert("x-forwarded-for", spoofed.parse().unwrap());
        let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
        let expected = if n < 5 { StatusCode::UNAUTHORIZED } else { StatusCode::TOO_MANY_REQUESTS };
        assert_eq!(response.status(), expected, "attempt {n}");
    }
}

#[tokio::test]
async fn test_trusted_proxy_header_keys_the_lockout() {
    let settings = Settings { trust_proxy_headers: true, ..Settings::default() };
    let (state, _temp_dir) = setup_test_env_with(settings).await;
    let app = app(&state);

    let attempt = |real_ip: &'static str| {
        let mut request = login_request("admin", "wrong-password", "10.0.0.254");
        request.headers_mut().insert("x-real-ip", real_ip.parse().unwrap());
        tower::ServiceExt::oneshot(app.clone(), request)
    };

    for _ in 0..5 {
        assert_eq!(attempt("203.0.113.9").await.unwrap().status(), StatusCode::UNAUTHORIZED);
    }
    assert_eq!(attempt("203.0.113.9").await.unwrap().status(), StatusCode::TOO_MANY_REQUESTS);
    // another client behind the same proxy is unaffected
    assert_eq!(attempt("203.0.113.10").await.unwrap().status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_page_renders_form() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    let response = get(&app, "/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("name=\"password\""));
}
