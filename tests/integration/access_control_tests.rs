// =======================================
// tests/integration/access_control_tests.rs
// =======================================
//! Role-gated routes
use axum::http::StatusCode;
use gymdesk_backend::storage::Storage;

use crate::test_utils::*;

const STAFF_ROUTES: [&str; 3] = ["/miembros", "/pagos", "/clases"];

#[tokio::test]
async fn test_protected_routes_redirect_to_login_without_session() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    for uri in STAFF_ROUTES.iter().copied().chain(["/dashboard"]) {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), Some("/login"), "{uri}");
        assert_eq!(flash_messages(&response), ["You must log in to access this page."]);
    }
}

#[tokio::test]
async fn test_regular_user_is_sent_back_to_dashboard() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);
    let token = login(&app, "member").await;
    let entries_before = state.storage.recent_audit(100).await.unwrap().len();

    for uri in STAFF_ROUTES {
        let response = get(&app, uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), Some("/dashboard"), "{uri}");
        assert_eq!(
            flash_messages(&response),
            ["You do not have permission to access this page."]
        );
    }

    // denied requests write nothing to the audit log
    let entries_after = state.storage.recent_audit(100).await.unwrap().len();
    assert_eq!(entries_before, entries_after);
}

#[tokio::test]
async fn test_staff_reach_the_placeholder_sections() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    for username in ["admin", "desk"] {
        let token = login(&app, username).await;
        for uri in STAFF_ROUTES {
            let response = get(&app, uri, Some(&token)).await;
            assert_eq!(location(&response), Some("/dashboard"));
            assert_eq!(flash_messages(&response), ["Feature under development."]);
        }
    }
}

#[tokio::test]
async fn test_regular_user_reaches_dashboard() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);
    let token = login(&app, "member").await;

    let response = get(&app, "/dashboard", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("Regular Member"));
}

#[tokio::test]
async fn test_tampered_session_cookie_is_rejected() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);
    let token = login(&app, "admin").await;

    let (raw, signature) = token.split_once('.').unwrap();
    let mut flipped = signature.to_string();
    let last = if flipped.pop() == Some('A') { 'B' } else { 'A' };
    flipped.push(last);

    for forged in [raw.to_string(), format!("{raw}.{flipped}"), format!("x{token}")] {
        let response = get(&app, "/dashboard", Some(&forged)).await;
        assert_eq!(location(&response), Some("/login"), "accepted {forged}");
    }
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let settings = gymdesk_backend::config::Settings {
        session_ttl_secs: 0,
        ..Default::default()
    };
    let (state, _temp_dir) = setup_test_env_with(settings).await;
    let app = app(&state);

    let token = login(&app, "admin").await;
    let response = get(&app, "/dashboard", Some(&token)).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_public_routes() {
    let (state, _temp_dir) = setup_test_env().await;
    let app = app(&state);

    let landing = get(&app, "/", None).await;
    assert_eq!(landing.status(), StatusCode::OK);
    assert!(body_string(landing).await.contains("href=\"/login\""));

    let health = get(&app, "/healthz", None).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_string(health).await, "ok");
}
