// =========================
// tests/unit/error_tests.rs
// =========================
//! How errors reach the browser
use axum::{http::StatusCode, response::IntoResponse};
use gymdesk_backend::{error::AppError, middleware::AccessDenied};

use crate::test_utils::body_string;

#[tokio::test]
async fn test_error_page_carries_code() {
    let response = AppError::Connection("refused".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let page = body_string(response).await;
    assert!(page.contains("DB_001"));
    assert!(page.contains("503"));
}

#[test]
fn test_access_denied_maps_to_taxonomy() {
    assert!(matches!(AppError::from(AccessDenied::Unauthenticated), AppError::Unauthenticated));
    assert!(matches!(AppError::from(AccessDenied::Forbidden), AppError::Forbidden));

    assert_eq!(AccessDenied::Unauthenticated.redirect_target(), "/login");
    assert_eq!(AccessDenied::Forbidden.redirect_target(), "/dashboard");
}

#[test]
fn test_access_denied_is_a_redirect_not_an_error_page() {
    let response = AccessDenied::Forbidden.into_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[test]
fn test_user_facing_messages() {
    assert_eq!(
        AppError::Connection("x".to_string()).sanitized_message(),
        "Could not connect to the database."
    );
    assert_eq!(
        AppError::InvalidCredentials.sanitized_message(),
        "Incorrect username or password."
    );
    assert_eq!(
        AppError::AuthRateLimited.sanitized_message(),
        "Too many login attempts, please try again later."
    );
}
