// ============================
// gymdesk-backend/src/router.rs
// ============================
//! HTTP route table.
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, dashboard, pages};
use crate::storage::Storage;
use crate::AppState;

/// Create the application router
pub fn create_router<S: Storage + Clone + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/login", get(auth::login_page).post(auth::login::<S>))
        .route("/logout", get(auth::logout::<S>))
        .route("/dashboard", get(dashboard::dashboard::<S>))
        .route("/miembros", get(pages::under_development))
        .route("/pagos", get(pages::under_development))
        .route("/clases", get(pages::under_development))
        .route("/healthz", get(pages::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
