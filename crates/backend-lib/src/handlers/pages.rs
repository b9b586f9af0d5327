// ============================
// gymdesk-backend/src/handlers/pages.rs
// ============================
//! Landing page, placeholder sections and the health check.
use axum::response::Response;
use gymdesk_common::Flash;

use crate::middleware::guard::DASHBOARD_PATH;
use crate::middleware::{
    redirect_with_flash, require_role, AccessDenied, FlashMessages, SessionContext, STAFF_ROLES,
};
use crate::views;

pub const UNDER_DEVELOPMENT: &str = "Feature under development.";

/// `GET /`
pub async fn index(ctx: SessionContext, flashes: FlashMessages) -> Response {
    flashes.consume(views::landing(ctx.session(), flashes.messages()))
}

/// `GET /miembros`, `/pagos` and `/clases`: staff only, not built yet
pub async fn under_development(ctx: SessionContext) -> Result<Response, AccessDenied> {
    let session = require_role(&ctx, STAFF_ROLES)?;
    tracing::debug!(user_id = session.user_id, "placeholder section requested");
    Ok(redirect_with_flash(DASHBOARD_PATH, Flash::info(UNDER_DEVELOPMENT)))
}

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}
