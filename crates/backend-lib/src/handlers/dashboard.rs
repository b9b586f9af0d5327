// ============================
// gymdesk-backend/src/handlers/dashboard.rs
// ============================
use std::sync::Arc;

use axum::{extract::State, response::Response};
use gymdesk_common::Flash;

use crate::audit::DASHBOARD_AUDIT_LIMIT;
use crate::middleware::{require_authenticated, AccessDenied, FlashMessages, SessionContext};
use crate::models::DashboardStats;
use crate::storage::Storage;
use crate::{views, AppState};

/// `GET /dashboard`: aggregate counts and the latest audit entries.
///
/// A store failure still renders the page, with zero counts and an error flash.
pub async fn dashboard<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ctx: SessionContext,
    mut flashes: FlashMessages,
) -> Result<Response, AccessDenied> {
    let session = require_authenticated(&ctx)?;

    let stats = match state.storage.dashboard_stats().await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(error = %e, "failed to load dashboard counts");
            flashes.push(Flash::error(e.sanitized_message()));
            DashboardStats::default()
        },
    };

    let recent = match state.audit.recent(DASHBOARD_AUDIT_LIMIT).await {
        Ok(recent) => recent,
        Err(e) => {
            tracing::error!(error = %e, "failed to load recent audit entries");
            let flash = Flash::error(e.sanitized_message());
            if !flashes.messages().contains(&flash) {
                flashes.push(flash);
            }
            Vec::new()
        },
    };

    Ok(flashes.consume(views::dashboard(session, &stats, &recent, flashes.messages())))
}
