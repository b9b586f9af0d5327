//! Access control guards called at the top of handlers.
//!
//! Guards only read the request's [`SessionContext`]; they never touch the
//! store. A denial converts into a redirect carrying a flash message.
use axum::response::{IntoResponse, Response};
use gymdesk_common::{Flash, Role};
use metrics::counter;

use super::flash::redirect_with_flash;
use super::session::SessionContext;
use crate::auth::Session;
use crate::error::AppError;
use crate::metrics::GUARD_DENIED;

/// Roles allowed on the members, payments and classes pages
pub const STAFF_ROLES: &[Role] = &[Role::Admin, Role::Responsible];

/// Where an unauthenticated caller is sent
pub const LOGIN_PATH: &str = "/login";

/// Where a caller lacking permissions is sent
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Why a guard refused the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// No valid session
    Unauthenticated,
    /// Session role outside the allowed set
    Forbidden,
}

impl AccessDenied {
    fn as_error(self) -> AppError {
        match self {
            AccessDenied::Unauthenticated => AppError::Unauthenticated,
            AccessDenied::Forbidden => AppError::Forbidden,
        }
    }

    pub fn redirect_target(self) -> &'static str {
        match self {
            AccessDenied::Unauthenticated => LOGIN_PATH,
            AccessDenied::Forbidden => DASHBOARD_PATH,
        }
    }
}

impl From<AccessDenied> for AppError {
    fn from(denied: AccessDenied) -> Self {
        denied.as_error()
    }
}

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        let message = self.as_error().sanitized_message();
        redirect_with_flash(self.redirect_target(), Flash::error(message))
    }
}

/// Allow only requests carrying a live session
pub fn require_authenticated(ctx: &SessionContext) -> Result<&Session, AccessDenied> {
    ctx.session().ok_or_else(|| {
        counter!(GUARD_DENIED, "reason" => "unauthenticated").increment(1);
        tracing::debug!("unauthenticated request denied");
        AccessDenied::Unauthenticated
    })
}

/// Authentication first, then membership of `allowed`
pub fn require_role<'a>(
    ctx: &'a SessionContext,
    allowed: &[Role],
) -> Result<&'a Session, AccessDenied> {
    let session = require_authenticated(ctx)?;
    if session.has_role(allowed) {
        Ok(session)
    } else {
        counter!(GUARD_DENIED, "reason" => "forbidden").increment(1);
        tracing::warn!(
            user_id = session.user_id,
            role = %session.role,
            "request denied for insufficient role"
        );
        Err(AccessDenied::Forbidden)
    }
}
