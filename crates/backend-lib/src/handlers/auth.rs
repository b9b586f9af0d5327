// ============================
// gymdesk-backend/src/handlers/auth.rs
// ============================
//! Login and logout.
use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use gymdesk_common::Flash;
use serde::Deserialize;

use crate::auth::{AuthService, LoginSuccess};
use crate::middleware::cookies::{removal_cookie, session_cookie, SESSION_COOKIE};
use crate::middleware::flash::flashes_cookie;
use crate::middleware::guard::DASHBOARD_PATH;
use crate::middleware::{ClientAddr, FlashMessages, SessionContext};
use crate::storage::Storage;
use crate::{views, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `GET /login`
pub async fn login_page(flashes: FlashMessages) -> Response {
    flashes.consume(views::login_form(flashes.messages(), None))
}

/// `POST /login`
pub async fn login<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientAddr(client): ClientAddr,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim();
    match state.auth.login(client.as_deref(), username, &form.password).await {
        Ok(LoginSuccess { token, session }) => {
            let welcome = Flash::success(format!("Welcome, {}!", session.display_name));
            let jar = CookieJar::new()
                .add(session_cookie(token, state.sessions.ttl(), state.settings.secure_cookies))
                .add(flashes_cookie(&[welcome]));
            (jar, Redirect::to(DASHBOARD_PATH)).into_response()
        },
        Err(err) => {
            let page = views::login_form(&[Flash::error(err.sanitized_message())], Some(username));
            (err.status_code(), page).into_response()
        },
    }
}

/// `GET /logout`; clears the cookie whether or not a session was live
pub async fn logout<S: Storage + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ctx: SessionContext,
) -> Response {
    if let Some(token) = ctx.token() {
        state.auth.logout(token).await;
    }

    let jar = CookieJar::new()
        .add(removal_cookie(SESSION_COOKIE))
        .add(flashes_cookie(&[Flash::success("Logged out successfully.")]));
    (jar, Redirect::to("/")).into_response()
}
