//! Per-request extractors: the caller's session and network address.
use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

use super::cookies::{cookie_value, SESSION_COOKIE};
use crate::auth::{AuthService, Session};
use crate::storage::Storage;
use crate::AppState;

/// The session bound to this request, resolved from the session cookie.
///
/// Each handler receives its own context; nothing about it is shared with
/// concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    token: Option<String>,
    session: Option<Session>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: String, session: Session) -> Self {
        Self { token: Some(token), session: Some(session) }
    }

    /// The live session, if the cookie resolved to one
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The raw cookie token, even when it no longer resolves
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl<S: Storage + 'static> FromRequestParts<Arc<AppState<S>>> for SessionContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = cookie_value(&parts.headers, SESSION_COOKIE) else {
            return Ok(Self::anonymous());
        };
        let session = state.auth.current_session(&token).await;
        Ok(Self { token: Some(token), session })
    }
}

/// Client address used as the login throttle key.
///
/// The socket peer, unless `trust_proxy_headers` is set; then `X-Real-IP`,
/// then the first `X-Forwarded-For` hop, falling back to the socket peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientAddr(pub Option<String>);

impl ClientAddr {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    fn from_proxy_headers(parts: &Parts) -> Option<String> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        header("x-real-ip").or_else(|| header("x-forwarded-for"))
    }

    fn from_peer(parts: &Parts) -> Option<String> {
        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    }
}

impl<S: Storage + 'static> FromRequestParts<Arc<AppState<S>>> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let forwarded = if state.settings.trust_proxy_headers {
            Self::from_proxy_headers(parts)
        } else {
            None
        };
        Ok(Self(forwarded.or_else(|| Self::from_peer(parts))))
    }
}
