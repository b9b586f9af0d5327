//! One-shot flash messages carried across a redirect in a cookie.
use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use gymdesk_common::Flash;

use super::cookies::{cookie_value, flash_cookie, removal_cookie, FLASH_COOKIE};

/// Cookie value holding `flashes`
pub fn encode_flashes(flashes: &[Flash]) -> String {
    let json = serde_json::to_vec(flashes).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Inverse of [`encode_flashes`]; anything malformed decodes to nothing
pub fn decode_flashes(value: &str) -> Vec<Flash> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|json| serde_json::from_slice(&json).ok())
        .unwrap_or_default()
}

/// Cookie scheduling `flashes` for the next page
pub fn flashes_cookie(flashes: &[Flash]) -> Cookie<'static> {
    flash_cookie(encode_flashes(flashes))
}

/// 303 redirect to `location` carrying one flash message
pub fn redirect_with_flash(location: &str, flash: Flash) -> Response {
    let jar = CookieJar::new().add(flashes_cookie(&[flash]));
    (jar, Redirect::to(location)).into_response()
}

/// Flash messages pending for this request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashMessages(Vec<Flash>);

impl FlashMessages {
    pub fn new(flashes: Vec<Flash>) -> Self {
        Self(flashes)
    }

    pub fn messages(&self) -> &[Flash] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, flash: Flash) {
        self.0.push(flash);
    }

    /// Respond with `body`, clearing the flash cookie once it was shown
    pub fn consume(&self, body: impl IntoResponse) -> Response {
        if self.is_empty() {
            body.into_response()
        } else {
            (CookieJar::new().add(removal_cookie(FLASH_COOKIE)), body).into_response()
        }
    }
}

impl<T: Send + Sync> FromRequestParts<T> for FlashMessages {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &T) -> Result<Self, Self::Rejection> {
        Ok(Self(
            cookie_value(&parts.headers, FLASH_COOKIE)
                .map(|value| decode_flashes(&value))
                .unwrap_or_default(),
        ))
    }
}
