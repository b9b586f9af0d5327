//! Session and flash cookies.
use std::time::Duration;

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as MaxAge;

/// Cookie carrying the signed session token
pub const SESSION_COOKIE: &str = "gymdesk_session";

/// Cookie carrying pending flash messages
pub const FLASH_COOKIE: &str = "gymdesk_flash";

fn app_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Non-empty value of the cookie called `name` in the request headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Session token cookie, expiring with the session
pub fn session_cookie(token: String, ttl: Duration, secure: bool) -> Cookie<'static> {
    let mut cookie = app_cookie(SESSION_COOKIE, token, secure);
    cookie.set_max_age(MaxAge::try_from(ttl).unwrap_or(MaxAge::MAX));
    cookie
}

/// Browser-session cookie holding an already encoded flash payload
pub fn flash_cookie(payload: String) -> Cookie<'static> {
    app_cookie(FLASH_COOKIE, payload, false)
}

/// Cookie that makes the browser drop `name`
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = app_cookie(name, String::new(), false);
    cookie.make_removal();
    cookie
}
