// ============================
// gymdesk-backend/src/lib.rs
// ============================
//! Core of the GymDesk web application: authentication, role guards,
//! audit logging and the server-rendered pages built on them.

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod router;
pub mod storage;
pub mod validation;
pub mod views;

use std::sync::Arc;
use std::time::Duration;

use crate::audit::AuditLogger;
use crate::auth::{AuthRateLimiter, AuthService, DefaultAuth, PasswordHasher, SessionManager};
use crate::config::Settings;
use crate::error::AppError;
use crate::storage::Storage;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Session table, shared with `auth`
    pub sessions: SessionManager,
    pub settings: Arc<Settings>,
    /// Storage backend
    pub storage: S,
    pub audit: AuditLogger<S>,
    /// Failed-login throttle, shared with `auth`
    pub login_limiter: AuthRateLimiter,
    pub hasher: PasswordHasher,
}

impl<S: Storage + Clone + 'static> AppState<S> {
    /// Wire the services for `storage` from validated settings
    pub fn new(storage: S, settings: Settings) -> Result<Self, AppError> {
        settings.validate()?;
        let hasher = PasswordHasher::from_settings(&settings.password_hash)?;
        Self::with_hasher(storage, settings, hasher)
    }

    /// Like [`AppState::new`] with an explicit hasher
    pub fn with_hasher(storage: S, settings: Settings, hasher: PasswordHasher) -> Result<Self, AppError> {
        let sessions = SessionManager::new(
            &settings.secret_key,
            Duration::from_secs(settings.session_ttl_secs),
        );
        let login_limiter = AuthRateLimiter::from_settings(&settings.login_throttle);
        let auth = Arc::new(DefaultAuth::new(
            storage.clone(),
            sessions.clone(),
            hasher,
            login_limiter.clone(),
        )?);

        Ok(Self {
            auth,
            sessions,
            settings: Arc::new(settings),
            audit: AuditLogger::new(storage.clone()),
            storage,
            login_limiter,
            hasher,
        })
    }
}
