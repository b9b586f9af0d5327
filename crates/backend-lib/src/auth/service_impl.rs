use async_trait::async_trait;
use gymdesk_common::AuditAction;
use metrics::counter;

use super::{
    generate_secure_token, AuthRateLimiter, AuthService, LoginSuccess, PasswordHasher, Session,
    SessionManager,
};
use crate::audit::AuditLogger;
use crate::error::AppError;
use crate::metrics::{LOGIN_FAILED, LOGIN_SUCCEEDED, LOGIN_THROTTLED};
use crate::storage::{Storage, USERS_TABLE};
use crate::validation::validate_login_fields;

pub struct DefaultAuth<S> {
    storage: S,
    sessions: SessionManager,
    hasher: PasswordHasher,
    audit: AuditLogger<S>,
    limiter: AuthRateLimiter,
    /// Verified against when the username is unknown, so both failure
    /// paths cost one scrypt evaluation
    decoy_hash: String,
}

impl<S: Storage + Clone> DefaultAuth<S> {
    pub fn new(
        storage: S,
        sessions: SessionManager,
        hasher: PasswordHasher,
        limiter: AuthRateLimiter,
    ) -> Result<Self, AppError> {
        let decoy_hash = hasher.hash(&generate_secure_token())?;
        Ok(Self {
            audit: AuditLogger::new(storage.clone()),
            storage,
            sessions,
            hasher,
            limiter,
            decoy_hash,
        })
    }

    fn reject(&self, client: Option<&str>, username: &str) -> AppError {
        if let Some(client) = client {
            self.limiter.record_failed_attempt(client);
        }
        counter!(LOGIN_FAILED).increment(1);
        tracing::warn!(username, client = client.unwrap_or("-"), "login rejected");
        AppError::InvalidCredentials
    }
}

#[async_trait]
impl<S: Storage + Clone + 'static> AuthService for DefaultAuth<S> {
    async fn login(
        &self,
        client: Option<&str>,
        username: &str,
        password: &str,
    ) -> Result<LoginSuccess, AppError> {
        if let Some(client) = client {
            if !self.limiter.check_rate_limit(client) {
                counter!(LOGIN_THROTTLED).increment(1);
                tracing::warn!(client, "login attempt while locked out");
                return Err(AppError::AuthRateLimited);
            }
        }

        if validate_login_fields(username, password).is_err() {
            return Err(self.reject(client, username));
        }

        let user = self.storage.find_active_user(username).await.map_err(|e| {
            tracing::error!(error = %e, "credential store lookup failed");
            e
        })?;

        let Some(user) = user else {
            self.hasher.verify_blocking(&self.decoy_hash, password).await;
            return Err(self.reject(client, username));
        };
        if !self.hasher.verify_blocking(&user.password_hash, password).await {
            return Err(self.reject(client, username));
        }

        let (token, session) = self.sessions.create_session(&user).await;

        self.audit
            .record(&session, AuditAction::Login, USERS_TABLE, Some(user.id), Some("Successful login"))
            .await;

        if let Some(client) = client {
            self.limiter.record_success(client);
        }
        counter!(LOGIN_SUCCEEDED).increment(1);
        tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "user logged in");

        Ok(LoginSuccess { token, session })
    }

    async fn logout(&self, token: &str) -> Option<Session> {
        let session = self.sessions.current_session(token).await?;

        // logged while the session is still valid
        self.audit
            .record(&session, AuditAction::Logout, USERS_TABLE, Some(session.user_id), Some("Logout"))
            .await;
        self.sessions.destroy_session(token).await;

        tracing::info!(user_id = session.user_id, username = %session.username, "user logged out");
        Some(session)
    }

    async fn current_session(&self, token: &str) -> Option<Session> {
        self.sessions.current_session(token).await
    }
}
