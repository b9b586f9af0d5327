use async_trait::async_trait;

use super::Session;
use crate::error::AppError;

/// A completed login: the signed cookie token and the session behind it
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub token: String,
    pub session: Session,
}

/// The authentication state machine: Anonymous → Authenticated → Anonymous.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and open a session.
    ///
    /// Unknown users and wrong passwords both yield
    /// [`AppError::InvalidCredentials`]; an unreachable store yields
    /// [`AppError::Connection`]. `client` keys login throttling.
    async fn login(
        &self,
        client: Option<&str>,
        username: &str,
        password: &str,
    ) -> Result<LoginSuccess, AppError>;

    /// Audit and close the session behind `token`, if any
    async fn logout(&self, token: &str) -> Option<Session>;

    /// Resolve a signed token to a live session
    async fn current_session(&self, token: &str) -> Option<Session>;
}
