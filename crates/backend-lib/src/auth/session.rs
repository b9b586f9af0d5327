// ============================
// gymdesk-backend/src/auth/session.rs
// ============================
//! Server-side sessions keyed by signed tokens.
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use gymdesk_common::{Role, UserId};
use metrics::{counter, gauge};
use tokio::sync::RwLock;

use super::token_generator::{generate_secure_token, TokenSigner};
use crate::metrics::{SESSION_ACTIVE, SESSION_CREATED, SESSION_DESTROYED, SESSION_EXPIRED};
use crate::models::User;

/// Default session TTL (time to live)
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 12); // 12 hours

/// Snapshot of the user taken at login; later edits to the user do not show here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub display_name: String,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
}

impl Session {
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}

/// Session manager for handling authentication tokens
#[derive(Clone, Debug)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    signer: TokenSigner,
    ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            signer: TokenSigner::new(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a session for `user`; returns the signed cookie token with it
    pub async fn create_session(&self, user: &User) -> (String, Session) {
        let token = generate_secure_token();
        let now = SystemTime::now();
        let session = Session {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            display_name: user.display_name.clone(),
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), session.clone());

        counter!(SESSION_CREATED).increment(1);
        gauge!(SESSION_ACTIVE).set(sessions.len() as f64);

        (self.signer.sign(&token), session)
    }

    /// Look up the session behind a signed token.
    ///
    /// Forged tokens resolve to `None`; expired sessions are evicted.
    pub async fn current_session(&self, signed_token: &str) -> Option<Session> {
        let token = self.signer.verify(signed_token)?;
        let now = SystemTime::now();

        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return None,
                Some(session) if !session.is_expired_at(now) => return Some(session.clone()),
                Some(_) => {},
            }
        }

        let mut sessions = self.sessions.write().await;
        if sessions.get(token).is_some_and(|s| s.is_expired_at(now)) {
            sessions.remove(token);
            counter!(SESSION_EXPIRED).increment(1);
            gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
        }
        None
    }

    /// Remove the session behind a signed token; a no-op for unknown tokens
    pub async fn destroy_session(&self, signed_token: &str) -> Option<Session> {
        let token = self.signer.verify(signed_token)?;
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(token);
        if removed.is_some() {
            counter!(SESSION_DESTROYED).increment(1);
            gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
        }
        removed
    }

    /// Drop every expired session, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = SystemTime::now();
        let before_count = sessions.len();

        sessions.retain(|_, session| !session.is_expired_at(now));

        let after_count = sessions.len();
        let removed = before_count - after_count;

        if removed > 0 {
            counter!(SESSION_EXPIRED).increment(removed as u64);
            gauge!(SESSION_ACTIVE).set(after_count as f64);
            tracing::debug!(removed, remaining = after_count, "expired sessions removed");
        }
        removed
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
