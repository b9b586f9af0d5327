// ============================
// gymdesk-backend/src/models.rs
// ============================
//! Records persisted by the stores.
use chrono::{DateTime, Utc};
use gymdesk_common::{AuditAction, AuditEntryId, Role, UserId};
use serde::{Deserialize, Serialize};

/// A login account
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// scrypt PHC string, never the plaintext
    pub password_hash: String,
    pub role: Role,
    pub display_name: String,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("active", &self.active)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Fields needed to insert a user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub display_name: String,
    pub email: Option<String>,
}

/// An immutable audit log row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub user_id: UserId,
    pub action: AuditAction,
    pub affected_table: String,
    pub record_id: Option<i64>,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An audit entry before the store assigns its id and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub user_id: UserId,
    pub action: AuditAction,
    pub affected_table: String,
    pub record_id: Option<i64>,
    pub detail: Option<String>,
}

/// Audit entry joined with the acting user's name, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    #[serde(flatten)]
    pub entry: AuditEntry,
    pub username: String,
}

/// Aggregate counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub active_members: i64,
    pub payments_today: i64,
    pub attendance_today: i64,
    pub active_classes: i64,
}
