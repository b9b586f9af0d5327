// ============================
// gymdesk-backend/src/audit.rs
// ============================
//! Append-only audit trail of security-relevant actions.
//!
//! Writes are fire-and-forget: a failed write is logged and counted but never
//! reaches the caller, so the audited action always proceeds.
use gymdesk_common::AuditAction;
use metrics::counter;

use crate::auth::Session;
use crate::error::AppError;
use crate::metrics::{AUDIT_WRITE_FAILED, AUDIT_WRITTEN};
use crate::models::{AuditEntry, AuditRecord, NewAuditEntry};
use crate::storage::Storage;
use crate::validation::validate_audit_entry;

/// Number of entries shown on the dashboard
pub const DASHBOARD_AUDIT_LIMIT: usize = 5;

/// Records audit entries on behalf of authenticated sessions
#[derive(Clone, Debug)]
pub struct AuditLogger<S> {
    storage: S,
}

impl<S: Storage> AuditLogger<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Append one entry acted by `session`'s user. Never fails.
    pub async fn record(
        &self,
        session: &Session,
        action: AuditAction,
        affected_table: &str,
        record_id: Option<i64>,
        detail: Option<&str>,
    ) -> Option<AuditEntry> {
        let entry = NewAuditEntry {
            user_id: session.user_id,
            action,
            affected_table: affected_table.to_string(),
            record_id,
            detail: detail.map(str::to_string),
        };

        match self.try_record(&entry).await {
            Ok(written) => {
                counter!(AUDIT_WRITTEN).increment(1);
                Some(written)
            },
            Err(e) => {
                counter!(AUDIT_WRITE_FAILED).increment(1);
                tracing::error!(
                    user_id = entry.user_id,
                    action = %entry.action,
                    table = %entry.affected_table,
                    error = %e,
                    "failed to write audit entry"
                );
                None
            },
        }
    }

    async fn try_record(&self, entry: &NewAuditEntry) -> Result<AuditEntry, AppError> {
        validate_audit_entry(entry).map_err(|e| AppError::AuditWrite(e.to_string()))?;
        self.storage.append_audit(entry).await.map_err(|e| match e {
            AppError::AuditWrite(_) => e,
            other => AppError::AuditWrite(other.to_string()),
        })
    }

    /// Most recent `limit` entries, newest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>, AppError> {
        self.storage.recent_audit(limit).await
    }
}
