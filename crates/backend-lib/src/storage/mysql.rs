// ============================
// gymdesk-backend/src/storage/mysql.rs
// ============================
//! MySQL store backed by a lazily connected sqlx pool.
//!
//! The pool connects on first use, so the server starts even while the
//! database is down; each request then fails with [`AppError::Connection`].
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gymdesk_common::Role;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow},
    Row,
};

use super::Storage;
use crate::config::DatabaseSettings;
use crate::error::AppError;
use crate::models::{AuditEntry, AuditRecord, DashboardStats, NewAuditEntry, NewUser, User};

const CREATE_USERS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        username VARCHAR(50) UNIQUE NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        role ENUM('admin', 'responsible', 'user') NOT NULL,
        display_name VARCHAR(100) NOT NULL,
        email VARCHAR(100),
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        active BOOLEAN DEFAULT TRUE
    )";

const CREATE_AUDIT_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS audit_log (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        user_id BIGINT NOT NULL,
        action VARCHAR(50) NOT NULL,
        affected_table VARCHAR(50) NOT NULL,
        record_id BIGINT NULL,
        detail VARCHAR(255) NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        INDEX idx_audit_log_created_at (created_at),
        CONSTRAINT fk_audit_log_user FOREIGN KEY (user_id) REFERENCES users (id)
    )";

const USER_COLUMNS: &str =
    "id, username, password_hash, CAST(role AS CHAR) AS role, display_name, email, active, created_at";

const AUDIT_COLUMNS: &str =
    "l.id, l.user_id, l.action, l.affected_table, l.record_id, l.detail, l.created_at";

/// MySQL implementation of the Storage trait
#[derive(Clone, Debug)]
pub struct MySqlStorage {
    pool: MySqlPool,
}

impl MySqlStorage {
    /// Build a pool that opens connections on demand
    pub fn connect_lazy(settings: &DatabaseSettings) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password)
            .database(&settings.name);

        let pool = MySqlPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .connect_lazy_with(options);

        Self { pool }
    }

    async fn count(&self, sql: &str) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar::<_, i64>(sql).fetch_one(&self.pool).await?)
    }
}

fn user_from_row(row: &MySqlRow) -> Result<User, AppError> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        role: role
            .parse::<Role>()
            .map_err(|e| AppError::Database(e.to_string()))?,
        display_name: row.try_get("display_name")?,
        email: row.try_get("email")?,
        active: row.try_get("active")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn audit_from_row(row: &MySqlRow) -> Result<AuditEntry, AppError> {
    let action: String = row.try_get("action")?;
    Ok(AuditEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        action: action.into(),
        affected_table: row.try_get("affected_table")?,
        record_id: row.try_get("record_id")?,
        detail: row.try_get("detail")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl Storage for MySqlStorage {
    async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_AUDIT_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, AppError> {
        let count = self.count("SELECT COUNT(*) FROM users").await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, role, display_name, email) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.display_name)
        .bind(&user.email)
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::DuplicateUser(_) => AppError::DuplicateUser(user.username.clone()),
            other => other,
        })?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|e| AppError::Database(e.to_string()))?;
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        user_from_row(&row)
    }

    async fn find_active_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? AND active = TRUE"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn append_audit(&self, entry: &NewAuditEntry) -> Result<AuditEntry, AppError> {
        let result = sqlx::query(
            "INSERT INTO audit_log (user_id, action, affected_table, record_id, detail) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.user_id)
        .bind(entry.action.as_str())
        .bind(&entry.affected_table)
        .bind(entry.record_id)
        .bind(&entry.detail)
        .execute(&self.pool)
        .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|e| AppError::Database(e.to_string()))?;
        let row = sqlx::query(&format!("SELECT {AUDIT_COLUMNS} FROM audit_log l WHERE l.id = ?"))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        audit_from_row(&row)
    }

    async fn recent_audit(&self, limit: usize) -> Result<Vec<AuditRecord>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {AUDIT_COLUMNS}, u.username \
             FROM audit_log l JOIN users u ON l.user_id = u.id \
             ORDER BY l.created_at DESC, l.id DESC LIMIT ?"
        ))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(AuditRecord {
                    entry: audit_from_row(row)?,
                    username: row.try_get("username")?,
                })
            })
            .collect()
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        Ok(DashboardStats {
            active_members: self.count("SELECT COUNT(*) FROM members WHERE active = TRUE").await?,
            payments_today: self
                .count("SELECT COUNT(*) FROM payments WHERE DATE(paid_at) = CURDATE()")
                .await?,
            attendance_today: self
                .count("SELECT COUNT(*) FROM attendance WHERE DATE(checked_in_at) = CURDATE()")
                .await?,
            active_classes: self.count("SELECT COUNT(*) FROM classes WHERE active = TRUE").await?,
        })
    }
}
