// ============================
// gymdesk-backend/src/storage/mod.rs
// ============================
//! Storage abstraction with MySQL and flat-file implementations.
use async_trait::async_trait;
use gymdesk_common::Role;

use crate::auth::{generate_secure_token_with_size, PasswordHasher};
use crate::config::BootstrapAdmin;
use crate::error::AppError;
use crate::models::{AuditEntry, AuditRecord, DashboardStats, NewAuditEntry, NewUser, User};
use crate::validation;

pub mod flat_file;
pub mod mysql;

pub use flat_file::FlatFileStorage;
pub use mysql::MySqlStorage;

/// Name of the users table, as recorded in audit entries
pub const USERS_TABLE: &str = "users";

/// Trait for storage backends.
///
/// Every method reports an unreachable store as [`AppError::Connection`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create the users and audit log tables when missing
    async fn ensure_schema(&self) -> Result<(), AppError>;

    /// Number of user records, active or not
    async fn count_users(&self) -> Result<u64, AppError>;

    /// Insert a user; fails with [`AppError::DuplicateUser`] on a taken username
    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError>;

    /// Find an active user by exact username
    async fn find_active_user(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Append an entry to the audit log; the store assigns id and timestamp
    async fn append_audit(&self, entry: &NewAuditEntry) -> Result<AuditEntry, AppError>;

    /// Most recent audit entries, newest first
    async fn recent_audit(&self, limit: usize) -> Result<Vec<AuditRecord>, AppError>;

    /// Aggregate counts for the dashboard
    async fn dashboard_stats(&self) -> Result<DashboardStats, AppError>;
}

/// Account details for [`register_user`]
#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub role: Role,
    pub display_name: &'a str,
    pub email: Option<&'a str>,
}

/// Validate, hash and insert a new account
pub async fn register_user<S: Storage + ?Sized>(
    storage: &S,
    hasher: &PasswordHasher,
    registration: Registration<'_>,
) -> Result<User, AppError> {
    let username = validation::validate_username(registration.username)?;
    let display_name = validation::validate_display_name(registration.display_name)?;
    let email = registration
        .email
        .map(validation::validate_email)
        .transpose()?;

    let password_hash = hasher.hash_blocking(registration.password).await?;

    let user = storage
        .insert_user(&NewUser {
            username: username.to_string(),
            password_hash,
            role: registration.role,
            display_name: display_name.to_string(),
            email: email.map(str::to_string),
        })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "user created");
    Ok(user)
}

/// What [`bootstrap`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Users already existed; nothing was seeded
    AlreadyInitialized,
    /// The bootstrap admin was created
    AdminCreated {
        username: String,
        /// Set when no password was configured and one was generated
        generated_password: Option<String>,
    },
}

/// Create the schema and seed an admin into an empty user table
pub async fn bootstrap<S: Storage + ?Sized>(
    storage: &S,
    admin: &BootstrapAdmin,
    hasher: &PasswordHasher,
) -> Result<BootstrapOutcome, AppError> {
    storage.ensure_schema().await?;

    if storage.count_users().await? > 0 {
        tracing::info!("user table already initialized");
        return Ok(BootstrapOutcome::AlreadyInitialized);
    }

    let generated_password = match admin.password {
        Some(_) => None,
        None => Some(generate_secure_token_with_size(12)),
    };
    let password = admin
        .password
        .as_deref()
        .or(generated_password.as_deref())
        .unwrap_or_default();

    let user = register_user(
        storage,
        hasher,
        Registration {
            username: &admin.username,
            password,
            role: Role::Admin,
            display_name: &admin.display_name,
            email: admin.email.as_deref(),
        },
    )
    .await?;

    Ok(BootstrapOutcome::AdminCreated {
        username: user.username,
        generated_password,
    })
}
