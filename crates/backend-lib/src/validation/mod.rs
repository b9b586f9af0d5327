// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Input validation for accounts, login forms and audit entries.
//!
//! Limits mirror the column sizes of the `users` and `audit_log` tables.

use crate::error::AppError;
use crate::models::NewAuditEntry;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 100;
/// Upper bound on submitted passwords, to keep hashing cost bounded
pub const MAX_PASSWORD_LENGTH: usize = 1024;
pub const MAX_ACTION_LENGTH: usize = 50;
pub const MAX_TABLE_NAME_LENGTH: usize = 50;
pub const MAX_DETAIL_LENGTH: usize = 255;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap());
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
static ACTION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());
static TABLE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid display name: {0}")]
    InvalidDisplayName(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid audit entry: {0}")]
    InvalidAuditEntry(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Validate a username for a new account
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    if username.is_empty() {
        return Err(ValidationError::InvalidUsername(
            "Username must not be empty".to_string(),
        ));
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::InvalidUsername(format!(
            "Username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername(
            "Username may only contain letters, digits, '.', '_' and '-'".to_string(),
        ));
    }

    Ok(username)
}

/// Validate a display name
pub fn validate_display_name(name: &str) -> ValidationResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidDisplayName(
            "Display name must not be empty".to_string(),
        ));
    }

    if trimmed.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(ValidationError::InvalidDisplayName(format!(
            "Display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }

    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::InvalidDisplayName(
            "Display name must not contain control characters".to_string(),
        ));
    }

    Ok(trimmed)
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email must be at most {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Email format is invalid".to_string(),
        ));
    }

    Ok(email)
}

/// Cheap shape check on a submitted login form.
///
/// A failure here is reported to the user exactly like a wrong password.
pub fn validate_login_fields(username: &str, password: &str) -> ValidationResult<()> {
    if username.is_empty() || username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::InvalidUsername(
            "Username is empty or too long".to_string(),
        ));
    }

    if password.is_empty() || password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(
            "Password is empty or too long".to_string(),
        ));
    }

    Ok(())
}

/// Validate an audit entry before it is written
pub fn validate_audit_entry(entry: &NewAuditEntry) -> ValidationResult<()> {
    let action = entry.action.as_str();
    if action.is_empty() || action.len() > MAX_ACTION_LENGTH || !ACTION_REGEX.is_match(action) {
        return Err(ValidationError::InvalidAuditEntry(format!(
            "action '{action}' must be an upper-case code of at most {MAX_ACTION_LENGTH} characters"
        )));
    }

    let table = entry.affected_table.as_str();
    if table.is_empty() || table.len() > MAX_TABLE_NAME_LENGTH || !TABLE_REGEX.is_match(table) {
        return Err(ValidationError::InvalidAuditEntry(format!(
            "table '{table}' must be a lower-case name of at most {MAX_TABLE_NAME_LENGTH} characters"
        )));
    }

    if let Some(detail) = &entry.detail {
        if detail.chars().count() > MAX_DETAIL_LENGTH {
            return Err(ValidationError::InvalidAuditEntry(format!(
                "detail must be at most {MAX_DETAIL_LENGTH} characters"
            )));
        }
    }

    Ok(())
}
