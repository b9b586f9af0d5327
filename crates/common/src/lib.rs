// ================
// crates/common/src/lib.rs
// ================
//! Common types shared by the `GymDesk` backend library and server binary.
//! This module defines the role vocabulary, audit action codes and flash
//! message levels used across the web layer and the stores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primary key of a user record
pub type UserId = i64;

/// Primary key of an audit log entry
pub type AuditEntryId = i64;

/// Permission level assigned to a user
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including user management
    Admin,
    /// Front-desk staff: members, payments and classes
    Responsible,
    /// Regular account: dashboard only
    User,
}

impl Role {
    /// Every role, in descending order of privilege
    pub const ALL: [Role; 3] = [Role::Admin, Role::Responsible, Role::User];

    /// Stable string form, as stored in the `users.role` column
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Responsible => "responsible",
            Role::User => "user",
        }
    }

    /// Human readable label for views
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Responsible => "Responsible",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            // legacy spelling from the first deployment's schema
            "responsible" | "responsable" => Ok(Role::Responsible),
            "user" | "usuario" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Action code written to the audit log
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(into = "String", from = "String")]
pub enum AuditAction {
    Login,
    Logout,
    /// Any other short action code, e.g. `CREATE_MEMBER`
    Other(String),
}

impl AuditAction {
    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::Other(code) => code,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AuditAction {
    fn from(code: String) -> Self {
        match code.as_str() {
            "LOGIN" => AuditAction::Login,
            "LOGOUT" => AuditAction::Logout,
            _ => AuditAction::Other(code),
        }
    }
}

impl From<&str> for AuditAction {
    fn from(code: &str) -> Self {
        AuditAction::from(code.to_string())
    }
}

impl From<AuditAction> for String {
    fn from(action: AuditAction) -> Self {
        action.as_str().to_string()
    }
}

/// Severity of a one-shot flash message
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    /// CSS class used by the views
    pub fn css_class(self) -> &'static str {
        match self {
            FlashLevel::Success => "flash-success",
            FlashLevel::Info => "flash-info",
            FlashLevel::Error => "flash-error",
        }
    }
}

/// A one-shot message shown on the next rendered page
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Error, message)
    }
}
