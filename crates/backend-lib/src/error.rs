// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Audit log write failed: {0}")]
    AuditWrite(String),

    #[error("Authentication rate limit exceeded")]
    AuthRateLimited,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Username already exists: {0}")]
    DuplicateUser(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUser(_) => StatusCode::CONFLICT,
            AppError::AuthRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Connection(_) => "DB_001",
            AppError::Database(_) => "DB_002",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::Unauthenticated => "AUTH_002",
            AppError::Forbidden => "AUTH_003",
            AppError::AuthRateLimited => "AUTH_004",
            AppError::AuditWrite(_) => "AUDIT_001",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::DuplicateUser(_) => "VAL_002",
            AppError::Config(_) => "CFG_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for showing to users
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Connection(_) => "Could not connect to the database.".to_string(),
            AppError::InvalidCredentials => "Incorrect username or password.".to_string(),
            AppError::Unauthenticated => "You must log in to access this page.".to_string(),
            AppError::Forbidden => "You do not have permission to access this page.".to_string(),
            AppError::AuthRateLimited => {
                "Too many login attempts, please try again later.".to_string()
            },
            AppError::InvalidInput(_) => "Invalid input provided.".to_string(),
            AppError::DuplicateUser(_) => "That username is already taken.".to_string(),
            AppError::AuditWrite(_)
            | AppError::Database(_)
            | AppError::Config(_)
            | AppError::Internal(_)
            | AppError::Io(_)
            | AppError::Json(_) => "An internal server error occurred.".to_string(),
        }
    }

    /// True when the store could not be reached at all
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, AppError::Connection(_))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => AppError::Connection(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateUser(db.message().to_string())
            },
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = crate::views::error_page(status, self.error_code(), &message);
        (status, body).into_response()
    }
}
