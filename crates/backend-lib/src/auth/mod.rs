// ============================
// gymdesk-backend/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod rate_limit;
pub mod session;
pub mod token_generator;
mod service;
mod service_impl;

pub use password::{
    validate_password_strength, PasswordHasher, PasswordRequirements, MIN_PASSWORD_LENGTH,
};
pub use rate_limit::AuthRateLimiter;
pub use service::{AuthService, LoginSuccess};
pub use service_impl::DefaultAuth;
pub use session::{Session, SessionManager, SESSION_TTL};
pub use token_generator::{generate_secure_token, generate_secure_token_with_size, TokenSigner};
