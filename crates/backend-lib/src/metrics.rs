// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const LOGIN_SUCCEEDED: &str = "auth.login.succeeded";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const LOGIN_THROTTLED: &str = "auth.login.throttled";
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_DESTROYED: &str = "session.destroyed";
pub const SESSION_EXPIRED: &str = "session.expired";
pub const SESSION_ACTIVE: &str = "session.active";
pub const GUARD_DENIED: &str = "guard.denied";
pub const AUDIT_WRITTEN: &str = "audit.written";
pub const AUDIT_WRITE_FAILED: &str = "audit.write_failed";
