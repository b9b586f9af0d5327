// crates/backend-lib/src/middleware/mod.rs

//! Request-scoped plumbing: cookies, flash messages, session context and guards.

pub mod cookies;
pub mod flash;
pub mod guard;
pub mod session;

pub use flash::{redirect_with_flash, FlashMessages};
pub use guard::{require_authenticated, require_role, AccessDenied, STAFF_ROLES};
pub use session::{ClientAddr, SessionContext};
