//! Sessions and the request extractors that gate the API by role.

mod extract;
pub mod session;

pub use extract::{session_token, AdminSession, CurrentSession, StudentSession};
pub use session::{Session, SessionStore};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "portal_session";
