//! Router Module Index
//!
//! Routing is split by access level so the session guard is applied to whole
//! routers rather than remembered per handler.

/// Routes accessible to everyone (health, blog pages).
pub mod public;

/// Label management API. Requires a session.
pub mod admin;
