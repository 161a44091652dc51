//! Domain models for the storefront.
//!
//! The backend owns every durable entity, so the only model that lives
//! here is the session-stored identity.

pub mod session;

pub use session::CurrentUser;
pub use session::keys as session_keys;
