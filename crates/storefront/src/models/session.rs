//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use wishmark_core::UserId;

use crate::token;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in visitor:
/// the display name shown in the navbar and the bearer token attached to
/// shop API calls. Written on login/register, wiped on logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Display name returned by the backend.
    pub name: String,
    /// Opaque bearer token for the shop API.
    pub token: String,
}

impl CurrentUser {
    /// The account id the bearer token claims to belong to.
    ///
    /// Decoded without verification, so it only decides which controls a
    /// page renders; the backend re-checks ownership on every mutation.
    /// `None` when the token is malformed.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        token::decode_user_id(&self.token)
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
