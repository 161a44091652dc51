//! Shop API client.
//!
//! The remote shop REST API owns all durable state: accounts, products,
//! reviews, and wishlists. This module is the single boundary the rest of
//! the storefront talks through ([`ShopClient`]), with one typed operation
//! per backend endpoint and a shared error taxonomy ([`ShopError`]).
//!
//! Calls are single-shot: no retries, no client-side timeouts, no
//! cancellation. A call runs until the transport resolves it one way or
//! the other.

pub mod client;
pub mod types;

pub use client::ShopClient;
pub use types::{AuthSession, Product, Review, ReviewPayload, Reviewer};

use thiserror::Error;

/// Errors that can occur when interacting with the shop API.
#[derive(Debug, Error)]
pub enum ShopError {
    /// HTTP transport failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        /// Backend-provided message, empty when the body carried none.
        message: String,
    },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ShopError {
    /// Whether the backend rejected the call as forbidden.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Api { status: 403, .. })
    }

    /// Whether the backend reported the resource missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Message suitable for showing the user, if the backend sent one.
    ///
    /// Transport and parse failures never expose their internals here;
    /// callers fall back to their own wording for those.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_and_message() {
        let err = ShopError::Api {
            status: 403,
            message: "You can only modify your own review".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error: 403 - You can only modify your own review"
        );
    }

    #[test]
    fn forbidden_and_not_found_predicates() {
        let forbidden = ShopError::Api {
            status: 403,
            message: String::new(),
        };
        assert!(forbidden.is_forbidden());
        assert!(!forbidden.is_not_found());

        let missing = ShopError::Api {
            status: 404,
            message: "Product not found".to_string(),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_forbidden());

        let server = ShopError::Api {
            status: 500,
            message: String::new(),
        };
        assert!(!server.is_forbidden());
        assert!(!server.is_not_found());
    }

    #[test]
    fn api_message_skips_empty_bodies() {
        let with_message = ShopError::Api {
            status: 400,
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(with_message.api_message(), Some("Invalid credentials"));

        let empty = ShopError::Api {
            status: 502,
            message: String::new(),
        };
        assert_eq!(empty.api_message(), None);

        let parse = ShopError::Parse("bad json".to_string());
        assert_eq!(parse.api_message(), None);
    }
}
