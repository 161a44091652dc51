//! Unified error handling with Sentry integration.
//!
//! Most shop API failures never become an `AppError`: handlers that can
//! recover (flash messages, empty states) deal with [`ShopError`] inline.
//! What bubbles up here is the unrecoverable remainder, captured to Sentry
//! before responding to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::shop::ShopError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Shop API operation failed.
    #[error("Shop API error: {0}")]
    Shop(#[from] ShopError),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Shop(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show the client.
    ///
    /// Upstream failures are collapsed so their details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Shop(_) => "External service error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );

        (self.status_code(), self.public_message()).into_response()
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("review", "Submitted review", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Shop(ShopError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(err.to_string(), "Shop API error: API error: 500 - boom");
    }

    #[test]
    fn test_app_error_status_codes() {
        let shop = AppError::Shop(ShopError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(shop.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_upstream_details_are_not_exposed() {
        let shop = AppError::Shop(ShopError::Api {
            status: 500,
            message: "mongo connection refused at 10.0.0.3".to_string(),
        });
        assert_eq!(shop.public_message(), "External service error");
    }
}
