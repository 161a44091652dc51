//! Wishlist route handlers.
//!
//! The page is a full fetch-and-render; removal is the one HTMX fragment
//! in the storefront. Removal is confirmed, not optimistic: the card is
//! dropped from the page only after the backend delete succeeds, and a
//! failed delete leaves the card in place with an inline error.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use wishmark_core::ProductId;

use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::shop::{Product, ShopError};
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Add-to-wishlist form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    /// Page to return to after adding (catalog or a product page).
    pub return_to: Option<String>,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistTemplate {
    pub current_user: Option<CurrentUser>,
    pub products: Vec<Product>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Fragment confirming a removal (HTMX).
///
/// The out-of-band `delete` swap removes the product's card; the main
/// response body clears the card's inline error slot.
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_removed.html")]
pub struct WishlistRemovedTemplate {
    pub product_id: ProductId,
}

/// Inline error fragment for a failed removal (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_remove_error.html")]
pub struct WishlistRemoveErrorTemplate {
    pub message: String,
}

// =============================================================================
// Redirect Targets
// =============================================================================

/// Clamp a form-supplied return path to a local page.
///
/// Anything that is not a same-site absolute path falls back to the
/// catalog. `//host` is scheme-relative and `/\host` is treated the same
/// way by browsers, so both are rejected.
fn safe_return_path(raw: Option<&str>) -> String {
    match raw {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Append a flash message to a path that may already carry a query string.
fn with_flash(path: &str, key: &str, message: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{key}={}", urlencoding::encode(message))
}

// =============================================================================
// Removal Outcome
// =============================================================================

/// Fragment to render after a removal attempt.
///
/// Removal is confirmed, not optimistic: only a backend success drops the
/// card; every failure keeps the card and carries an inline message.
#[derive(Debug, PartialEq, Eq)]
enum RemoveOutcome {
    /// Drop the card from the rendered list.
    Removed,
    /// Keep the card and show this message in its flash slot.
    Kept(String),
}

/// Decide the fragment from the backend delete's result.
fn removal_outcome(result: &Result<(), ShopError>) -> RemoveOutcome {
    match result {
        Ok(()) => RemoveOutcome::Removed,
        Err(e) => RemoveOutcome::Kept(e.api_message().map_or_else(
            || "Could not remove from wishlist".to_string(),
            ToOwned::to_owned,
        )),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the wishlist page.
///
/// Requires authentication; a fetch failure renders the empty state and is
/// logged at WARN, matching the catalog's policy.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let products = state.shop().get_wishlist(&user.token).await.map_or_else(
        |e| {
            tracing::warn!("Failed to fetch wishlist: {e}");
            Vec::new()
        },
        |products| products,
    );

    WishlistTemplate {
        current_user: Some(user),
        products,
        error: query.error,
        success: query.success,
    }
}

/// Add a product to the wishlist, then return to the originating page.
#[instrument(skip(state, user, form))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
    Form(form): Form<AddForm>,
) -> Response {
    let return_to = safe_return_path(form.return_to.as_deref());

    match state.shop().add_to_wishlist(&user.token, &product_id).await {
        Ok(()) => Redirect::to(&with_flash(&return_to, "success", "Added to wishlist"))
            .into_response(),
        Err(e) => {
            tracing::warn!("Wishlist add failed: {e}");
            let message = e.api_message().map_or("Could not add to wishlist", |m| m);
            Redirect::to(&with_flash(&return_to, "error", message)).into_response()
        }
    }
}

/// Remove a product from the wishlist (HTMX fragment).
///
/// The backend delete runs first; only a success drops the card from the
/// rendered list. Responses are always 200 so HTMX swaps the fragment
/// either way.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Response {
    let result = state
        .shop()
        .remove_from_wishlist(&user.token, &product_id)
        .await;

    if let Err(e) = &result {
        tracing::warn!("Wishlist remove failed: {e}");
    }

    match removal_outcome(&result) {
        RemoveOutcome::Removed => WishlistRemovedTemplate { product_id }.into_response(),
        RemoveOutcome::Kept(message) => WishlistRemoveErrorTemplate { message }.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_paths_stay_on_site() {
        assert_eq!(safe_return_path(Some("/")), "/");
        assert_eq!(safe_return_path(Some("/products/p1")), "/products/p1");
        assert_eq!(safe_return_path(Some("/?min_rating=4")), "/?min_rating=4");
    }

    #[test]
    fn offsite_and_missing_return_paths_fall_back() {
        assert_eq!(safe_return_path(None), "/");
        assert_eq!(safe_return_path(Some("https://evil.example")), "/");
        assert_eq!(safe_return_path(Some("//evil.example")), "/");
        assert_eq!(safe_return_path(Some("/\\evil.example")), "/");
        assert_eq!(safe_return_path(Some("relative/path")), "/");
    }

    #[test]
    fn successful_delete_drops_the_card() {
        assert_eq!(removal_outcome(&Ok(())), RemoveOutcome::Removed);
    }

    #[test]
    fn failed_delete_keeps_the_card_with_a_message() {
        let blank = ShopError::Api {
            status: 500,
            message: String::new(),
        };
        assert_eq!(
            removal_outcome(&Err(blank)),
            RemoveOutcome::Kept("Could not remove from wishlist".to_string())
        );

        let explained = ShopError::Api {
            status: 404,
            message: "Product not in wishlist".to_string(),
        };
        assert_eq!(
            removal_outcome(&Err(explained)),
            RemoveOutcome::Kept("Product not in wishlist".to_string())
        );
    }

    #[test]
    fn flash_appends_with_the_right_separator() {
        assert_eq!(
            with_flash("/", "success", "Added to wishlist"),
            "/?success=Added%20to%20wishlist"
        );
        assert_eq!(
            with_flash("/?min_rating=4", "error", "nope"),
            "/?min_rating=4&error=nope"
        );
    }
}
