//! Product detail and review flow route handlers.
//!
//! The detail page fetches a fresh product snapshot, scans its reviews for
//! one owned by the current visitor, and renders controls accordingly. The
//! ownership check runs twice on purpose: once to decide what to render,
//! and again inside each mutating handler against a freshly fetched
//! snapshot, because the visitor's id comes from an unverified token and
//! the backend is the real enforcer.
//!
//! Every successful mutation redirects back to the detail page, which
//! re-fetches the product; nothing is patched locally.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use wishmark_core::{ProductId, Rating, ReviewId, UserId};

use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::shop::{Product, Review, ReviewPayload, ShopError};
use crate::state::AppState;

// =============================================================================
// Query and Form Types
// =============================================================================

/// Detail page query parameters.
#[derive(Debug, Deserialize)]
pub struct ShowQuery {
    /// Review id whose edit form should be open (must be the visitor's own).
    pub edit: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Review create/edit form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: u8,
    pub comment: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub current_user: Option<CurrentUser>,
    pub product: Product,
    /// The visitor's own review, per the decoded ownership hint; drives
    /// which controls render. UI affordance only.
    pub my_review: Option<Review>,
    /// Review whose edit form is open (always the visitor's own).
    pub editing: Option<Review>,
    /// Star preselected in the review form (the edited review's rating, or 5).
    pub form_rating: u8,
    /// Comment prefilled into the review form.
    pub form_comment: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub current_user: Option<CurrentUser>,
}

// =============================================================================
// Ownership and Failure Policy
// =============================================================================

/// Whether the ownership hint permits modifying the given review.
///
/// `None` (no session, or an undecodable token) never permits anything.
fn ownership_allows(review: &Review, viewer: Option<&UserId>) -> bool {
    viewer.is_some_and(|viewer| &review.user.id == viewer)
}

/// User-facing message for a failed review create/update.
fn submit_failure_message(e: &ShopError) -> String {
    if e.is_forbidden() {
        "You can only modify your own review".to_string()
    } else {
        e.api_message()
            .map_or_else(|| "Could not submit review".to_string(), ToOwned::to_owned)
    }
}

/// User-facing message for a failed review delete.
fn delete_failure_message(e: &ShopError) -> String {
    if e.is_forbidden() {
        "You can only delete your own review".to_string()
    } else {
        e.api_message()
            .map_or_else(|| "Could not delete review".to_string(), ToOwned::to_owned)
    }
}

/// Path of a product's detail page.
fn product_path(id: &ProductId) -> String {
    format!("/products/{}", urlencoding::encode(id.as_str()))
}

/// Redirect to the detail page with a flash message in the query string.
fn redirect_with_flash(id: &ProductId, key: &str, message: &str) -> Response {
    let target = format!(
        "{}?{key}={}",
        product_path(id),
        urlencoding::encode(message)
    );
    Redirect::to(&target).into_response()
}

// =============================================================================
// Detail Page
// =============================================================================

/// Display the product detail page with its reviews.
///
/// A backend 404 renders the not-found page; other backend failures bubble
/// up as [`AppError`].
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
    Query(query): Query<ShowQuery>,
) -> Result<Response, AppError> {
    let token = user.as_ref().map(|u| u.token.clone());

    let product = match state.shop().get_product(token.as_deref(), &id).await {
        Ok(product) => product,
        Err(e) if e.is_not_found() => {
            return Ok((
                StatusCode::NOT_FOUND,
                ProductNotFoundTemplate { current_user: user },
            )
                .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let viewer_id = user.as_ref().and_then(CurrentUser::user_id);
    let my_review = viewer_id
        .as_ref()
        .and_then(|viewer| product.review_by(viewer))
        .cloned();

    // The edit form only ever opens on the visitor's own review.
    let editing = query.edit.as_deref().and_then(|raw| {
        let wanted = ReviewId::new(raw);
        my_review.iter().find(|mine| mine.id == wanted).cloned()
    });

    let form_rating = editing.as_ref().map_or(Rating::MAX, |r| r.rating.as_u8());
    let form_comment = editing
        .as_ref()
        .and_then(|r| r.comment.clone())
        .unwrap_or_default();

    Ok(ProductShowTemplate {
        current_user: user,
        product,
        my_review,
        editing,
        form_rating,
        form_comment,
        error: query.error,
        success: query.success,
    }
    .into_response())
}

// =============================================================================
// Review Mutations
// =============================================================================

/// Create a review for a product.
///
/// Server-side gates mirror the rendered controls: the visitor must be
/// authenticated (extractor) and must not already own a review on this
/// product (checked against a fresh fetch).
#[instrument(skip(state, user, form))]
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<ReviewForm>,
) -> Response {
    let Ok(rating) = Rating::new(form.rating) else {
        return redirect_with_flash(&id, "error", "Rating must be between 1 and 5 stars");
    };

    // Single-review-per-user gate, re-checked against a fresh snapshot.
    match state.shop().get_product(Some(&user.token), &id).await {
        Ok(product) => {
            let viewer_id = user.user_id();
            if viewer_id
                .as_ref()
                .and_then(|viewer| product.review_by(viewer))
                .is_some()
            {
                return redirect_with_flash(
                    &id,
                    "error",
                    "You have already reviewed this product",
                );
            }
        }
        Err(e) => {
            tracing::warn!("Pre-submit product fetch failed: {e}");
            return redirect_with_flash(&id, "error", "Could not submit review");
        }
    }

    let payload = ReviewPayload {
        rating,
        comment: form.comment.unwrap_or_default().trim().to_string(),
    };

    match state.shop().add_review(&user.token, &id, &payload).await {
        Ok(()) => redirect_with_flash(&id, "success", "Review submitted"),
        Err(e) => {
            tracing::warn!("Review create failed: {e}");
            redirect_with_flash(&id, "error", &submit_failure_message(&e))
        }
    }
}

/// Update the visitor's own review.
#[instrument(skip(state, user, form))]
pub async fn update_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((id, review_id)): Path<(ProductId, ReviewId)>,
    Form(form): Form<ReviewForm>,
) -> Response {
    let Ok(rating) = Rating::new(form.rating) else {
        return redirect_with_flash(&id, "error", "Rating must be between 1 and 5 stars");
    };

    // Ownership re-check against a fresh snapshot before the backend call.
    match owned_review(&state, &user, &id, &review_id).await {
        Ok(()) => {}
        Err(response) => return *response,
    }

    let payload = ReviewPayload {
        rating,
        comment: form.comment.unwrap_or_default().trim().to_string(),
    };

    match state
        .shop()
        .update_review(&user.token, &id, &review_id, &payload)
        .await
    {
        Ok(()) => redirect_with_flash(&id, "success", "Review updated"),
        Err(e) => {
            tracing::warn!("Review update failed: {e}");
            redirect_with_flash(&id, "error", &submit_failure_message(&e))
        }
    }
}

/// Delete the visitor's own review.
///
/// The browser asks for confirmation before this form submits; the handler
/// itself only sees confirmed requests.
#[instrument(skip(state, user))]
pub async fn delete_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((id, review_id)): Path<(ProductId, ReviewId)>,
) -> Response {
    match owned_review(&state, &user, &id, &review_id).await {
        Ok(()) => {}
        Err(response) => return *response,
    }

    match state
        .shop()
        .delete_review(&user.token, &id, &review_id)
        .await
    {
        Ok(()) => redirect_with_flash(&id, "success", "Review deleted"),
        Err(e) => {
            tracing::warn!("Review delete failed: {e}");
            redirect_with_flash(&id, "error", &delete_failure_message(&e))
        }
    }
}

/// Fetch the product and verify the target review exists and the ownership
/// hint says it belongs to the caller.
///
/// Returns the rejection response on failure so the mutating handlers can
/// bail with `return *response`.
async fn owned_review(
    state: &AppState,
    user: &CurrentUser,
    id: &ProductId,
    review_id: &ReviewId,
) -> Result<(), Box<Response>> {
    let product = match state.shop().get_product(Some(&user.token), id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!("Pre-mutation product fetch failed: {e}");
            return Err(Box::new(redirect_with_flash(
                id,
                "error",
                "Could not load the product",
            )));
        }
    };

    let Some(review) = product.reviews.iter().find(|r| &r.id == review_id) else {
        return Err(Box::new(redirect_with_flash(
            id,
            "error",
            "Review not found",
        )));
    };

    let viewer_id = user.user_id();
    if ownership_allows(review, viewer_id.as_ref()) {
        Ok(())
    } else {
        Err(Box::new(redirect_with_flash(
            id,
            "error",
            "You can only modify your own review",
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shop::Reviewer;

    fn review(id: &str, owner: &str) -> Review {
        Review {
            id: ReviewId::new(id),
            user: Reviewer {
                id: UserId::new(owner),
                name: Some("Someone".to_string()),
            },
            rating: Rating::new(4).unwrap(),
            comment: None,
            created_at: None,
        }
    }

    #[test]
    fn ownership_requires_a_matching_hint() {
        let theirs = review("r1", "u1");
        let mine = UserId::new("u1");
        let other = UserId::new("u2");

        assert!(ownership_allows(&theirs, Some(&mine)));
        assert!(!ownership_allows(&theirs, Some(&other)));
    }

    #[test]
    fn missing_hint_never_allows_modification() {
        let theirs = review("r1", "u1");
        assert!(!ownership_allows(&theirs, None));
    }

    #[test]
    fn forbidden_maps_to_the_authorization_flash() {
        let forbidden = ShopError::Api {
            status: 403,
            message: "nope".to_string(),
        };
        assert_eq!(
            submit_failure_message(&forbidden),
            "You can only modify your own review"
        );
        assert_eq!(
            delete_failure_message(&forbidden),
            "You can only delete your own review"
        );
    }

    #[test]
    fn other_failures_prefer_the_backend_message() {
        let with_message = ShopError::Api {
            status: 400,
            message: "Rating is required".to_string(),
        };
        assert_eq!(submit_failure_message(&with_message), "Rating is required");

        let silent = ShopError::Api {
            status: 502,
            message: String::new(),
        };
        assert_eq!(submit_failure_message(&silent), "Could not submit review");
        assert_eq!(delete_failure_message(&silent), "Could not delete review");

        let parse = ShopError::Parse("bad json".to_string());
        assert_eq!(submit_failure_message(&parse), "Could not submit review");
    }

    #[test]
    fn product_paths_encode_their_ids() {
        assert_eq!(
            product_path(&ProductId::new("64f1c0ffee")),
            "/products/64f1c0ffee"
        );
        assert_eq!(product_path(&ProductId::new("a/b")), "/products/a%2Fb");
    }
}
