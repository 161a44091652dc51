//! Product catalog route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use wishmark_core::Rating;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::shop::Product;
use crate::state::AppState;

/// Catalog query parameters.
///
/// The filter form submits `min_rating=0` for "All Ratings"; zero and
/// absent both mean unfiltered.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub min_rating: Option<u8>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Map the submitted filter value to the typed request field.
///
/// `0`/absent means "all products" and omits the backend parameter; values
/// outside 1-5 (hand-edited URLs) are treated the same way rather than
/// erroring the page.
fn parse_min_rating(raw: Option<u8>) -> Option<Rating> {
    raw.and_then(|value| Rating::new(value).ok())
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
    pub products: Vec<Product>,
    /// Selected filter value for the form (0 = all).
    pub min_rating: u8,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the product catalog.
///
/// A fetch failure renders the empty state and is logged at WARN (so it
/// reaches Sentry), not shown to the visitor.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let min_rating = parse_min_rating(query.min_rating);
    let token = user.as_ref().map(|u| u.token.clone());

    let products = state
        .shop()
        .list_products(token.as_deref(), min_rating)
        .await
        .map_or_else(
            |e| {
                tracing::warn!("Failed to fetch product catalog: {e}");
                Vec::new()
            },
            |products| products,
        );

    HomeTemplate {
        current_user: user,
        products,
        min_rating: min_rating.map_or(0, Rating::as_u8),
        error: query.error,
        success: query.success,
    }
}
