//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product catalog (optional min_rating filter)
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (shop API reachable)
//!
//! # Products & reviews
//! GET  /products/{id}                               - Product detail with reviews
//! POST /products/{id}/reviews                       - Create own review
//! POST /products/{id}/reviews/{review_id}/edit      - Update own review
//! POST /products/{id}/reviews/{review_id}/delete    - Delete own review
//!
//! # Wishlist
//! GET  /wishlist                       - Wishlist page (requires auth)
//! POST /wishlist/{product_id}          - Add to wishlist, redirect back
//! POST /hx/wishlist/{product_id}/remove - Remove (HTMX fragment)
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /register               - Register page
//! POST /register               - Register action
//! POST /logout                 - Logout action
//! ```

pub mod auth;
pub mod home;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", post(products::create_review))
        .route(
            "/{id}/reviews/{review_id}/edit",
            post(products::update_review),
        )
        .route(
            "/{id}/reviews/{review_id}/delete",
            post(products::delete_review),
        )
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/{product_id}", post(wishlist::add))
}

/// Create the HTMX fragment routes router.
///
/// Fragment routes live under `/hx/` so the auth extractor can answer 401
/// instead of redirecting a fragment swap to the login page.
pub fn hx_routes() -> Router<AppState> {
    Router::new().route("/wishlist/{product_id}/remove", post(wishlist::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/", get(home::index))
        // Product detail and review flow
        .nest("/products", product_routes())
        // Wishlist
        .nest("/wishlist", wishlist_routes())
        // HTMX fragments
        .nest("/hx", hx_routes())
        // Auth pages live at the top level (/login, /register, /logout)
        .merge(auth_routes())
}
