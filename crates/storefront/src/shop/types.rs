//! Wire types for the shop API.
//!
//! Field names follow the backend's JSON (`_id`, `averageRating`,
//! `createdAt`); the structs expose them under Rust names. Everything here
//! is a read-only snapshot: the storefront never mutates these values
//! locally, it re-fetches after each write.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wishmark_core::{ProductId, Rating, ReviewId, UserId};

/// Session payload returned by `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    /// Display name of the account.
    pub name: String,
    /// Opaque bearer token for subsequent calls.
    pub token: String,
}

/// A product snapshot, with embedded reviews on the detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Price in dollars; some products are unpriced.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(rename = "averageRating", default)]
    pub average_rating: f64,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// Find the review authored by the given user, if any.
    ///
    /// A linear scan over the freshly fetched snapshot; the backend does not
    /// mark ownership, so every page recomputes this after each fetch.
    #[must_use]
    pub fn review_by(&self, user_id: &UserId) -> Option<&Review> {
        self.reviews.iter().find(|review| &review.user.id == user_id)
    }
}

/// A single product review.
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    pub user: Reviewer,
    pub rating: Rating,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The author embedded in a review.
#[derive(Debug, Clone, Deserialize)]
pub struct Reviewer {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Body for review create and update calls.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewPayload {
    pub rating: Rating,
    pub comment: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn review(id: &str, user_id: &str) -> Review {
        Review {
            id: ReviewId::new(id),
            user: Reviewer {
                id: UserId::new(user_id),
                name: Some("Someone".to_string()),
            },
            rating: Rating::new(4).unwrap(),
            comment: None,
            created_at: None,
        }
    }

    #[test]
    fn deserializes_backend_field_names() {
        let json = serde_json::json!({
            "_id": "p1",
            "name": "Walnut desk",
            "description": "Solid walnut, cable tray included",
            "price": 499.99,
            "averageRating": 4.5,
            "reviews": [{
                "_id": "r1",
                "user": { "_id": "u1", "name": "Dana" },
                "rating": 5,
                "comment": "Sturdy and beautiful",
                "createdAt": "2026-03-14T09:30:00.000Z"
            }]
        });

        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.id, ProductId::new("p1"));
        assert_eq!(product.name, "Walnut desk");
        assert_eq!(product.price, Some(Decimal::new(49999, 2)));
        assert!((product.average_rating - 4.5).abs() < f64::EPSILON);

        let review = product.reviews.first().unwrap();
        assert_eq!(review.user.id, UserId::new("u1"));
        assert_eq!(review.rating.as_u8(), 5);
        assert!(review.created_at.is_some());
    }

    #[test]
    fn tolerates_sparse_snapshots() {
        // Listing and wishlist endpoints omit reviews and sometimes price.
        let json = serde_json::json!({
            "_id": "p2",
            "name": "Mystery box",
            "averageRating": 0.0
        });

        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.price, None);
        assert!(product.description.is_empty());
        assert!(product.reviews.is_empty());
    }

    #[test]
    fn review_by_finds_exactly_the_owner() {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Desk".to_string(),
            description: String::new(),
            price: None,
            average_rating: 0.0,
            reviews: vec![review("r1", "u1"), review("r2", "u2")],
        };

        let mine = product.review_by(&UserId::new("u2")).unwrap();
        assert_eq!(mine.id, ReviewId::new("r2"));
        assert!(product.review_by(&UserId::new("u3")).is_none());
    }

    #[test]
    fn review_by_on_empty_reviews_is_none() {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Desk".to_string(),
            description: String::new(),
            price: None,
            average_rating: 0.0,
            reviews: Vec::new(),
        };
        assert!(product.review_by(&UserId::new("u1")).is_none());
    }

    #[test]
    fn review_payload_serializes_flat() {
        let payload = ReviewPayload {
            rating: Rating::new(3).unwrap(),
            comment: "Fine".to_string(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "rating": 3, "comment": "Fine" }));
    }

    #[test]
    fn auth_session_parses_login_response() {
        let json = serde_json::json!({ "name": "Dana", "token": "a.b.c" });
        let session: AuthSession = serde_json::from_value(json).unwrap();
        assert_eq!(session.name, "Dana");
        assert_eq!(session.token, "a.b.c");
    }
}
