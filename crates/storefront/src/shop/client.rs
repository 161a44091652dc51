//! HTTP client for the shop API.

use std::sync::Arc;

use reqwest::{Method, Response};
use url::Url;

use wishmark_core::{ProductId, Rating, ReviewId};

use super::types::{AuthSession, Product, ReviewPayload};
use super::ShopError;

/// Client for the shop REST API.
///
/// Cheap to clone; the underlying connection pool is shared. Operations
/// that act on behalf of a visitor take the visitor's bearer token and
/// attach it as `Authorization: Bearer <token>` - that attachment happens
/// in exactly one place ([`ShopClient::request`]), so no call path can
/// forget it.
#[derive(Clone)]
pub struct ShopClient {
    inner: Arc<ShopClientInner>,
}

struct ShopClientInner {
    client: reqwest::Client,
    /// Base URL with any trailing slash trimmed.
    base_url: String,
}

impl ShopClient {
    /// Create a new shop API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: &Url) -> Result<Self, ShopError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(ShopClientInner {
                client,
                base_url: base_url.as_str().trim_end_matches('/').to_owned(),
            }),
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, bad credentials (the backend
    /// answers 400/401 with a message), or an unparseable response.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ShopError> {
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self
            .request(Method::POST, "/auth/login", None)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ShopError::Parse(e.to_string()))
    }

    /// Register a new account.
    ///
    /// The backend logs the account in as part of registration and returns
    /// the same session payload as `login`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a rejected registration, or
    /// an unparseable response.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ShopError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });

        let response = self
            .request(Method::POST, "/auth/register", None)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ShopError::Parse(e.to_string()))
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products, optionally keeping only those at or above a minimum
    /// average rating.
    ///
    /// `None` omits the filter parameter entirely; the backend treats
    /// absence as "all products".
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// unparseable response.
    pub async fn list_products(
        &self,
        token: Option<&str>,
        min_rating: Option<Rating>,
    ) -> Result<Vec<Product>, ShopError> {
        let path = products_path(min_rating);

        let response = self.request(Method::GET, &path, token).send().await?;
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ShopError::Parse(e.to_string()))
    }

    /// Fetch a single product with its embedded reviews.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status (404 for
    /// unknown ids, see [`ShopError::is_not_found`]), or an unparseable
    /// response.
    pub async fn get_product(
        &self,
        token: Option<&str>,
        product_id: &ProductId,
    ) -> Result<Product, ShopError> {
        let path = format!("/products/{}", urlencoding::encode(product_id.as_str()));

        let response = self.request(Method::GET, &path, token).send().await?;
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ShopError::Parse(e.to_string()))
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Create a review for a product.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status. The
    /// response body is discarded; callers re-fetch the product instead.
    pub async fn add_review(
        &self,
        token: &str,
        product_id: &ProductId,
        review: &ReviewPayload,
    ) -> Result<(), ShopError> {
        let path = format!("/products/{}/reviews", urlencoding::encode(product_id.as_str()));

        let response = self
            .request(Method::POST, &path, Some(token))
            .json(review)
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }

    /// Replace the caller's review of a product.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status; the
    /// backend answers 403 when the review belongs to someone else.
    pub async fn update_review(
        &self,
        token: &str,
        product_id: &ProductId,
        review_id: &ReviewId,
        review: &ReviewPayload,
    ) -> Result<(), ShopError> {
        let path = format!(
            "/products/{}/reviews/{}",
            urlencoding::encode(product_id.as_str()),
            urlencoding::encode(review_id.as_str())
        );

        let response = self
            .request(Method::PUT, &path, Some(token))
            .json(review)
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }

    /// Delete the caller's review of a product.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status; the
    /// backend answers 403 when the review belongs to someone else.
    pub async fn delete_review(
        &self,
        token: &str,
        product_id: &ProductId,
        review_id: &ReviewId,
    ) -> Result<(), ShopError> {
        let path = format!(
            "/products/{}/reviews/{}",
            urlencoding::encode(product_id.as_str()),
            urlencoding::encode(review_id.as_str())
        );

        let response = self
            .request(Method::DELETE, &path, Some(token))
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Fetch the caller's full wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or an
    /// unparseable response.
    pub async fn get_wishlist(&self, token: &str) -> Result<Vec<Product>, ShopError> {
        let response = self
            .request(Method::GET, "/wishlist", Some(token))
            .send()
            .await?;
        let response = check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ShopError::Parse(e.to_string()))
    }

    /// Add a product to the caller's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn add_to_wishlist(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> Result<(), ShopError> {
        let path = format!("/wishlist/{}", urlencoding::encode(product_id.as_str()));

        let response = self
            .request(Method::POST, &path, Some(token))
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }

    /// Remove a product from the caller's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn remove_from_wishlist(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> Result<(), ShopError> {
        let path = format!("/wishlist/{}", urlencoding::encode(product_id.as_str()));

        let response = self
            .request(Method::DELETE, &path, Some(token))
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Start a request against the API, attaching the bearer token when one
    /// is present.
    fn request(&self, method: Method, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.inner.base_url);
        let mut builder = self.inner.client.request(method, url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

/// Path for the product listing, with the optional minimum-rating filter.
fn products_path(min_rating: Option<Rating>) -> String {
    min_rating.map_or_else(
        || "/products".to_string(),
        |rating| format!("/products?minRating={rating}"),
    )
}

/// Pass successful responses through, turning everything else into
/// [`ShopError::Api`] with the backend's `message` field when the body
/// carries one.
async fn check_status(response: Response) -> Result<Response, ShopError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ShopError::Api {
        status: status.as_u16(),
        message: extract_api_message(&body).unwrap_or_default(),
    })
}

/// Extract the backend's error message from a response body.
///
/// The API reports failures as `{ "message": "..." }`; anything else (HTML
/// error pages, empty bodies) yields `None` so callers fall back to their
/// own wording.
fn extract_api_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value.get("message")?.as_str()?;
    if message.is_empty() {
        None
    } else {
        Some(message.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn products_path_omits_absent_filter() {
        assert_eq!(products_path(None), "/products");
    }

    #[test]
    fn products_path_carries_the_filter() {
        let rating = Rating::new(4).unwrap();
        assert_eq!(products_path(Some(rating)), "/products?minRating=4");
    }

    #[test]
    fn extract_api_message_reads_the_message_field() {
        let body = r#"{"message":"You can only modify your own review"}"#;
        assert_eq!(
            extract_api_message(body).as_deref(),
            Some("You can only modify your own review")
        );
    }

    #[test]
    fn extract_api_message_ignores_other_shapes() {
        assert_eq!(extract_api_message(""), None);
        assert_eq!(extract_api_message("<html>502 Bad Gateway</html>"), None);
        assert_eq!(extract_api_message(r#"{"error":"nope"}"#), None);
        assert_eq!(extract_api_message(r#"{"message":""}"#), None);
        assert_eq!(extract_api_message(r#"{"message":42}"#), None);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let url = Url::parse("http://localhost:5000/api/").unwrap();
        let client = ShopClient::new(&url).unwrap();
        assert_eq!(client.inner.base_url, "http://localhost:5000/api");
    }

    #[test]
    fn ids_are_percent_encoded_into_paths() {
        let encoded = urlencoding::encode("odd/id?");
        assert_eq!(format!("/products/{encoded}"), "/products/odd%2Fid%3F");
    }
}
