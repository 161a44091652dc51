//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::shop::{ShopClient, ShopError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources: the configuration and the shop API client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    shop: ShopClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the shop API client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, ShopError> {
        let shop = ShopClient::new(&config.shop_api_url)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, shop }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the shop API client.
    #[must_use]
    pub fn shop(&self) -> &ShopClient {
        &self.inner.shop
    }
}
