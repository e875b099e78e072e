//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::store::{ShippingPolicy, SharedStore, StateManager};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// cart and wishlist owner, the catalog client and configuration.
///
/// There is one [`SharedStore`] per process, so every client of the server
/// sees the same cart and wishlist. The server is a local companion for a
/// single shopper (it binds to `127.0.0.1` by default) and must not be
/// exposed as a multi-user service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: SharedStore,
    catalog: CatalogClient,
}

impl AppState {
    /// Create a new application state around an already loaded manager.
    #[must_use]
    pub fn new(config: StorefrontConfig, manager: StateManager) -> Self {
        let catalog = CatalogClient::new(&config.catalog);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store: SharedStore::new(manager),
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the shared cart and wishlist.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Shipping policy for order summaries.
    #[must_use]
    pub fn shipping(&self) -> &ShippingPolicy {
        &self.inner.config.shipping
    }
}
