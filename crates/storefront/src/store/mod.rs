//! Cart and wishlist state manager.
//!
//! [`StateManager`] is the single owner of the shopper's cart and wishlist.
//! Views read through its query methods and change state only through its
//! mutation methods. Every mutation:
//!
//! 1. updates the in-memory collection (so the next read sees it),
//! 2. writes the whole collection to the [`KeyValueStore`] (clearing a
//!    collection deletes its key instead),
//! 3. notifies subscribers synchronously.
//!
//! Storage failures never reach the caller. A failed write is logged and
//! the in-memory state stays authoritative for the session; unreadable
//! state at startup restores as an empty collection.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use inktrix_core::{Price, ProductId, ProductSnapshot};
//! use inktrix_storefront::persist::MemoryStore;
//! use inktrix_storefront::store::StateManager;
//!
//! let mut store = StateManager::load(Arc::new(MemoryStore::new()));
//! let toner = ProductSnapshot::new(ProductId::new(1), Price::from_cents(1_000));
//!
//! store.add_to_cart(&toner, 1);
//! store.add_to_cart(&toner, 2);
//! assert_eq!(store.cart().items().len(), 1);
//! assert_eq!(store.cart_total(), Price::from_cents(3_000));
//! ```

mod cart;
mod notify;
mod wishlist;

pub use cart::{CartLineItem, CartState, OrderSummary, ShippingPolicy};
pub use notify::{StoreEvent, SubscriptionId, Subscribers};
pub use wishlist::{WishlistItem, WishlistState};

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use inktrix_core::{CatalogProduct, Price, ProductId, ProductSnapshot, Quantity, ValidationError};

use crate::persist::{KeyValueStore, MemoryStore, keys};

// =============================================================================
// StateManager
// =============================================================================

/// Owner of the cart and wishlist.
pub struct StateManager {
    cart: CartState,
    wishlist: WishlistState,
    storage: Arc<dyn KeyValueStore>,
    subscribers: Subscribers<StateManager>,
}

impl StateManager {
    /// Restore state from `storage`.
    ///
    /// Missing, unreadable or undecodable collections start empty.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let cart = CartState::from_records(restore(storage.as_ref(), keys::CART));
        let wishlist = WishlistState::from_records(restore(storage.as_ref(), keys::WISHLIST));

        debug!(
            cart_lines = cart.len(),
            wishlist_items = wishlist.len(),
            "Restored shopper state"
        );

        Self {
            cart,
            wishlist,
            storage,
            subscribers: Subscribers::default(),
        }
    }

    /// A manager whose state lasts only for this process.
    #[must_use]
    pub fn session_only() -> Self {
        Self::load(Arc::new(MemoryStore::new()))
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    /// Current wishlist contents.
    #[must_use]
    pub const fn wishlist(&self) -> &WishlistState {
        &self.wishlist
    }

    /// Sum of `price * quantity` over the cart; zero when empty.
    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.cart.total()
    }

    /// Total number of units in the cart.
    #[must_use]
    pub fn cart_item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Subtotal, shipping and total for the cart.
    #[must_use]
    pub fn order_summary(&self, policy: &ShippingPolicy) -> OrderSummary {
        OrderSummary::new(&self.cart, policy)
    }

    #[must_use]
    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        self.wishlist.contains(product_id)
    }

    // -------------------------------------------------------------------------
    // Cart mutations
    // -------------------------------------------------------------------------

    /// Add `quantity` units of `product`; quantities below 1 count as 1.
    pub fn add_to_cart(&mut self, product: &ProductSnapshot, quantity: i64) {
        let quantity = Quantity::clamped(quantity);
        self.cart.add(product, quantity);
        debug!(product_id = %product.product_id, %quantity, "Added to cart");
        self.commit(StoreEvent::CartChanged);
    }

    /// Validate a catalog record, then add it to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] without touching state when the record has
    /// no id or no usable price.
    pub fn add_catalog_product(
        &mut self,
        product: CatalogProduct,
        quantity: i64,
    ) -> Result<(), ValidationError> {
        let snapshot = ProductSnapshot::try_from(product)?;
        self.add_to_cart(&snapshot, quantity);
        Ok(())
    }

    /// Remove a product's line. Absent ids are a silent no-op.
    pub fn remove_from_cart(&mut self, product_id: ProductId) {
        if self.cart.remove(product_id) {
            debug!(%product_id, "Removed from cart");
            self.commit(StoreEvent::CartChanged);
        }
    }

    /// Set a line's quantity, flooring at 1.
    ///
    /// Never removes the line; unknown ids are a no-op.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        let quantity = Quantity::clamped(quantity);
        if self.cart.set_quantity(product_id, quantity) {
            debug!(%product_id, %quantity, "Updated cart quantity");
            self.commit(StoreEvent::CartChanged);
        }
    }

    /// Empty the cart and delete its stored entry.
    pub fn clear_cart(&mut self) {
        if self.cart.clear() {
            debug!("Cleared cart");
            self.commit_cleared(StoreEvent::CartChanged);
        }
    }

    // -------------------------------------------------------------------------
    // Wishlist mutations
    // -------------------------------------------------------------------------

    /// Add `product` to the wishlist if absent, remove it if present.
    ///
    /// Returns whether the product is in the wishlist afterwards.
    pub fn toggle_wishlist(&mut self, product: &ProductSnapshot) -> bool {
        let saved = self.wishlist.toggle(product);
        debug!(product_id = %product.product_id, saved, "Toggled wishlist");
        self.commit(StoreEvent::WishlistChanged);
        saved
    }

    /// Validate a catalog record, then toggle it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] without touching state when the record is
    /// not a valid product.
    pub fn toggle_catalog_product(
        &mut self,
        product: CatalogProduct,
    ) -> Result<bool, ValidationError> {
        let snapshot = ProductSnapshot::try_from(product)?;
        Ok(self.toggle_wishlist(&snapshot))
    }

    /// Remove a product from the wishlist. Absent ids are a silent no-op.
    pub fn remove_from_wishlist(&mut self, product_id: ProductId) {
        if self.wishlist.remove(product_id) {
            debug!(%product_id, "Removed from wishlist");
            self.commit(StoreEvent::WishlistChanged);
        }
    }

    /// Move a wishlist item into the cart with quantity 1.
    ///
    /// Returns `false` (and changes nothing) when the product is not in the
    /// wishlist.
    pub fn move_to_cart(&mut self, product_id: ProductId) -> bool {
        let Some(item) = self.wishlist.get(product_id).cloned() else {
            return false;
        };
        self.cart.add(&item.product, Quantity::ONE);
        self.wishlist.remove(product_id);
        debug!(%product_id, "Moved wishlist item to cart");
        self.commit(StoreEvent::CartChanged);
        self.commit(StoreEvent::WishlistChanged);
        true
    }

    /// Empty the wishlist and delete its stored entry.
    pub fn clear_wishlist(&mut self) {
        if self.wishlist.clear() {
            debug!("Cleared wishlist");
            self.commit_cleared(StoreEvent::WishlistChanged);
        }
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Observe every committed mutation.
    ///
    /// The callback runs synchronously inside the mutating call, after the
    /// change is visible and the write has been attempted. It must not call
    /// back into the manager's owner (e.g. re-lock a [`SharedStore`]).
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(StoreEvent, &Self) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Stop observing. Returns whether `id` was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    fn commit(&self, event: StoreEvent) {
        match event {
            StoreEvent::CartChanged => self.persist(keys::CART, self.cart.items()),
            StoreEvent::WishlistChanged => self.persist(keys::WISHLIST, self.wishlist.items()),
        }
        self.subscribers.notify(event, self);
    }

    /// Like [`Self::commit`] for a collection that is now empty: the key is
    /// removed instead of holding `[]`.
    fn commit_cleared(&self, event: StoreEvent) {
        let key = match event {
            StoreEvent::CartChanged => keys::CART,
            StoreEvent::WishlistChanged => keys::WISHLIST,
        };
        if let Err(e) = self.storage.remove(key) {
            warn!(key, error = %e, "Failed to delete persisted state; keeping in-memory copy");
        }
        self.subscribers.notify(event, self);
    }

    fn persist<T: Serialize>(&self, key: &str, records: &[T]) {
        let result = serde_json::to_string(records)
            .map_err(crate::persist::PersistError::from)
            .and_then(|json| self.storage.set(key, &json));

        if let Err(e) = result {
            warn!(key, error = %e, "Failed to persist state; keeping in-memory copy");
        }
    }
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("cart", &self.cart)
            .field("wishlist", &self.wishlist)
            .field("subscribers", &self.subscribers)
            .finish_non_exhaustive()
    }
}

/// Read and decode the records stored under `key`.
///
/// A top-level value that is not a JSON array counts as absent. Individual
/// records that fail to decode are dropped so one bad entry does not cost the
/// shopper the whole collection.
fn restore<T: DeserializeOwned>(storage: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "Failed to read persisted state; starting empty");
            return Vec::new();
        }
    };

    let values = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Array(values)) => values,
        Ok(_) => {
            warn!(key, "Persisted state is not a list; starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(key, error = %e, "Persisted state is corrupt; starting empty");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key, index, error = %e, "Dropping unreadable persisted record");
                None
            }
        })
        .collect()
}

// =============================================================================
// SharedStore
// =============================================================================

/// A [`StateManager`] shared between views.
///
/// Cheaply cloneable. Each call holds the lock only for the duration of the
/// closure; mutations never suspend, so a plain mutex suffices.
#[derive(Clone, Debug)]
pub struct SharedStore {
    inner: Arc<Mutex<StateManager>>,
}

impl SharedStore {
    #[must_use]
    pub fn new(manager: StateManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Run a query against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&StateManager) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run a mutation; subscribers fire before this returns.
    pub fn update<R>(&self, f: impl FnOnce(&mut StateManager) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
