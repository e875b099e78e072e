//! Wishlist items.

use serde::{Deserialize, Serialize};

use inktrix_core::{ProductId, ProductSnapshot};

/// A saved-for-later product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    #[serde(flatten)]
    pub product: ProductSnapshot,
}

impl WishlistItem {
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.product_id
    }
}

/// Ordered set of wishlist items keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishlistState {
    items: Vec<WishlistItem>,
}

impl WishlistState {
    /// Build a wishlist from restored records, keeping the first of any
    /// duplicate ids.
    #[must_use]
    pub fn from_records(records: Vec<WishlistItem>) -> Self {
        let mut wishlist = Self::default();
        for record in records {
            if !wishlist.contains(record.product_id()) {
                wishlist.items.push(record);
            }
        }
        wishlist
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|i| i.product_id() == product_id)
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&WishlistItem> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    /// Remove `product` if present, otherwise append it.
    /// Returns the new membership.
    pub(crate) fn toggle(&mut self, product: &ProductSnapshot) -> bool {
        if self.remove(product.product_id) {
            false
        } else {
            self.items.push(WishlistItem {
                product: product.clone(),
            });
            true
        }
    }

    pub(crate) fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id() != product_id);
        self.items.len() != before
    }

    pub(crate) fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use inktrix_core::Price;

    use super::*;

    fn product(id: i64) -> ProductSnapshot {
        ProductSnapshot::new(ProductId::new(id), Price::from_cents(100))
    }

    #[test]
    fn test_toggle_pairs_restore_membership() {
        let mut wishlist = WishlistState::default();
        assert!(wishlist.toggle(&product(7)));
        assert!(wishlist.contains(ProductId::new(7)));
        assert!(!wishlist.toggle(&product(7)));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_from_records_dedups() {
        let records = vec![
            WishlistItem {
                product: product(1).with_name("first"),
            },
            WishlistItem {
                product: product(2),
            },
            WishlistItem {
                product: product(1).with_name("second"),
            },
        ];
        let wishlist = WishlistState::from_records(records);

        assert_eq!(wishlist.len(), 2);
        assert_eq!(wishlist.get(ProductId::new(1)).unwrap().product.name, "first");
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut wishlist = WishlistState::default();
        assert!(!wishlist.remove(ProductId::new(3)));
        assert!(!wishlist.clear());
    }
}
