//! Cart line items and totals.

use serde::{Deserialize, Serialize};

use inktrix_core::{Price, ProductId, ProductSnapshot, Quantity};

/// One distinct product in the cart and how many of it.
///
/// Serializes as the flat persisted record: the snapshot fields plus
/// `quantity`. A record without `quantity` restores with quantity 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: ProductSnapshot,
    #[serde(default)]
    pub quantity: Quantity,
}

impl CartLineItem {
    /// The product id of this line.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.product_id
    }

    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Ordered cart contents, one line per product id, in first-added order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    items: Vec<CartLineItem>,
}

impl CartState {
    /// Build a cart from restored records.
    ///
    /// Duplicate ids are merged into the first occurrence with their
    /// quantities summed, so the one-line-per-product invariant holds even
    /// for hand-edited storage.
    #[must_use]
    pub fn from_records(records: Vec<CartLineItem>) -> Self {
        let mut cart = Self::default();
        for record in records {
            cart.add(&record.product, record.quantity);
        }
        cart
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    /// Sum of `price * quantity` over all lines; zero when empty.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of quantities over all lines (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|i| u64::from(i.quantity.get()))
            .sum()
    }

    /// Add `quantity` of `product`.
    ///
    /// An existing line keeps its position and its original snapshot; only
    /// the quantity grows.
    pub(crate) fn add(&mut self, product: &ProductSnapshot, quantity: Quantity) {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|i| i.product_id() == product.product_id)
        {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartLineItem {
                product: product.clone(),
                quantity,
            });
        }
    }

    /// Remove the line for `product_id`. Returns whether a line was removed.
    pub(crate) fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id() != product_id);
        self.items.len() != before
    }

    /// Set the quantity of an existing line. Returns whether the line exists.
    pub(crate) fn set_quantity(&mut self, product_id: ProductId, quantity: Quantity) -> bool {
        match self.items.iter_mut().find(|i| i.product_id() == product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Drop every line. Returns whether anything was removed.
    pub(crate) fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }
}

/// Flat-rate shipping with a free-shipping threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Subtotals strictly above this ship free.
    pub free_over: Price,
    /// Charged on non-empty carts at or below the threshold.
    pub flat_rate: Price,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_over: Price::from_cents(50_000),
            flat_rate: Price::from_cents(4_900),
        }
    }
}

impl ShippingPolicy {
    /// Shipping charged on `subtotal`.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Price) -> Price {
        if subtotal.is_zero() || subtotal > self.free_over {
            Price::ZERO
        } else {
            self.flat_rate
        }
    }
}

/// Cart totals for the order summary panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
    pub item_count: u64,
}

impl OrderSummary {
    /// Summarize `cart` under `policy`.
    #[must_use]
    pub fn new(cart: &CartState, policy: &ShippingPolicy) -> Self {
        let subtotal = cart.total();
        let shipping = policy.shipping_for(subtotal);
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
            item_count: cart.item_count(),
        }
    }

    /// Whether this order ships free.
    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: i64, cents: i64) -> ProductSnapshot {
        ProductSnapshot::new(ProductId::new(id), Price::from_cents(cents))
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = CartState::default();
        cart.add(&product(1, 1_000), Quantity::ONE);
        cart.add(&product(2, 500), Quantity::ONE);
        cart.add(&product(1, 1_000), Quantity::clamped(2));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].product_id(), ProductId::new(1));
        assert_eq!(cart.items()[0].quantity.get(), 3);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total(), Price::from_cents(3_500));
    }

    #[test]
    fn test_readd_keeps_original_snapshot() {
        let mut cart = CartState::default();
        cart.add(&product(1, 1_000), Quantity::ONE);
        cart.add(&product(1, 9_999), Quantity::ONE);

        assert_eq!(cart.items()[0].product.price, Price::from_cents(1_000));
        assert_eq!(cart.total(), Price::from_cents(2_000));
    }

    #[test]
    fn test_from_records_merges_duplicates() {
        let records = vec![
            CartLineItem {
                product: product(4, 100),
                quantity: Quantity::clamped(2),
            },
            CartLineItem {
                product: product(5, 100),
                quantity: Quantity::ONE,
            },
            CartLineItem {
                product: product(4, 100),
                quantity: Quantity::clamped(3),
            },
        ];
        let cart = CartState::from_records(records);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(ProductId::new(4)).unwrap().quantity.get(), 5);
        assert_eq!(cart.items()[1].product_id(), ProductId::new(5));
    }

    #[test]
    fn test_line_record_defaults_quantity() {
        let line: CartLineItem =
            serde_json::from_str(r#"{"product_id": 2, "price": "3.50", "color": "red"}"#).unwrap();
        assert_eq!(line.quantity, Quantity::ONE);
        assert_eq!(line.line_total(), Price::from_cents(350));
    }

    #[test]
    fn test_shipping_threshold() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.shipping_for(Price::ZERO), Price::ZERO);
        assert_eq!(
            policy.shipping_for(Price::from_cents(50_000)),
            Price::from_cents(4_900)
        );
        assert_eq!(policy.shipping_for(Price::from_cents(50_001)), Price::ZERO);
    }

    #[test]
    fn test_order_summary() {
        let mut cart = CartState::default();
        cart.add(&product(1, 10_000), Quantity::clamped(2));

        let summary = OrderSummary::new(&cart, &ShippingPolicy::default());
        assert_eq!(summary.subtotal, Price::from_cents(20_000));
        assert_eq!(summary.shipping, Price::from_cents(4_900));
        assert_eq!(summary.total, Price::from_cents(24_900));
        assert_eq!(summary.item_count, 2);
        assert!(!summary.ships_free());
    }
}
