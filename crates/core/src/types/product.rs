//! Product records: untrusted catalog data and validated snapshots.
//!
//! [`CatalogProduct`] mirrors what the remote catalog sends, with every field
//! optional. [`ProductSnapshot`] is what the cart and wishlist store: the
//! catalog fields captured at the moment of adding, never live-synced.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;

/// A catalog record rejected at the state manager boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The record has no product id.
    #[error("product has no id")]
    MissingId,
    /// The record has no price.
    #[error("product {0} has no price")]
    MissingPrice(ProductId),
    /// The record has a negative price.
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
}

/// A product record as returned by the catalog API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    /// Compare-at price ("MRP"); above `price` when the product is on deal.
    #[serde(default)]
    pub mrp: Option<Price>,
    /// Accepts `true`/`false`, `1`/`0` or null.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_best_selling: bool,
}

impl CatalogProduct {
    /// Whether the catalog lists this product below its compare-at price.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        matches!((self.price, self.mrp), (Some(price), Some(mrp)) if mrp > price)
    }
}

/// Catalog fields captured when a product is added to the cart or wishlist.
///
/// `id` is accepted as an alias of `product_id` so records written by older
/// clients still restore. Unknown fields are ignored and null strings read as
/// empty. A negative `price` fails to decode, the same rule
/// `TryFrom<CatalogProduct>` applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    #[serde(alias = "id")]
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "non_negative_price")]
    pub price: Price,
}

impl ProductSnapshot {
    /// Create a snapshot with only an id and a price.
    #[must_use]
    pub const fn new(product_id: ProductId, price: Price) -> Self {
        Self {
            product_id,
            name: String::new(),
            slug: String::new(),
            category_name: String::new(),
            image_url: None,
            price,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the URL slug.
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Set the category label.
    #[must_use]
    pub fn with_category(mut self, category_name: impl Into<String>) -> Self {
        self.category_name = category_name.into();
        self
    }

    /// Resolve the image to an absolute-or-site-relative URL.
    ///
    /// Bare file names live under `/products/`; `None` when no image is set.
    #[must_use]
    pub fn image_src(&self) -> Option<String> {
        let url = self.image_url.as_deref().filter(|u| !u.is_empty())?;
        if url.starts_with("http") || url.starts_with('/') {
            Some(url.to_string())
        } else {
            Some(format!("/products/{url}"))
        }
    }
}

impl TryFrom<CatalogProduct> for ProductSnapshot {
    type Error = ValidationError;

    fn try_from(product: CatalogProduct) -> Result<Self, Self::Error> {
        let product_id = product.id.ok_or(ValidationError::MissingId)?;
        let price = product
            .price
            .ok_or(ValidationError::MissingPrice(product_id))?;
        if price.is_negative() {
            return Err(ValidationError::NegativePrice(product_id));
        }

        Ok(Self {
            product_id,
            name: product.name.unwrap_or_default(),
            slug: product.slug.unwrap_or_default(),
            category_name: product.category_name.unwrap_or_default(),
            image_url: product.image_url,
            price,
        })
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_negative_price<'de, D>(deserializer: D) -> Result<Price, D::Error>
where
    D: Deserializer<'de>,
{
    let price = Price::deserialize(deserializer)?;
    if price.is_negative() {
        return Err(serde::de::Error::custom(format!("negative price {price}")));
    }
    Ok(price)
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(flag) => flag,
        serde_json::Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        serde_json::Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog(json: &str) -> CatalogProduct {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_snapshot_from_catalog() {
        let product = catalog(
            r#"{"id": 3, "name": "LaserJet Pro", "slug": "laserjet-pro",
                "category_name": "Printers", "image_url": "lj.png",
                "price": "249.00", "mrp": "299.00", "stock": 4}"#,
        );
        assert!(product.is_discounted());

        let snapshot = ProductSnapshot::try_from(product).unwrap();
        assert_eq!(snapshot.product_id, ProductId::new(3));
        assert_eq!(snapshot.name, "LaserJet Pro");
        assert_eq!(snapshot.price, Price::from_cents(24_900));
        assert_eq!(snapshot.image_src().as_deref(), Some("/products/lj.png"));
    }

    #[test]
    fn test_missing_id_rejected() {
        let product = catalog(r#"{"name": "Toner", "price": 10}"#);
        assert_eq!(
            ProductSnapshot::try_from(product),
            Err(ValidationError::MissingId)
        );
    }

    #[test]
    fn test_missing_or_negative_price_rejected() {
        let product = catalog(r#"{"id": 9}"#);
        assert_eq!(
            ProductSnapshot::try_from(product),
            Err(ValidationError::MissingPrice(ProductId::new(9)))
        );

        let product = catalog(r#"{"id": 9, "price": -1}"#);
        assert_eq!(
            ProductSnapshot::try_from(product),
            Err(ValidationError::NegativePrice(ProductId::new(9)))
        );
    }

    #[test]
    fn test_snapshot_accepts_id_alias_and_nulls() {
        let snapshot: ProductSnapshot =
            serde_json::from_str(r#"{"id": 5, "name": null, "price": 12.5, "extra": true}"#)
                .unwrap();
        assert_eq!(snapshot.product_id, ProductId::new(5));
        assert_eq!(snapshot.name, "");
        assert_eq!(snapshot.price, Price::from_cents(1_250));
    }

    #[test]
    fn test_snapshot_rejects_negative_price() {
        let result =
            serde_json::from_str::<ProductSnapshot>(r#"{"product_id": 1, "price": "-50.00"}"#);
        assert!(result.is_err());

        let free: ProductSnapshot =
            serde_json::from_str(r#"{"product_id": 1, "price": 0}"#).unwrap();
        assert_eq!(free.price, Price::ZERO);
    }

    #[test]
    fn test_best_selling_flag_shapes() {
        assert!(catalog(r#"{"is_best_selling": true}"#).is_best_selling);
        assert!(catalog(r#"{"is_best_selling": 1}"#).is_best_selling);
        assert!(!catalog(r#"{"is_best_selling": 0}"#).is_best_selling);
        assert!(!catalog(r#"{"is_best_selling": null}"#).is_best_selling);
        assert!(!catalog("{}").is_best_selling);
    }

    #[test]
    fn test_image_src_keeps_absolute_urls() {
        let mut snapshot = ProductSnapshot::new(ProductId::new(1), Price::ZERO);
        assert_eq!(snapshot.image_src(), None);

        snapshot.image_url = Some("https://cdn.example.com/a.png".to_string());
        assert_eq!(
            snapshot.image_src().as_deref(),
            Some("https://cdn.example.com/a.png")
        );
    }
}
