//! Catalog API records and query building.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use inktrix_core::{BlogId, CatalogProduct, CategoryId, FaqId, Price};

// =============================================================================
// Records
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
}

/// A frequently asked question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    #[serde(default)]
    pub id: Option<FaqId>,
    pub question: String,
    pub answer: String,
}

/// A blog post as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    #[serde(default)]
    pub id: Option<BlogId>,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or a bare date; anything else
    /// reads as unknown.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Blog {
    /// Posts shown on the home page.
    pub const HOME_LIMIT: usize = 3;
    /// Largest page a caller may ask for.
    pub const MAX_LIMIT: usize = 20;

    /// Resolve the cover image; bare file names live under `/blogs/`.
    #[must_use]
    pub fn image_src(&self) -> Option<String> {
        let url = self.image_url.as_deref().filter(|u| !u.is_empty())?;
        if url.starts_with("http") || url.starts_with('/') {
            Some(url.to_string())
        } else {
            Some(format!("/blogs/{url}"))
        }
    }
}

/// Sort posts newest first. Undated posts go last, in their original order.
pub fn newest_first(blogs: &mut [Blog]) {
    blogs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    Ok(DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|at| at.and_utc())
        })
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|at| at.and_utc())
        }))
}

/// Store branding and contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    #[serde(default = "default_store_name")]
    pub name: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            contact_email: None,
            contact_address: None,
            phone: None,
            logo_url: None,
        }
    }
}

fn default_store_name() -> String {
    "Inktrix".to_string()
}

// =============================================================================
// Response shapes
// =============================================================================

/// Extract a list from a response body that is either a bare array or a
/// `{"data": [...]}` envelope.
///
/// Any other shape yields an empty list. Elements that do not decode as `T`
/// are skipped.
///
/// # Errors
///
/// Returns an error only when the body is not JSON at all.
pub fn parse_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let elements = match value {
        serde_json::Value::Array(elements) => elements,
        serde_json::Value::Object(mut map) => match map.remove("data") {
            Some(serde_json::Value::Array(elements)) => elements,
            _ => return Ok(Vec::new()),
        },
        _ => return Ok(Vec::new()),
    };

    let total = elements.len();
    let parsed: Vec<T> = elements
        .into_iter()
        .filter_map(|element| serde_json::from_value(element).ok())
        .collect();
    if parsed.len() != total {
        tracing::debug!(
            skipped = total - parsed.len(),
            "Skipped undecodable catalog records"
        );
    }
    Ok(parsed)
}

// =============================================================================
// Product listing
// =============================================================================

/// Listing order for the shop page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
        }
    }

    /// Parse a sort parameter, falling back to [`SortOrder::Newest`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            _ => Self::Newest,
        }
    }
}

/// Filters for `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Category slug; `None` or `"All"` lists every category.
    pub category: Option<String>,
    pub search: Option<String>,
    /// Upper price bound; at or above [`ProductQuery::PRICE_SLIDER_MAX`] means unbounded.
    pub max_price: Option<Price>,
    pub sort: SortOrder,
}

impl ProductQuery {
    /// The price slider's top stop, treated as "no limit".
    pub const PRICE_SLIDER_MAX: i64 = 100_000;

    /// Query-string pairs, omitting filters that do not narrow the listing.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "All")
        {
            params.push(("category", category.to_string()));
        }
        if let Some(search) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            params.push(("search", search.to_string()));
        }
        if let Some(max) = self
            .max_price
            .filter(|p| *p < Price::from_cents(Self::PRICE_SLIDER_MAX * 100))
        {
            params.push(("maxPrice", max.amount().normalize().to_string()));
        }
        params.push(("sort", self.sort.as_str().to_string()));
        params
    }
}

// =============================================================================
// Client-side selection
// =============================================================================

/// Home page product tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductTab {
    NewArrivals,
    BestSellers,
    OnSale,
}

impl ProductTab {
    /// Products shown per tab.
    pub const LIMIT: usize = 8;

    /// Pick this tab's products from a full listing.
    ///
    /// New arrivals are the highest ids first; records without an id sort last.
    #[must_use]
    pub fn select(self, products: &[CatalogProduct]) -> Vec<CatalogProduct> {
        match self {
            Self::NewArrivals => {
                let mut newest = products.to_vec();
                newest.sort_by(|a, b| b.id.cmp(&a.id));
                newest.truncate(Self::LIMIT);
                newest
            }
            Self::BestSellers => products
                .iter()
                .filter(|p| p.is_best_selling)
                .take(Self::LIMIT)
                .cloned()
                .collect(),
            Self::OnSale => products
                .iter()
                .filter(|p| p.is_discounted())
                .take(Self::LIMIT)
                .cloned()
                .collect(),
        }
    }
}

/// FAQs whose question or answer contains `term`, case-insensitively.
///
/// A blank term returns everything.
#[must_use]
pub fn filter_faqs<'a>(faqs: &'a [Faq], term: &str) -> Vec<&'a Faq> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return faqs.iter().collect();
    }
    faqs.iter()
        .filter(|faq| {
            faq.question.to_lowercase().contains(&term) || faq.answer.to_lowercase().contains(&term)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use inktrix_core::ProductId;

    use super::*;

    #[test]
    fn test_parse_list_bare_array() {
        let products: Vec<CatalogProduct> =
            parse_list(r#"[{"id": 1, "price": 10}, {"id": 2, "price": "20.50"}]"#).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].price, Some(Price::from_cents(2_050)));
    }

    #[test]
    fn test_parse_list_wrapped() {
        let products: Vec<CatalogProduct> =
            parse_list(r#"{"data": [{"id": 1, "price": 10}], "total": 1}"#).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, Some(ProductId::new(1)));
    }

    #[test]
    fn test_blog_timestamps_and_order() {
        let mut blogs: Vec<Blog> = parse_list(
            r#"[
                {"id": 1, "title": "Undated", "slug": "undated", "created_at": "last spring"},
                {"id": 2, "title": "Older", "slug": "older", "created_at": "2024-03-01 09:30:00"},
                {"id": 3, "title": "Newest", "slug": "newest", "created_at": "2024-06-10T08:00:00.000Z"},
                {"id": 4, "title": "Dated", "slug": "dated", "created_at": "2024-05-01"},
                {"title": "No slug"}
            ]"#,
        )
        .unwrap();
        assert_eq!(blogs.len(), 4);
        assert_eq!(blogs[0].created_at, None);

        newest_first(&mut blogs);
        let slugs: Vec<_> = blogs.iter().map(|b| b.slug.as_str()).collect();
        assert_eq!(slugs, ["newest", "dated", "older", "undated"]);
        assert_eq!(
            blogs[2].created_at.unwrap().to_rfc3339(),
            "2024-03-01T09:30:00+00:00"
        );
    }

    #[test]
    fn test_blog_image_src() {
        let mut blog: Blog = serde_json::from_str(
            r#"{"title": "Toner 101", "slug": "toner-101", "image_url": "t.jpg"}"#,
        )
        .unwrap();
        assert_eq!(blog.image_src().as_deref(), Some("/blogs/t.jpg"));

        blog.image_url = Some("https://cdn.example.com/t.jpg".to_string());
        assert_eq!(blog.image_src().as_deref(), Some("https://cdn.example.com/t.jpg"));
    }

    #[test]
    fn test_parse_list_other_shapes_are_empty() {
        assert!(parse_list::<CatalogProduct>(r#"{"message": "ok"}"#).unwrap().is_empty());
        assert!(parse_list::<CatalogProduct>(r#"{"data": null}"#).unwrap().is_empty());
        assert!(parse_list::<CatalogProduct>("42").unwrap().is_empty());
        assert!(parse_list::<CatalogProduct>("not json").is_err());
    }

    #[test]
    fn test_parse_list_skips_bad_records() {
        let faqs: Vec<Faq> =
            parse_list(r#"[{"question": "Q", "answer": "A"}, {"question": 3}]"#).unwrap();
        assert_eq!(faqs.len(), 1);
    }

    #[test]
    fn test_query_params_omit_defaults() {
        let query = ProductQuery {
            category: Some("All".to_string()),
            search: Some("  ".to_string()),
            max_price: Some(Price::from_cents(ProductQuery::PRICE_SLIDER_MAX * 100)),
            sort: SortOrder::Newest,
        };
        assert_eq!(query.params(), vec![("sort", "newest".to_string())]);
    }

    #[test]
    fn test_query_params_full() {
        let query = ProductQuery {
            category: Some("laser-printers".to_string()),
            search: Some("mono".to_string()),
            max_price: Some(Price::from_cents(2_500_000)),
            sort: SortOrder::PriceHigh,
        };
        assert_eq!(
            query.params(),
            vec![
                ("category", "laser-printers".to_string()),
                ("search", "mono".to_string()),
                ("maxPrice", "25000".to_string()),
                ("sort", "price-high".to_string()),
            ]
        );
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("price-low"), SortOrder::PriceLow);
        assert_eq!(SortOrder::parse("bogus"), SortOrder::Newest);
    }

    #[test]
    fn test_product_tabs() {
        let products: Vec<CatalogProduct> = parse_list(
            r#"[
                {"id": 1, "price": 10, "mrp": 12},
                {"id": 3, "price": 10, "is_best_selling": 1},
                {"id": 2, "price": 10, "mrp": 10}
            ]"#,
        )
        .unwrap();

        let newest: Vec<_> = ProductTab::NewArrivals
            .select(&products)
            .iter()
            .map(|p| p.id.unwrap().as_i64())
            .collect();
        assert_eq!(newest, vec![3, 2, 1]);

        let best = ProductTab::BestSellers.select(&products);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].id, Some(ProductId::new(3)));

        let sale = ProductTab::OnSale.select(&products);
        assert_eq!(sale.len(), 1);
        assert_eq!(sale[0].id, Some(ProductId::new(1)));
    }

    #[test]
    fn test_filter_faqs() {
        let faqs = vec![
            Faq {
                id: None,
                question: "Do you ship toner?".to_string(),
                answer: "Yes, nationwide.".to_string(),
            },
            Faq {
                id: None,
                question: "Warranty?".to_string(),
                answer: "One year on all PRINTERS.".to_string(),
            },
        ];

        assert_eq!(filter_faqs(&faqs, "").len(), 2);
        assert_eq!(filter_faqs(&faqs, "TONER").len(), 1);
        assert_eq!(filter_faqs(&faqs, "printers")[0].question, "Warranty?");
        assert!(filter_faqs(&faqs, "refund").is_empty());
    }

    #[test]
    fn test_branding_defaults() {
        let branding: Branding = serde_json::from_str("{}").unwrap();
        assert_eq!(branding.name, "Inktrix");
        assert_eq!(branding, Branding::default());
    }
}
