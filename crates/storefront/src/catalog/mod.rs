//! Inktrix catalog API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`; the catalog is the source of truth
//! - Reference data (categories, blogs, FAQs, branding) cached via `moka` (5 minute TTL)
//! - Product listings and searches are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use inktrix_storefront::catalog::{CatalogClient, ProductQuery};
//!
//! let client = CatalogClient::new(&config.catalog);
//! let printers = client.list_products(&ProductQuery::default()).await?;
//! let hits = client.search_products("toner").await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use inktrix_core::{CatalogProduct, ContactForm, WebsiteId};

use crate::config::CatalogConfig;

use cache::{CacheKey, CacheValue};
pub use types::{
    Blog, Branding, Category, Faq, ProductQuery, ProductTab, SortOrder, filter_faqs, newest_first,
    parse_list,
};

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("catalog returned HTTP {status}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The configured base URL cannot have paths appended.
    #[error("catalog base URL cannot be a base: {0}")]
    InvalidBaseUrl(String),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog API.
///
/// Cheaply cloneable; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    website_id: WebsiteId,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("website_id", &self.inner.website_id)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog API client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.clone(),
                token: config.api_token.clone(),
                website_id: config.website_id,
                cache,
            }),
        }
    }

    /// The website FAQs and branding are fetched for.
    #[must_use]
    pub fn website_id(&self) -> WebsiteId {
        self.inner.website_id
    }

    /// Build an endpoint URL from path segments and query pairs.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBaseUrl`] for URLs such as `mailto:`.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.inner.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, CatalogError> {
        let response = self
            .authorize(request)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, CatalogError> {
        let body = self.send(self.inner.client.get(url)).await?;
        parse_list(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog list response"
            );
            CatalogError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Free-text product search.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, text: &str) -> Result<Vec<CatalogProduct>, CatalogError> {
        let url = self.endpoint(&["products"], &[("search", text.to_string())])?;
        self.get_list(url).await
    }

    /// Filtered product listing for the shop page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> Result<Vec<CatalogProduct>, CatalogError> {
        let url = self.endpoint(&["products"], &query.params())?;
        self.get_list(url).await
    }

    /// Products for one of the home page tabs.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn home_tab(&self, tab: ProductTab) -> Result<Vec<CatalogProduct>, CatalogError> {
        let products = self.list_products(&ProductQuery::default()).await?;
        Ok(tab.select(&products))
    }

    // =========================================================================
    // Reference Data
    // =========================================================================

    /// All product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.endpoint(&["categories"], &[])?;
        let categories: Vec<Category> = self.get_list(url).await?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Blog posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn blogs(&self) -> Result<Vec<Blog>, CatalogError> {
        if let Some(CacheValue::Blogs(blogs)) = self.inner.cache.get(&CacheKey::Blogs).await {
            debug!("Cache hit for blogs");
            return Ok(blogs);
        }

        let url = self.endpoint(&["blogs"], &[])?;
        let mut blogs: Vec<Blog> = self.get_list(url).await?;
        newest_first(&mut blogs);

        self.inner
            .cache
            .insert(CacheKey::Blogs, CacheValue::Blogs(blogs.clone()))
            .await;

        Ok(blogs)
    }

    /// FAQs for the configured website.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn faqs(&self) -> Result<Vec<Faq>, CatalogError> {
        let website_id = self.inner.website_id;
        let cache_key = CacheKey::Faqs(website_id.as_i64());

        if let Some(CacheValue::Faqs(faqs)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for FAQs");
            return Ok(faqs);
        }

        let url = self.endpoint(&["faqs"], &[("website_id", website_id.to_string())])?;
        let faqs: Vec<Faq> = self.get_list(url).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Faqs(faqs.clone()))
            .await;

        Ok(faqs)
    }

    /// Branding and contact details for the configured website.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. Callers rendering a page
    /// usually fall back to [`Branding::default`].
    #[instrument(skip(self))]
    pub async fn branding(&self) -> Result<Branding, CatalogError> {
        let website_id = self.inner.website_id;
        let cache_key = CacheKey::Branding(website_id.as_i64());

        if let Some(CacheValue::Branding(branding)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for branding");
            return Ok(*branding);
        }

        let website = website_id.to_string();
        let url = self.endpoint(&["websites", &website], &[])?;
        let body = self.send(self.inner.client.get(url)).await?;
        let branding: Branding = serde_json::from_str(&body)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Branding(Box::new(branding.clone())))
            .await;

        Ok(branding)
    }

    // =========================================================================
    // Contact
    // =========================================================================

    /// Submit a contact form.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, form), fields(subject = %form.subject))]
    pub async fn submit_contact(&self, form: &ContactForm) -> Result<(), CatalogError> {
        let url = self.endpoint(&["contact"], &[])?;
        self.send(self.inner.client.post(url).json(form)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> CatalogClient {
        CatalogClient::new(&CatalogConfig::new(Url::parse(base).unwrap()))
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let client = client("https://api.example.com/api");
        let url = client.endpoint(&["products"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/products");

        let client = self::client("https://api.example.com/api/");
        let url = client.endpoint(&["websites", "3"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/websites/3");
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let client = client("https://api.example.com");
        let url = client
            .endpoint(&["products"], &[("search", "ink & toner".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/products?search=ink+%26+toner"
        );
    }

    #[test]
    fn test_endpoint_rejects_cannot_be_a_base() {
        let client = client("mailto:sales@example.com");
        assert!(matches!(
            client.endpoint(&["products"], &[]),
            Err(CatalogError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let mut config = CatalogConfig::new(Url::parse("https://api.example.com").unwrap());
        config.api_token = Some(SecretString::from("tk_live_secret"));
        let client = CatalogClient::new(&config);

        let debug_output = format!("{client:?}");
        assert!(debug_output.contains("api.example.com"));
        assert!(!debug_output.contains("tk_live_secret"));
    }
}
