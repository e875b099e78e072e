//! Catalog passthrough handlers: shop listing, home tabs and reference data.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::instrument;

use inktrix_core::{BlogId, CatalogProduct, Price};

use crate::catalog::{
    Blog, Branding, Category, Faq, ProductQuery, ProductTab, SortOrder, filter_faqs,
};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Deserialize empty strings as None for optional numeric fields.
fn empty_string_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Shop page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, rename = "maxPrice", deserialize_with = "empty_string_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl From<ListingParams> for ProductQuery {
    fn from(params: ListingParams) -> Self {
        Self {
            category: params.category,
            search: params.search,
            max_price: params.max_price.map(Price::new),
            sort: params.sort.as_deref().map_or_else(SortOrder::default, SortOrder::parse),
        }
    }
}

/// FAQ page query parameters.
#[derive(Debug, Deserialize)]
pub struct FaqParams {
    #[serde(default)]
    pub q: String,
}

/// Blog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct BlogParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// A blog post teaser with its cover image resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogView {
    pub id: Option<BlogId>,
    pub title: String,
    pub slug: String,
    pub image: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Blog> for BlogView {
    fn from(blog: &Blog) -> Self {
        Self {
            id: blog.id,
            title: blog.title.clone(),
            slug: blog.slug.clone(),
            image: blog.image_src(),
            created_at: blog.created_at,
        }
    }
}

/// Filtered product listing.
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<Vec<CatalogProduct>>> {
    let query = ProductQuery::from(params);
    Ok(Json(state.catalog().list_products(&query).await?))
}

/// Home page product tab: `new-arrivals`, `best-sellers` or `on-sale`.
#[instrument(skip(state))]
pub async fn home_tab(
    State(state): State<AppState>,
    Path(tab): Path<String>,
) -> Result<Json<Vec<CatalogProduct>>> {
    let tab = match tab.as_str() {
        "new-arrivals" => ProductTab::NewArrivals,
        "best-sellers" => ProductTab::BestSellers,
        "on-sale" => ProductTab::OnSale,
        other => return Err(AppError::NotFound(format!("product tab {other}"))),
    };
    Ok(Json(state.catalog().home_tab(tab).await?))
}

/// Latest blog posts; three unless `limit` says otherwise.
#[instrument(skip(state))]
pub async fn blogs(
    State(state): State<AppState>,
    Query(params): Query<BlogParams>,
) -> Result<Json<Vec<BlogView>>> {
    let limit = params.limit.unwrap_or(Blog::HOME_LIMIT);
    if !(1..=Blog::MAX_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {}",
            Blog::MAX_LIMIT
        )));
    }

    let blogs = state.catalog().blogs().await?;
    Ok(Json(blogs.iter().take(limit).map(BlogView::from).collect()))
}

/// All categories.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().categories().await?))
}

/// FAQs, optionally filtered by `q`.
#[instrument(skip(state))]
pub async fn faqs(
    State(state): State<AppState>,
    Query(params): Query<FaqParams>,
) -> Result<Json<Vec<Faq>>> {
    let faqs = state.catalog().faqs().await?;
    Ok(Json(filter_faqs(&faqs, &params.q).into_iter().cloned().collect()))
}

/// Store branding; falls back to the defaults when the catalog is down.
#[instrument(skip(state))]
pub async fn branding(State(state): State<AppState>) -> Json<Branding> {
    match state.catalog().branding().await {
        Ok(branding) => Json(branding),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch branding, using defaults");
            Json(Branding::default())
        }
    }
}
