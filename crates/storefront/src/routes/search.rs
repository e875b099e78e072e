//! Search route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use inktrix_core::CatalogProduct;

use crate::error::Result;
use crate::search::MIN_QUERY_CHARS;
use crate::state::AppState;

/// Search suggestions query parameters.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// Search suggestions for the overlay.
///
/// Queries shorter than two characters answer with an empty list without
/// calling the catalog. The browser debounces keystrokes; this endpoint only
/// forwards.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Vec<CatalogProduct>>> {
    let q = query.q.trim();
    if q.chars().count() < MIN_QUERY_CHARS {
        return Ok(Json(Vec::new()));
    }

    let products = state.catalog().search_products(q).await?;
    Ok(Json(products))
}
