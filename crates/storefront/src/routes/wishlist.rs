//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use inktrix_core::{CatalogProduct, Price, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;
use crate::store::{StateManager, WishlistItem};

/// One saved product for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistItemView {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub category_name: String,
    pub image: Option<String>,
    pub price: Price,
}

impl From<&WishlistItem> for WishlistItemView {
    fn from(item: &WishlistItem) -> Self {
        Self {
            product_id: item.product.product_id,
            name: item.product.name.clone(),
            slug: item.product.slug.clone(),
            category_name: item.product.category_name.clone(),
            image: item.product.image_src(),
            price: item.product.price,
        }
    }
}

/// Wishlist display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistView {
    pub items: Vec<WishlistItemView>,
    pub count: usize,
}

impl WishlistView {
    #[must_use]
    pub fn build(manager: &StateManager) -> Self {
        let wishlist = manager.wishlist();
        Self {
            items: wishlist.items().iter().map(WishlistItemView::from).collect(),
            count: wishlist.len(),
        }
    }
}

/// Toggle request body.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub product: CatalogProduct,
}

/// Toggle response: membership after the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub in_wishlist: bool,
}

/// Display the wishlist.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<WishlistView> {
    Json(state.store().read(WishlistView::build))
}

/// Add the product if absent, remove it if present.
#[instrument(skip(state))]
pub async fn toggle(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>> {
    let in_wishlist = state
        .store()
        .update(|m| m.toggle_catalog_product(request.product))?;

    add_breadcrumb(
        "wishlist",
        if in_wishlist {
            "Saved to wishlist"
        } else {
            "Removed from wishlist"
        },
        None,
    );
    Ok(Json(ToggleResponse { in_wishlist }))
}

/// Remove a saved product.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Json<WishlistView> {
    Json(state.store().update(|m| {
        m.remove_from_wishlist(product_id);
        WishlistView::build(m)
    }))
}

/// Move a saved product into the cart with quantity 1.
#[instrument(skip(state))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<WishlistView>> {
    state.store().update(|m| {
        if m.move_to_cart(product_id) {
            Ok(Json(WishlistView::build(m)))
        } else {
            Err(AppError::NotFound(format!(
                "product {product_id} is not in the wishlist"
            )))
        }
    })
}

/// Empty the wishlist.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Json<WishlistView> {
    Json(state.store().update(|m| {
        m.clear_wishlist();
        WishlistView::build(m)
    }))
}
