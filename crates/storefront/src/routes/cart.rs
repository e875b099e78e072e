//! Cart route handlers.
//!
//! Every mutation answers with the full cart view so the client can redraw
//! the drawer and the badge from one response.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use inktrix_core::{CatalogProduct, Price, ProductId};

use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;
use crate::store::{CartLineItem, OrderSummary, StateManager};

/// One cart line for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub category_name: String,
    pub image: Option<String>,
    pub price: Price,
    pub quantity: u32,
    pub line_total: Price,
}

impl From<&CartLineItem> for CartLineView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            product_id: line.product_id(),
            name: line.product.name.clone(),
            slug: line.product.slug.clone(),
            category_name: line.product.category_name.clone(),
            image: line.product.image_src(),
            price: line.product.price,
            quantity: line.quantity.get(),
            line_total: line.line_total(),
        }
    }
}

/// Cart display data: lines plus the order summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub ships_free: bool,
}

impl CartView {
    /// Render the manager's cart under the app's shipping policy.
    #[must_use]
    pub fn build(manager: &StateManager, state: &AppState) -> Self {
        let summary = manager.order_summary(state.shipping());
        Self {
            items: manager.cart().items().iter().map(CartLineView::from).collect(),
            ships_free: summary.ships_free(),
            summary,
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product: CatalogProduct,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// Display the cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(state.store().read(|m| CartView::build(m, &state)))
}

/// Add a catalog product to the cart.
///
/// Records without an id or a usable price are rejected with 400.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product_id = request.product.id;
    let view = state.store().update(|m| {
        m.add_catalog_product(request.product, request.quantity)?;
        Ok::<_, crate::error::AppError>(CartView::build(m, &state))
    })?;

    if let Some(id) = product_id {
        let id = id.to_string();
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
    }
    Ok(Json(view))
}

/// Set a line's quantity. Values below 1 are stored as 1.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Json<CartView> {
    Json(state.store().update(|m| {
        m.update_quantity(product_id, request.quantity);
        CartView::build(m, &state)
    }))
}

/// Remove a line.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Json<CartView> {
    Json(state.store().update(|m| {
        m.remove_from_cart(product_id);
        CartView::build(m, &state)
    }))
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Json<CartView> {
    Json(state.store().update(|m| {
        m.clear_cart();
        CartView::build(m, &state)
    }))
}
