//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Health check
//!
//! # Cart
//! GET    /api/cart                            - Cart with order summary
//! POST   /api/cart/items                      - Add a product {product, quantity?}
//! PATCH  /api/cart/items/{product_id}         - Set quantity {quantity}
//! DELETE /api/cart/items/{product_id}         - Remove a line
//! DELETE /api/cart                            - Empty the cart
//!
//! # Wishlist
//! GET    /api/wishlist                        - Saved products
//! POST   /api/wishlist/toggle                 - Save or unsave {product}
//! DELETE /api/wishlist/{product_id}           - Remove a saved product
//! POST   /api/wishlist/{product_id}/move-to-cart
//! DELETE /api/wishlist                        - Empty the wishlist
//!
//! # Catalog
//! GET    /api/search?q=                       - Search suggestions
//! GET    /api/products                        - Shop listing (category, search, maxPrice, sort)
//! GET    /api/home/{tab}                      - new-arrivals | best-sellers | on-sale
//! GET    /api/categories                      - Categories
//! GET    /api/blogs?limit=                    - Latest blog posts (default 3)
//! GET    /api/faqs?q=                         - FAQs, optionally filtered
//! GET    /api/branding                        - Store name and contact details
//! POST   /api/contact                         - Contact form
//! GET    /api/settings                        - Debounce, rotation and shipping settings
//! ```

pub mod cart;
pub mod catalog;
pub mod contact;
pub mod search;
pub mod settings;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route(
            "/items/{product_id}",
            patch(cart::update).delete(cart::remove),
        )
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show).delete(wishlist::clear))
        .route("/toggle", post(wishlist::toggle))
        .route("/{product_id}", delete(wishlist::remove))
        .route("/{product_id}/move-to-cart", post(wishlist::move_to_cart))
}

/// Create the catalog passthrough router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search::suggest))
        .route("/products", get(catalog::products))
        .route("/home/{tab}", get(catalog::home_tab))
        .route("/categories", get(catalog::categories))
        .route("/blogs", get(catalog::blogs))
        .route("/faqs", get(catalog::faqs))
        .route("/branding", get(catalog::branding))
        .route("/contact", post(contact::submit))
        .route("/settings", get(settings::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .nest("/api", catalog_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the catalog.
pub async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::{CatalogConfig, StorefrontConfig};
    use crate::store::{ShippingPolicy, StateManager};

    fn test_state() -> AppState {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            state_dir: ".inktrix-test".into(),
            // Unroutable: any test that reaches the catalog fails fast.
            catalog: CatalogConfig::new(Url::parse("http://127.0.0.1:9/api").unwrap()),
            search_debounce: std::time::Duration::from_millis(300),
            shipping: ShippingPolicy::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        AppState::new(config, StateManager::session_only())
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = routes().with_state(test_state());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cart_flow() {
        let app = routes().with_state(test_state());

        let (status, cart) = call(
            &app,
            Method::POST,
            "/api/cart/items",
            Some(json!({"product": {"id": 7, "name": "Toner", "price": "120.00"}, "quantity": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cart["item_count"], 2);
        assert_eq!(cart["subtotal"], "240.00");
        assert_eq!(cart["shipping"], "49.00");
        assert_eq!(cart["total"], "289.00");
        assert_eq!(cart["ships_free"], false);

        let (_, cart) = call(
            &app,
            Method::PATCH,
            "/api/cart/items/7",
            Some(json!({"quantity": 5})),
        )
        .await;
        assert_eq!(cart["items"][0]["quantity"], 5);
        assert_eq!(cart["ships_free"], true);

        // Decrementing past one never removes the line.
        let (_, cart) = call(
            &app,
            Method::PATCH,
            "/api/cart/items/7",
            Some(json!({"quantity": 0})),
        )
        .await;
        assert_eq!(cart["items"][0]["quantity"], 1);

        let (_, cart) = call(&app, Method::DELETE, "/api/cart/items/7", None).await;
        assert_eq!(cart["items"].as_array().unwrap().len(), 0);
        assert_eq!(cart["total"], "0");
    }

    #[tokio::test]
    async fn test_add_invalid_product_is_bad_request() {
        let app = routes().with_state(test_state());

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/cart/items",
            Some(json!({"product": {"name": "No id", "price": 5}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("no id"));

        let (_, cart) = call(&app, Method::GET, "/api/cart", None).await;
        assert_eq!(cart["item_count"], 0);
    }

    #[tokio::test]
    async fn test_wishlist_toggle_and_move() {
        let app = routes().with_state(test_state());
        let product = json!({"product": {"id": 3, "name": "Ink", "price": 15}});

        let (_, toggled) =
            call(&app, Method::POST, "/api/wishlist/toggle", Some(product.clone())).await;
        assert_eq!(toggled, json!({"in_wishlist": true}));

        let (_, wishlist) = call(&app, Method::GET, "/api/wishlist", None).await;
        assert_eq!(wishlist["count"], 1);

        let (status, wishlist) =
            call(&app, Method::POST, "/api/wishlist/3/move-to-cart", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(wishlist["count"], 0);

        let (_, cart) = call(&app, Method::GET, "/api/cart", None).await;
        assert_eq!(cart["items"][0]["product_id"], 3);

        let (status, _) = call(&app, Method::POST, "/api/wishlist/3/move-to-cart", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, toggled) =
            call(&app, Method::POST, "/api/wishlist/toggle", Some(product.clone())).await;
        assert_eq!(toggled, json!({"in_wishlist": true}));
        let (_, toggled) = call(&app, Method::POST, "/api/wishlist/toggle", Some(product)).await;
        assert_eq!(toggled, json!({"in_wishlist": false}));

        call(
            &app,
            Method::POST,
            "/api/wishlist/toggle",
            Some(json!({"product": {"id": 4, "name": "Paper", "price": 8}})),
        )
        .await;
        let (status, wishlist) = call(&app, Method::DELETE, "/api/wishlist", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(wishlist["count"], 0);
    }

    #[tokio::test]
    async fn test_short_search_skips_catalog() {
        let app = routes().with_state(test_state());
        let (status, results) = call(&app, Method::GET, "/api/search?q=a", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(results, json!([]));
    }

    #[tokio::test]
    async fn test_blog_limit_is_validated_before_catalog() {
        let app = routes().with_state(test_state());
        for uri in ["/api/blogs?limit=0", "/api/blogs?limit=21"] {
            let (status, body) = call(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().unwrap().contains("limit"));
        }
    }

    #[tokio::test]
    async fn test_client_settings() {
        let app = routes().with_state(test_state());
        let (status, settings) = call(&app, Method::GET, "/api/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings["search_debounce_ms"], 300);
        assert_eq!(settings["search_min_chars"], 2);
        assert_eq!(settings["hero_rotate_ms"], 6000);
        assert_eq!(settings["category_rotate_ms"], 4000);
        assert_eq!(settings["free_shipping_over"], "500.00");
        assert_eq!(settings["flat_shipping"], "49.00");
    }

    #[tokio::test]
    async fn test_unknown_home_tab() {
        let app = routes().with_state(test_state());
        let (status, _) = call(&app, Method::GET, "/api/home/clearance", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_contact_validation_happens_before_catalog() {
        let app = routes().with_state(test_state());
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/contact",
            Some(json!({"name": "Ada", "email": "not-an-email", "message": "Hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("email"));
    }
}
