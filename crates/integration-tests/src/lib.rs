//! Integration tests for the Inktrix storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p inktrix-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `persistence` - cart and wishlist surviving a restart through `FileStore`
//! - `catalog_client` - `CatalogClient` against an in-process fake catalog
//! - `storefront_api` - the full router wired to both
//!
//! [`FakeCatalog`] serves canned responses on a loopback port and records
//! every request it receives, so tests need no network access.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tokio::task::JoinHandle;
use url::Url;

use inktrix_storefront::config::{CatalogConfig, StorefrontConfig};
use inktrix_storefront::store::ShippingPolicy;

/// A request received by the fake catalog.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// The request body parsed as JSON, or `Null`.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    body: Value,
    retry_after: Option<u64>,
}

#[derive(Default)]
struct Shared {
    responses: HashMap<String, CannedResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Builder for a [`FakeCatalog`].
#[derive(Default)]
pub struct FakeCatalogBuilder {
    responses: HashMap<String, CannedResponse>,
}

impl FakeCatalogBuilder {
    /// Answer `path` (relative to the API base, e.g. `/products`) with `body`.
    #[must_use]
    pub fn json(self, path: &str, body: Value) -> Self {
        self.respond(path, StatusCode::OK, body, None)
    }

    /// Answer `path` with an error status.
    #[must_use]
    pub fn status(self, path: &str, status: StatusCode) -> Self {
        self.respond(path, status, serde_json::json!({"message": "error"}), None)
    }

    /// Answer `path` with `429` and a `Retry-After` header.
    #[must_use]
    pub fn rate_limited(self, path: &str, retry_after: u64) -> Self {
        self.respond(
            path,
            StatusCode::TOO_MANY_REQUESTS,
            Value::Null,
            Some(retry_after),
        )
    }

    fn respond(
        mut self,
        path: &str,
        status: StatusCode,
        body: Value,
        retry_after: Option<u64>,
    ) -> Self {
        self.responses.insert(
            format!("{}{path}", FakeCatalog::API_PREFIX),
            CannedResponse {
                status,
                body,
                retry_after,
            },
        );
        self
    }

    /// Bind a loopback port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no loopback port can be bound.
    pub async fn start(self) -> FakeCatalog {
        let shared = Arc::new(Shared {
            responses: self.responses,
            requests: Mutex::default(),
        });
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&shared));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = Url::parse(&format!("http://{addr}{}", FakeCatalog::API_PREFIX))
            .expect("valid base url");
        FakeCatalog {
            base_url,
            shared,
            server,
        }
    }
}

/// An in-process stand-in for the catalog API.
///
/// Unknown paths answer `404`. The server stops when this is dropped.
pub struct FakeCatalog {
    base_url: Url,
    shared: Arc<Shared>,
    server: JoinHandle<()>,
}

impl FakeCatalog {
    const API_PREFIX: &'static str = "/api";

    #[must_use]
    pub fn builder() -> FakeCatalogBuilder {
        FakeCatalogBuilder::default()
    }

    /// Base URL to put in [`CatalogConfig::api_url`].
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Catalog configuration pointing at this server.
    #[must_use]
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig::new(self.base_url())
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `path` (relative to the API base).
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        let full = format!("{}{path}", Self::API_PREFIX);
        self.requests().iter().filter(|r| r.path == full).count()
    }
}

impl Drop for FakeCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    shared
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            authorization: headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: body.to_vec(),
        });

    let Some(canned) = shared.responses.get(uri.path()).cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mut response = (canned.status, Json(canned.body)).into_response();
    if let Some(seconds) = canned.retry_after {
        response.headers_mut().insert(
            header::RETRY_AFTER,
            header::HeaderValue::from(seconds),
        );
    }
    response
}

/// A storefront configuration wired to `catalog` and storing state in `state_dir`.
#[must_use]
pub fn storefront_config(catalog: CatalogConfig, state_dir: &std::path::Path) -> StorefrontConfig {
    StorefrontConfig {
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        state_dir: state_dir.to_path_buf(),
        catalog,
        search_debounce: inktrix_storefront::search::DEFAULT_DEBOUNCE,
        shipping: ShippingPolicy::default(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}
