//! Debounced, last-request-wins product search.
//!
//! Each keystroke calls [`DebouncedSearch::set_query`]. The request is only
//! sent once the input has been quiet for the debounce period, and a response
//! for a query that has since been replaced is discarded. Results are
//! published on a `watch` channel so any number of views can follow them.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use inktrix_core::CatalogProduct;

use crate::catalog::{CatalogClient, CatalogError};
use crate::timer::ScheduledTask;

/// Message shown when a search request fails.
pub const SEARCH_FAILED: &str = "Could not load results.";

/// Queries shorter than this (after trimming) are not sent.
pub const MIN_QUERY_CHARS: usize = 2;

/// Default quiet period before a query is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// A backend that can answer free-text product searches.
pub trait ProductSearch: Send + Sync + 'static {
    fn search(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<CatalogProduct>, CatalogError>> + Send;
}

impl ProductSearch for CatalogClient {
    async fn search(&self, text: &str) -> Result<Vec<CatalogProduct>, CatalogError> {
        self.search_products(text).await
    }
}

/// What the search overlay should currently show.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "results", rename_all = "snake_case")]
pub enum SearchState {
    /// No query, or one too short to send.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    Ready(Vec<CatalogProduct>),
    Failed(String),
}

struct SearchInner<S> {
    searcher: S,
    delay: Duration,
    generation: AtomicU64,
    state: watch::Sender<SearchState>,
}

impl<S: ProductSearch> SearchInner<S> {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn run(&self, generation: u64, text: &str) {
        if !self.is_current(generation) {
            return;
        }
        self.state.send_replace(SearchState::Loading);

        let outcome = self.searcher.search(text).await;

        if !self.is_current(generation) {
            debug!(query = %text, "Discarding stale search response");
            return;
        }
        let next = match outcome {
            Ok(products) => SearchState::Ready(products),
            Err(e) => {
                warn!(error = %e, query = %text, "Product search failed");
                SearchState::Failed(SEARCH_FAILED.to_string())
            }
        };
        self.state.send_replace(next);
    }
}

/// Debounces search input in front of a [`ProductSearch`] backend.
pub struct DebouncedSearch<S> {
    inner: Arc<SearchInner<S>>,
    pending: Mutex<Option<ScheduledTask>>,
}

impl<S: ProductSearch> DebouncedSearch<S> {
    #[must_use]
    pub fn new(searcher: S) -> Self {
        Self::with_delay(searcher, DEFAULT_DEBOUNCE)
    }

    #[must_use]
    pub fn with_delay(searcher: S, delay: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            inner: Arc::new(SearchInner {
                searcher,
                delay,
                generation: AtomicU64::new(0),
                state,
            }),
            pending: Mutex::new(None),
        }
    }

    /// Replace the query.
    ///
    /// Cancels any pending or in-flight request. Short queries publish
    /// [`SearchState::Idle`] at once; others are sent after the quiet period.
    /// Must be called inside a tokio runtime.
    pub fn set_query(&self, text: &str) {
        // The generation is bumped under the lock so the task left pending is
        // always the one holding the newest generation.
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        drop(pending.take());

        let text = text.trim();
        if text.chars().count() < MIN_QUERY_CHARS {
            self.inner.state.send_replace(SearchState::Idle);
            return;
        }

        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        *pending = Some(ScheduledTask::after(self.inner.delay, async move {
            inner.run(generation, &text).await;
        }));
    }

    /// Forget the query and return to [`SearchState::Idle`].
    pub fn clear(&self) {
        self.set_query("");
    }

    /// The state right now.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    /// Follow state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }
}

impl<S> std::fmt::Debug for DebouncedSearch<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedSearch")
            .field("delay", &self.inner.delay)
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
