//! Client settings for the browser views.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::Serialize;

use inktrix_core::Price;

use crate::carousel::AutoAdvance;
use crate::search::MIN_QUERY_CHARS;
use crate::state::AppState;

/// Timings and thresholds the front end mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSettings {
    pub search_debounce_ms: u64,
    pub search_min_chars: usize,
    pub hero_rotate_ms: u64,
    pub category_rotate_ms: u64,
    pub free_shipping_over: Price,
    pub flat_shipping: Price,
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ClientSettings {
    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        let shipping = state.shipping();
        Self {
            search_debounce_ms: millis(state.config().search_debounce),
            search_min_chars: MIN_QUERY_CHARS,
            hero_rotate_ms: millis(AutoAdvance::HERO_PERIOD),
            category_rotate_ms: millis(AutoAdvance::CATEGORY_PERIOD),
            free_shipping_over: shipping.free_over,
            flat_shipping: shipping.flat_rate,
        }
    }
}

/// Current client settings.
pub async fn show(State(state): State<AppState>) -> Json<ClientSettings> {
    Json(ClientSettings::from_state(&state))
}
