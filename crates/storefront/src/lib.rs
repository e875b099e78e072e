//! Inktrix Storefront library.
//!
//! Cart and wishlist state with durable persistence and change
//! notification, a client for the Inktrix catalog API, debounced search,
//! timers for rotating banners, and the JSON routes that expose them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod carousel;
pub mod catalog;
pub mod config;
pub mod error;
pub mod persist;
pub mod routes;
pub mod search;
pub mod state;
pub mod store;
pub mod timer;
