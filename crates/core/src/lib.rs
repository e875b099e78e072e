//! Inktrix Core - Shared storefront types.
//!
//! This crate provides the types shared by the storefront state manager,
//! the catalog client and the HTTP surface:
//! - product identifiers and validated product snapshots
//! - fixed-point prices and clamped quantities
//! - contact form input
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no HTTP clients. Catalog data is untrusted until it has been converted
//! into a [`ProductSnapshot`] here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
