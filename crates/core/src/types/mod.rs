//! Core types for the Inktrix storefront.

pub mod contact;
pub mod id;
pub mod price;
pub mod product;
pub mod quantity;

pub use contact::{ContactForm, ContactFormError, Email, EmailError};
pub use id::*;
pub use price::Price;
pub use product::{CatalogProduct, ProductSnapshot, ValidationError};
pub use quantity::Quantity;
