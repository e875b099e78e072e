//! Cache types for catalog API responses.

use super::types::{Blog, Branding, Category, Faq};

/// Cache key for reference data that changes rarely.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Blogs,
    Faqs(i64),
    Branding(i64),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Blogs(Vec<Blog>),
    Faqs(Vec<Faq>),
    Branding(Box<Branding>),
}
