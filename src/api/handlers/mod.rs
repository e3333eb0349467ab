//! HTTP request handlers for API endpoints.

pub mod diagnostics;
pub mod entities;

/// URL segment serving products.
pub const PRODUCTS_SEGMENT: &str = "Products";

/// URL segment serving categories.
pub const CATEGORIES_SEGMENT: &str = "Categories";
