//! Catalog vocabulary, category mapping, and listing guards.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the repository layer and the import pipeline.

use crate::error::CoreError;

// ── Constants ────────────────────────────────────────────────────────

/// The fixed set of store categories a book may belong to.
pub const CATEGORIES: &[&str] = &[
    "literature",
    "poetry",
    "devotional",
    "educational",
    "children",
    "history",
    "philosophy",
    "biography",
];

/// The category assigned when an external term has no mapping.
pub const FALLBACK_CATEGORY: &str = "literature";

/// Default number of books per listing page.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Maximum number of books per listing page.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Default number of books on curated shelves (featured, bestsellers).
pub const DEFAULT_SHELF_LIMIT: i64 = 10;

/// Maximum title length accepted on create/update.
const MAX_TITLE_LEN: usize = 512;

// ── Category mapping ─────────────────────────────────────────────────

/// Map a WooCommerce category term onto a store category.
///
/// Matching is case-insensitive. Unrecognised terms fall back to
/// [`FALLBACK_CATEGORY`].
pub fn map_woo_category(term: &str) -> &'static str {
    // Both fiction and non-fiction land in the general literature shelf.
    match term.to_lowercase().as_str() {
        "fiction" | "non-fiction" => "literature",
        "poetry" => "poetry",
        "devotional" => "devotional",
        "education" => "educational",
        "children" => "children",
        "history" => "history",
        "philosophy" => "philosophy",
        "biography" => "biography",
        _ => FALLBACK_CATEGORY,
    }
}

/// Check whether a string names a known store category.
pub fn is_valid_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

// ── Pagination guards ────────────────────────────────────────────────

/// Clamp a caller-supplied limit into `1..=MAX_LIST_LIMIT`, applying the
/// default when absent.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Clamp a caller-supplied offset to be non-negative, defaulting to 0.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ── Validation ───────────────────────────────────────────────────────

/// Validate a book title for create/update.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Book title must not be empty".to_string(),
        ));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Book title must not exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a price field (must be finite and non-negative).
pub fn validate_price(price: f64) -> Result<(), CoreError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────
