//! Models for the book catalog.
//!
//! Covers the `books` row type, create/update DTOs for the admin CRUD
//! surface, and the filter set accepted by listing queries.

use ataka_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ── Books ────────────────────────────────────────────────────────────

/// A row from the `books` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub title_telugu: String,
    pub author: String,
    pub author_telugu: String,
    pub publisher: String,
    pub publisher_telugu: String,
    pub isbn: String,
    pub price: f64,
    pub original_price: f64,
    pub discount: i32,
    pub description: String,
    pub description_telugu: String,
    pub image: String,
    pub images: serde_json::Value,
    pub category: String,
    pub category_telugu: String,
    pub pages: i32,
    pub language: String,
    pub dimensions: serde_json::Value,
    pub weight: f64,
    pub publication_year: Option<i32>,
    pub rating: f64,
    pub review_count: i32,
    pub in_stock: bool,
    pub stock_count: i32,
    pub tags: serde_json::Value,
    pub featured: bool,
    pub bestseller: bool,
    pub new_arrival: bool,
    pub sales_count: i32,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub woocommerce_id: Option<i64>,
    pub import_source: Option<String>,
    pub import_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a book through the admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub title: String,
    #[serde(default)]
    pub title_telugu: String,
    pub author: String,
    #[serde(default)]
    pub author_telugu: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub publisher_telugu: String,
    #[serde(default)]
    pub isbn: String,
    pub price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_telugu: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub category_telugu: String,
    #[serde(default)]
    pub pages: Option<i32>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stock_count: Option<i32>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub bestseller: bool,
    #[serde(default)]
    pub new_arrival: bool,
}

/// DTO for a partial book update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub title_telugu: Option<String>,
    pub author: Option<String>,
    pub author_telugu: Option<String>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub discount: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub pages: Option<i32>,
    pub stock_count: Option<i32>,
    pub featured: Option<bool>,
    pub bestseller: Option<bool>,
    pub new_arrival: Option<bool>,
}

// ── Listing filters ──────────────────────────────────────────────────

/// Sort order for book listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSort {
    /// Newest first (the default for browsing).
    #[default]
    Newest,
    /// Descending sales count (the bestsellers shelf).
    BestSelling,
}

/// Filter set for listing queries. Absence of a field means
/// "no constraint", not "match empty".
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub category: Option<String>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    pub featured: bool,
    pub bestseller: bool,
    pub new_arrival: bool,
    pub sort: BookSort,
    pub limit: i64,
    pub offset: i64,
}

/// Outcome of importing one book draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Created,
    Updated,
}
