//! Core types and pure logic for the WooCommerce catalog import pipeline.
//!
//! This module has zero external dependencies (no DB, no async, no I/O).
//! It provides:
//!
//! - The WooCommerce product wire types as deserialized by the `woo` crate.
//! - The deterministic product-to-book transform (bilingual field
//!   extraction, HTML stripping, category mapping, discount math).
//! - Import session and per-item state tracking with one-way transitions.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::map_woo_category;
use crate::types::{DbId, Timestamp};

// ── Constants ────────────────────────────────────────────────────────

/// Provenance tag stamped on every imported book.
pub const IMPORT_SOURCE_WOOCOMMERCE: &str = "woocommerce";

/// Pause between items in the import worker loop, throttling calls
/// against the external API. Fixed, not adaptive.
pub const INTER_ITEM_DELAY_MS: u64 = 100;

/// How long a finished session stays queryable before it is swept.
pub const SESSION_RETENTION_SECS: u64 = 3600;

/// Defaults applied when the external record omits a numeric field.
pub const DEFAULT_PAGES: i32 = 100;
pub const DEFAULT_LANGUAGE: &str = "Telugu";

/// Matches one run of Telugu-script characters (U+0C00..U+0C7F).
static TELUGU_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ఀ-౿]+").expect("valid regex"));

/// Matches an HTML tag for description cleanup.
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

// ── External product wire types ──────────────────────────────────────

/// A product record as returned by the WooCommerce REST v3 API.
///
/// Fields default aggressively: stores in the wild omit or null most of
/// them, and a missing field must never fail the whole import item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WooProduct {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub regular_price: Option<String>,
    #[serde(default)]
    pub sale_price: Option<String>,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<WooImage>,
    #[serde(default)]
    pub categories: Vec<WooTerm>,
    #[serde(default)]
    pub attributes: Vec<WooAttribute>,
    #[serde(default)]
    pub tags: Vec<WooTerm>,
    #[serde(default)]
    pub meta_data: Vec<WooMeta>,
    #[serde(default)]
    pub stock_status: Option<String>,
    #[serde(default)]
    pub manage_stock: bool,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub dimensions: Option<WooDimensions>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooImage {
    #[serde(default)]
    pub src: String,
}

/// A taxonomy term (category or tag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooTerm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooAttribute {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// A free-form metadata key/value pair. Values are arbitrary JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WooMeta {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WooDimensions {
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub width: String,
    #[serde(default)]
    pub height: String,
}

// ── Transformed book draft ───────────────────────────────────────────

/// Physical dimensions in centimetres, stored as JSON on the book row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookDimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// The internal book record produced by [`transform_product`], ready for
/// the repository upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDraft {
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
    pub images: Vec<String>,
    pub category: String,
    pub category_telugu: String,
    pub pages: i32,
    pub language: String,
    pub dimensions: BookDimensions,
    pub weight: f64,
    pub publication_year: i32,
    pub in_stock: bool,
    pub stock_count: i32,
    pub tags: Vec<String>,
    pub featured: bool,
    pub bestseller: bool,
    pub new_arrival: bool,
    pub is_active: bool,
    pub created_by: DbId,
    pub woocommerce_id: i64,
    pub import_source: String,
    pub import_date: Timestamp,
}

// ── Pure helpers ─────────────────────────────────────────────────────

/// Extract the Telugu-script portions of a string, joining separate runs
/// with a single space. Returns an empty string when none are present.
pub fn extract_telugu(text: &str) -> String {
    TELUGU_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip HTML tags from a description and trim surrounding whitespace.
pub fn strip_html(html: &str) -> String {
    HTML_TAG.replace_all(html, "").trim().to_string()
}

/// Discount percentage from a regular and sale price.
///
/// Zero when there is no sale price, the regular price is missing or
/// zero, or the "sale" is not actually cheaper.
pub fn discount_percent(regular: Option<f64>, sale: Option<f64>) -> i32 {
    match (regular, sale) {
        (Some(reg), Some(sale)) if reg > 0.0 && sale < reg => {
            (((reg - sale) / reg) * 100.0).round() as i32
        }
        _ => 0,
    }
}

/// Percent-complete for a session, rounded to the nearest integer.
///
/// An empty session (`total == 0`) has nothing left to process and
/// reports 100, never a division by zero.
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed as f64 / total as f64) * 100.0).round() as u8
}

/// Flatten a product's metadata list into a string lookup.
///
/// Non-string values are kept via their JSON display form, matching how
/// stores abuse meta fields for numbers.
pub fn meta_lookup(product: &WooProduct) -> HashMap<String, String> {
    product
        .meta_data
        .iter()
        .map(|meta| {
            let value = match &meta.value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (meta.key.clone(), value)
        })
        .collect()
}

/// Flatten a product's attribute list into name -> first option.
pub fn attribute_lookup(product: &WooProduct) -> HashMap<String, String> {
    product
        .attributes
        .iter()
        .filter_map(|attr| {
            attr.options
                .first()
                .map(|opt| (attr.name.clone(), opt.clone()))
        })
        .collect()
}

fn parse_price(value: &Option<String>) -> Option<f64> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

/// Transform one WooCommerce product into an internal book draft.
///
/// Deterministic: the same product, user, and timestamp always yield the
/// same draft. The timestamp feeds the import-date stamp and the
/// publication-year default; the caller supplies it.
pub fn transform_product(product: &WooProduct, created_by: DbId, now: Timestamp) -> BookDraft {
    let meta = meta_lookup(product);
    let attrs = attribute_lookup(product);

    let lookup = |meta_key: &str, attr_key: &str| -> Option<String> {
        meta.get(meta_key)
            .or_else(|| attrs.get(attr_key))
            .filter(|v| !v.is_empty())
            .cloned()
    };

    let price = parse_price(&product.price)
        .or_else(|| parse_price(&product.regular_price))
        .unwrap_or(0.0);
    let original_price = parse_price(&product.regular_price)
        .or_else(|| parse_price(&product.price))
        .unwrap_or(0.0);
    let discount = discount_percent(
        parse_price(&product.regular_price),
        parse_price(&product.sale_price),
    );

    let author = lookup("_author", "Author").unwrap_or_else(|| "Unknown Author".to_string());
    let publisher =
        lookup("_publisher", "Publisher").unwrap_or_else(|| "Unknown Publisher".to_string());

    let description = strip_html(&product.description);
    let description_telugu = non_empty(extract_telugu(&description))
        .or_else(|| meta.get("_description_telugu").cloned())
        .unwrap_or_default();

    let primary_category = product
        .categories
        .first()
        .map(|term| term.name.as_str())
        .unwrap_or(crate::catalog::FALLBACK_CATEGORY);

    let dims = product.dimensions.clone().unwrap_or_default();
    let parse_dim = |value: &str| value.trim().parse().unwrap_or(0.0);

    BookDraft {
        title: product.name.clone(),
        title_telugu: non_empty(extract_telugu(&product.name))
            .or_else(|| meta.get("_title_telugu").cloned())
            .unwrap_or_default(),
        author_telugu: meta
            .get("_author_telugu")
            .cloned()
            .or_else(|| non_empty(extract_telugu(&author)))
            .unwrap_or_default(),
        author,
        publisher_telugu: meta
            .get("_publisher_telugu")
            .cloned()
            .or_else(|| non_empty(extract_telugu(&publisher)))
            .unwrap_or_default(),
        publisher,
        isbn: meta
            .get("_isbn")
            .or_else(|| meta.get("isbn"))
            .cloned()
            .unwrap_or_else(|| format!("WOO-{}", product.id)),
        price,
        original_price,
        discount,
        description,
        description_telugu,
        image: product
            .images
            .first()
            .map(|img| img.src.clone())
            .unwrap_or_default(),
        images: product.images.iter().map(|img| img.src.clone()).collect(),
        category: map_woo_category(primary_category).to_string(),
        category_telugu: meta.get("_category_telugu").cloned().unwrap_or_default(),
        pages: lookup("_pages", "Pages")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PAGES),
        language: lookup("_language", "Language").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        dimensions: BookDimensions {
            length: parse_dim(&dims.length),
            width: parse_dim(&dims.width),
            height: parse_dim(&dims.height),
        },
        weight: product
            .weight
            .as_deref()
            .and_then(|w| w.trim().parse().ok())
            .unwrap_or(0.0),
        publication_year: meta
            .get("_publication_year")
            .or_else(|| meta.get("year"))
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| {
                use chrono::Datelike;
                now.year()
            }),
        in_stock: product.stock_status.as_deref() == Some("instock"),
        stock_count: product.stock_quantity.unwrap_or(0).max(0) as i32,
        tags: product.tags.iter().map(|tag| tag.name.clone()).collect(),
        featured: product.featured,
        bestseller: false,
        new_arrival: false,
        is_active: product.status.as_deref() == Some("publish"),
        created_by,
        woocommerce_id: product.id,
        import_source: IMPORT_SOURCE_WOOCOMMERCE.to_string(),
        import_date: now,
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

// ── Import session tracking ──────────────────────────────────────────

/// Per-item import state. Transitions are one-way:
/// `pending -> importing -> {success | error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportItemStatus {
    Pending,
    Importing,
    Success,
    Error,
}

impl ImportItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Importing => "importing",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Whether this status may move to `next` without regressing.
    fn may_become(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Importing)
                | (Self::Importing, Self::Success)
                | (Self::Importing, Self::Error)
        )
    }
}

/// One queued product in an import session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportItem {
    /// External product id this item refers to.
    pub woocommerce_id: i64,
    /// Product name from the preview, for the progress UI.
    pub name: String,
    pub status: ImportItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One tracked run of the catalog import pipeline.
///
/// Counters are monotonically increasing and maintain
/// `processed == succeeded + failed` between worker steps. There is no
/// explicit "complete" flag; callers infer completion from
/// `processed == total`.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSession {
    pub id: String,
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<ImportItem>,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

impl ImportSession {
    /// Allocate a session with every item pending.
    pub fn new(id: String, products: Vec<(i64, String)>, started_at: Timestamp) -> Self {
        let items: Vec<ImportItem> = products
            .into_iter()
            .map(|(woocommerce_id, name)| ImportItem {
                woocommerce_id,
                name,
                status: ImportItemStatus::Pending,
                error: None,
            })
            .collect();
        Self {
            id,
            total: items.len(),
            processed: 0,
            succeeded: 0,
            failed: 0,
            items,
            started_at,
            finished_at: None,
        }
    }

    /// Mark an item as currently importing. Regressions are ignored.
    pub fn mark_importing(&mut self, index: usize) {
        self.transition(index, ImportItemStatus::Importing, None);
    }

    /// Record a successful item and bump the counters.
    pub fn record_success(&mut self, index: usize) {
        if self.transition(index, ImportItemStatus::Success, None) {
            self.succeeded += 1;
            self.processed += 1;
        }
    }

    /// Record a failed item with its error message and bump the counters.
    pub fn record_error(&mut self, index: usize, message: String) {
        if self.transition(index, ImportItemStatus::Error, Some(message)) {
            self.failed += 1;
            self.processed += 1;
        }
    }

    /// Percent-complete, rounded. Empty sessions report 100.
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.processed, self.total)
    }

    /// Whether every item has reached a terminal state.
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }

    /// Items not yet in a terminal state.
    pub fn pending_count(&self) -> usize {
        self.total - self.processed
    }

    fn transition(
        &mut self,
        index: usize,
        next: ImportItemStatus,
        error: Option<String>,
    ) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        if !item.status.may_become(&next) {
            return false;
        }
        item.status = next;
        if error.is_some() {
            item.error = error;
        }
        true
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> WooProduct {
        WooProduct {
            id: 42,
            name: "Mahaprasthanam మహాప్రస్థానం".to_string(),
            price: Some("400".to_string()),
            regular_price: Some("500".to_string()),
            sale_price: Some("400".to_string()),
            description: "<p>Sri Sri's <b>landmark</b> poetry collection.</p>".to_string(),
            images: vec![
                WooImage {
                    src: "https://cdn.example.com/maha-front.jpg".to_string(),
                },
                WooImage {
                    src: "https://cdn.example.com/maha-back.jpg".to_string(),
                },
            ],
            categories: vec![WooTerm {
                name: "Poetry".to_string(),
            }],
            attributes: vec![WooAttribute {
                name: "Author".to_string(),
                options: vec!["Sri Sri".to_string()],
            }],
            tags: vec![WooTerm {
                name: "classic".to_string(),
            }],
            meta_data: vec![
                WooMeta {
                    key: "_publisher".to_string(),
                    value: serde_json::json!("Visalaandhra"),
                },
                WooMeta {
                    key: "_pages".to_string(),
                    value: serde_json::json!("120"),
                },
            ],
            stock_status: Some("instock".to_string()),
            stock_quantity: Some(12),
            status: Some("publish".to_string()),
            featured: true,
            ..Default::default()
        }
    }

    fn now() -> Timestamp {
        "2025-06-01T10:00:00Z".parse().unwrap()
    }

    // -- extract_telugu --

    #[test]
    fn telugu_runs_extracted_and_joined() {
        assert_eq!(extract_telugu("మహాప్రస్థానం by Sri Sri"), "మహాప్రస్థానం");
        assert_eq!(extract_telugu("అమరావతి and కథలు"), "అమరావతి కథలు");
    }

    #[test]
    fn no_telugu_yields_empty() {
        assert_eq!(extract_telugu("Plain English"), "");
        assert_eq!(extract_telugu(""), "");
    }

    // -- strip_html --

    #[test]
    fn tags_stripped_and_trimmed() {
        assert_eq!(
            strip_html("<p>Hello <b>world</b></p>  "),
            "Hello world"
        );
        assert_eq!(strip_html("no tags"), "no tags");
        assert_eq!(strip_html(""), "");
    }

    // -- discount_percent --

    #[test]
    fn discount_from_sale_price() {
        assert_eq!(discount_percent(Some(500.0), Some(400.0)), 20);
        assert_eq!(discount_percent(Some(300.0), Some(200.0)), 33);
    }

    #[test]
    fn no_sale_price_means_no_discount() {
        assert_eq!(discount_percent(Some(500.0), None), 0);
        assert_eq!(discount_percent(None, Some(400.0)), 0);
        assert_eq!(discount_percent(Some(0.0), Some(0.0)), 0);
    }

    #[test]
    fn sale_above_regular_means_no_discount() {
        assert_eq!(discount_percent(Some(400.0), Some(500.0)), 0);
    }

    // -- progress_percent --

    #[test]
    fn progress_rounds_to_nearest() {
        assert_eq!(progress_percent(3, 10), 30);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(10, 10), 100);
    }

    #[test]
    fn empty_total_is_defined() {
        // Never NaN or a panic: an empty import is already complete.
        assert_eq!(progress_percent(0, 0), 100);
    }

    // -- transform_product --

    #[test]
    fn transform_maps_core_fields() {
        let draft = transform_product(&sample_product(), 7, now());

        assert_eq!(draft.title, "Mahaprasthanam మహాప్రస్థానం");
        assert_eq!(draft.title_telugu, "మహాప్రస్థానం");
        assert_eq!(draft.author, "Sri Sri");
        assert_eq!(draft.publisher, "Visalaandhra");
        assert_eq!(draft.isbn, "WOO-42");
        assert_eq!(draft.price, 400.0);
        assert_eq!(draft.original_price, 500.0);
        assert_eq!(draft.discount, 20);
        assert_eq!(draft.description, "Sri Sri's landmark poetry collection.");
        assert_eq!(draft.category, "poetry");
        assert_eq!(draft.pages, 120);
        assert_eq!(draft.image, "https://cdn.example.com/maha-front.jpg");
        assert_eq!(draft.images.len(), 2);
        assert!(draft.in_stock);
        assert_eq!(draft.stock_count, 12);
        assert!(draft.featured);
        assert!(draft.is_active);
        assert_eq!(draft.created_by, 7);
        assert_eq!(draft.woocommerce_id, 42);
        assert_eq!(draft.import_source, IMPORT_SOURCE_WOOCOMMERCE);
    }

    #[test]
    fn transform_is_deterministic() {
        let product = sample_product();
        let a = transform_product(&product, 7, now());
        let b = transform_product(&product, 7, now());
        assert_eq!(serde_json::to_value(&a).unwrap(), serde_json::to_value(&b).unwrap());
    }

    #[test]
    fn transform_defaults_for_sparse_product() {
        let product = WooProduct {
            id: 9,
            name: "Bare".to_string(),
            ..Default::default()
        };
        let draft = transform_product(&product, 1, now());

        assert_eq!(draft.author, "Unknown Author");
        assert_eq!(draft.publisher, "Unknown Publisher");
        assert_eq!(draft.isbn, "WOO-9");
        assert_eq!(draft.price, 0.0);
        assert_eq!(draft.pages, DEFAULT_PAGES);
        assert_eq!(draft.language, DEFAULT_LANGUAGE);
        assert_eq!(draft.publication_year, 2025);
        assert_eq!(draft.category, crate::catalog::FALLBACK_CATEGORY);
        assert!(!draft.in_stock);
        assert!(!draft.is_active);
    }

    #[test]
    fn unmapped_category_falls_back() {
        let mut product = sample_product();
        product.categories = vec![WooTerm {
            name: "Cookbooks".to_string(),
        }];
        let draft = transform_product(&product, 1, now());
        assert_eq!(draft.category, "literature");
    }

    // -- session state machine --

    fn session() -> ImportSession {
        ImportSession::new(
            "imp-1".to_string(),
            vec![(1, "One".to_string()), (2, "Two".to_string())],
            now(),
        )
    }

    #[test]
    fn new_session_starts_all_pending() {
        let s = session();
        assert_eq!(s.total, 2);
        assert_eq!(s.processed, 0);
        assert!(s
            .items
            .iter()
            .all(|i| i.status == ImportItemStatus::Pending));
    }

    #[test]
    fn counters_stay_consistent_through_mixed_outcomes() {
        let mut s = session();

        s.mark_importing(0);
        s.record_success(0);
        assert_eq!((s.processed, s.succeeded, s.failed), (1, 1, 0));

        s.mark_importing(1);
        s.record_error(1, "fetch failed".to_string());
        assert_eq!((s.processed, s.succeeded, s.failed), (2, 1, 1));

        assert_eq!(s.processed, s.succeeded + s.failed);
        assert!(s.processed <= s.total);
        assert!(s.is_complete());
        assert_eq!(s.items[1].error.as_deref(), Some("fetch failed"));
    }

    #[test]
    fn items_never_regress() {
        let mut s = session();
        s.mark_importing(0);
        s.record_success(0);

        // A late error for an already-successful item must be a no-op.
        s.record_error(0, "late failure".to_string());
        assert_eq!(s.items[0].status, ImportItemStatus::Success);
        assert_eq!((s.processed, s.succeeded, s.failed), (1, 1, 0));

        // Skipping the importing step is also rejected.
        let mut s2 = session();
        s2.record_success(0);
        assert_eq!(s2.items[0].status, ImportItemStatus::Pending);
        assert_eq!(s2.processed, 0);
    }

    #[test]
    fn out_of_range_index_ignored() {
        let mut s = session();
        s.mark_importing(99);
        s.record_success(99);
        assert_eq!(s.processed, 0);
    }

    #[test]
    fn empty_session_reports_complete() {
        let s = ImportSession::new("imp-0".to_string(), vec![], now());
        assert_eq!(s.total, 0);
        assert!(s.is_complete());
        assert_eq!(s.progress_percent(), 100);
    }
}
