//! Handlers for the WooCommerce catalog import pipeline (admin only).
//!
//! Four endpoints: connectivity probe, product preview fetch, import
//! start, and progress polling. The heavy lifting happens in
//! `crate::import::worker`; these handlers validate input, allocate the
//! session, and report its state.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use ataka_core::error::CoreError;
use ataka_core::import::{ImportItem, ImportSession, WooProduct};
use ataka_woo::{WooClient, WooCredentials};

use crate::error::{AppError, AppResult};
use crate::import::worker::ImportWorker;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ── Request structs ──────────────────────────────────────────────────

/// Reference to one product selected for import (id plus preview name).
#[derive(Debug, Deserialize)]
pub struct ImportProductRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Request body for starting an import.
#[derive(Debug, Deserialize)]
pub struct StartImportRequest {
    pub config: WooCredentials,
    pub products: Vec<ImportProductRef>,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StoreInfo {
    pub url: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TestConnectionData {
    pub total_products: i64,
    pub store_info: StoreInfo,
}

/// Preview-shaped subset of a product listing entry.
#[derive(Debug, Serialize)]
pub struct ProductPreview {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub short_description: String,
    pub images: Vec<String>,
    pub categories: Vec<String>,
    pub stock_status: Option<String>,
    pub stock_quantity: Option<i64>,
}

impl ProductPreview {
    fn from_product(product: &WooProduct) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product
                .price
                .clone()
                .or_else(|| product.regular_price.clone())
                .unwrap_or_else(|| "0".to_string()),
            short_description: product.short_description.clone(),
            images: product.images.iter().map(|img| img.src.clone()).collect(),
            categories: product.categories.iter().map(|c| c.name.clone()).collect(),
            stock_status: product.stock_status.clone(),
            stock_quantity: product.stock_quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FetchProductsData {
    pub products: Vec<ProductPreview>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct StartImportData {
    pub import_id: String,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ImportStats {
    pub total: usize,
    pub success: usize,
    pub errors: usize,
    pub pending: usize,
}

#[derive(Debug, Serialize)]
pub struct ImportProgressData {
    /// Percent complete, 0-100.
    pub progress: u8,
    pub products: Vec<ImportItem>,
    pub stats: ImportStats,
}

// ── Helpers ──────────────────────────────────────────────────────────

fn validate_credentials(credentials: &WooCredentials) -> AppResult<()> {
    if credentials.site_url.is_empty()
        || credentials.consumer_key.is_empty()
        || credentials.consumer_secret.is_empty()
    {
        return Err(AppError::Core(CoreError::Validation(
            "Site URL, Consumer Key, and Consumer Secret are required".into(),
        )));
    }
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────

/// POST /import/test-connection (admin)
///
/// Probe the store with the supplied credentials. Persists nothing.
pub async fn test_connection(
    auth: AuthUser,
    State(_state): State<AppState>,
    Json(credentials): Json<WooCredentials>,
) -> AppResult<Json<ApiResponse<TestConnectionData>>> {
    auth.require_admin()?;
    validate_credentials(&credentials)?;

    let site_url = credentials.site_url.clone();
    let status = WooClient::new(credentials).test_connection().await?;

    tracing::info!(site_url = %site_url, "WooCommerce connection successful");

    Ok(Json(ApiResponse::with_message(
        TestConnectionData {
            total_products: status.total_products,
            store_info: StoreInfo {
                url: site_url,
                status: "connected",
            },
        },
        "Connection successful",
    )))
}

/// POST /import/fetch-products (admin)
///
/// Walk the store's product listing page by page and return the
/// flattened preview. The page walk is lazy with a hard ceiling; only
/// the preview subset is buffered.
pub async fn fetch_products(
    auth: AuthUser,
    State(_state): State<AppState>,
    Json(credentials): Json<WooCredentials>,
) -> AppResult<Json<ApiResponse<FetchProductsData>>> {
    auth.require_admin()?;
    validate_credentials(&credentials)?;

    let client = WooClient::new(credentials);
    let mut pages = client.product_pages();

    let mut previews: Vec<ProductPreview> = Vec::new();
    while let Some(page) = pages.next_page().await? {
        previews.extend(page.iter().map(ProductPreview::from_product));
    }

    let total = previews.len();
    tracing::info!(total, "Fetched products from WooCommerce");

    Ok(Json(ApiResponse::with_message(
        FetchProductsData {
            products: previews,
            total,
        },
        format!("Fetched {total} products"),
    )))
}

/// POST /import/products (admin)
///
/// Allocate an import session, return its id immediately, and hand the
/// item list to a background worker.
pub async fn start_import(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<StartImportRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<StartImportData>>)> {
    auth.require_admin()?;
    validate_credentials(&input.config)?;

    let import_id = format!("imp_{}", uuid::Uuid::new_v4().simple());
    let products: Vec<(i64, String)> = input
        .products
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    let total = products.len();

    let session = ImportSession::new(import_id.clone(), products, chrono::Utc::now());
    state.import_sessions.create(session);

    ImportWorker::new(
        state.pool.clone(),
        Arc::clone(&state.import_sessions),
        WooClient::new(input.config),
        import_id.clone(),
        auth.user_id,
    )
    .spawn(CancellationToken::new());

    tracing::info!(
        user_id = auth.user_id,
        import_id = %import_id,
        total,
        "Import started",
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::with_message(
            StartImportData { import_id, total },
            "Import started",
        )),
    ))
}

/// GET /import/progress/{import_id} (admin)
///
/// Best-known progress for a session. An expired session and one that
/// never existed are indistinguishable: both are a 404.
pub async fn import_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(import_id): Path<String>,
) -> AppResult<Json<ApiResponse<ImportProgressData>>> {
    auth.require_admin()?;

    let session = state
        .import_sessions
        .get(&import_id)
        .ok_or_else(|| AppError::NotFound("Import session not found".into()))?;

    Ok(Json(ApiResponse::data(ImportProgressData {
        progress: session.progress_percent(),
        stats: ImportStats {
            total: session.total,
            success: session.succeeded,
            errors: session.failed,
            pending: session.pending_count(),
        },
        products: session.items,
    })))
}
