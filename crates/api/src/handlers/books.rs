//! Handlers for the book catalog: browsing, search, curated shelves, and
//! the admin CRUD surface.

use ataka_core::catalog::{self, clamp_limit, clamp_offset, DEFAULT_SHELF_LIMIT};
use ataka_core::error::CoreError;
use ataka_core::types::DbId;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use ataka_db::models::book::{Book, BookFilter, BookSort, CreateBook, UpdateBook};
use ataka_db::repositories::BookRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::ApiResponse;
use crate::state::AppState;

// ── Query parameter structs ──────────────────────────────────────────

/// Query parameters for the main listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListBooksParams {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub bestseller: bool,
    #[serde(default)]
    pub new_arrival: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for search and shelf endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ShelfParams {
    pub limit: Option<i64>,
}

// ── Response types ───────────────────────────────────────────────────

/// A listing page plus the total match count.
#[derive(Debug, Serialize)]
pub struct BookListData {
    pub books: Vec<Book>,
    pub total: i64,
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Fetch a page and the total for a filter in one call.
async fn list_with_total(
    pool: &sqlx::PgPool,
    filter: &BookFilter,
) -> AppResult<Json<ApiResponse<BookListData>>> {
    let books = BookRepo::list(pool, filter).await?;
    let total = BookRepo::count(pool, filter).await?;
    Ok(Json(ApiResponse::data(BookListData { books, total })))
}

async fn ensure_book_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Book> {
    BookRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Book", id }))
}

// ── Browsing handlers ────────────────────────────────────────────────

/// GET /books
///
/// List active books, newest first, filtered by any combination of
/// category, title search, and marketing flags.
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<ListBooksParams>,
) -> AppResult<Json<ApiResponse<BookListData>>> {
    let filter = BookFilter {
        category: params.category,
        search: params.search,
        featured: params.featured,
        bestseller: params.bestseller,
        new_arrival: params.new_arrival,
        sort: BookSort::Newest,
        limit: clamp_limit(params.limit),
        offset: clamp_offset(params.offset),
    };
    list_with_total(&state.pool, &filter).await
}

/// GET /books/{id}
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Book>>> {
    let book = ensure_book_exists(&state.pool, id).await?;
    Ok(Json(ApiResponse::data(book)))
}

/// GET /books/search?search=
///
/// Title search over active books.
pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<ApiResponse<BookListData>>> {
    let filter = BookFilter {
        search: params.search,
        limit: clamp_limit(params.limit),
        ..Default::default()
    };
    list_with_total(&state.pool, &filter).await
}

/// GET /books/featured
pub async fn featured_books(
    State(state): State<AppState>,
    Query(params): Query<ShelfParams>,
) -> AppResult<Json<ApiResponse<BookListData>>> {
    let filter = BookFilter {
        featured: true,
        sort: BookSort::Newest,
        limit: params.limit.unwrap_or(DEFAULT_SHELF_LIMIT).clamp(1, 100),
        ..Default::default()
    };
    list_with_total(&state.pool, &filter).await
}

/// GET /books/bestsellers
///
/// The bestsellers shelf sorts by descending sales count rather than
/// recency.
pub async fn bestseller_books(
    State(state): State<AppState>,
    Query(params): Query<ShelfParams>,
) -> AppResult<Json<ApiResponse<BookListData>>> {
    let filter = BookFilter {
        bestseller: true,
        sort: BookSort::BestSelling,
        limit: params.limit.unwrap_or(DEFAULT_SHELF_LIMIT).clamp(1, 100),
        ..Default::default()
    };
    list_with_total(&state.pool, &filter).await
}

/// GET /books/category/{category}
pub async fn books_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<BookListData>>> {
    if !catalog::is_valid_category(&category) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown category: \"{category}\""
        ))));
    }
    let filter = BookFilter {
        category: Some(category),
        sort: BookSort::Newest,
        limit: clamp_limit(params.limit),
        offset: clamp_offset(params.offset),
        ..Default::default()
    };
    list_with_total(&state.pool, &filter).await
}

// ── Admin handlers ───────────────────────────────────────────────────

/// POST /books (admin)
pub async fn create_book(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<ApiResponse<Book>>)> {
    auth.require_admin()?;

    catalog::validate_title(&input.title)?;
    catalog::validate_price(input.price)?;
    if !catalog::is_valid_category(&input.category) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown category: \"{}\"",
            input.category
        ))));
    }

    let book = BookRepo::create(&state.pool, &input, auth.user_id).await?;

    tracing::info!(user_id = auth.user_id, book_id = book.id, "Book created");

    Ok((StatusCode::CREATED, Json(ApiResponse::data(book))))
}

/// PUT /books/{id} (admin)
pub async fn update_book(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBook>,
) -> AppResult<Json<ApiResponse<Book>>> {
    auth.require_admin()?;

    if let Some(ref title) = input.title {
        catalog::validate_title(title)?;
    }
    if let Some(price) = input.price {
        catalog::validate_price(price)?;
    }
    if let Some(ref category) = input.category {
        if !catalog::is_valid_category(category) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown category: \"{category}\""
            ))));
        }
    }

    let book = BookRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Book", id }))?;

    Ok(Json(ApiResponse::data(book)))
}

/// DELETE /books/{id} (admin)
///
/// Soft delete: the book is deactivated, not removed, so past orders keep
/// a valid reference.
pub async fn delete_book(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    auth.require_admin()?;

    if !BookRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Book", id }));
    }

    tracing::info!(user_id = auth.user_id, book_id = id, "Book deactivated");

    Ok(Json(ApiResponse::message("Book deleted successfully")))
}
