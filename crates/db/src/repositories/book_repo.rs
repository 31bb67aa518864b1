//! Repository for the book catalog.

use ataka_core::import::BookDraft;
use ataka_core::types::DbId;
use sqlx::PgPool;

use crate::models::book::{Book, BookFilter, BookSort, CreateBook, ImportOutcome, UpdateBook};

/// Column list for `books` queries.
const COLUMNS: &str = "id, title, title_telugu, author, author_telugu, publisher, \
     publisher_telugu, isbn, price, original_price, discount, description, \
     description_telugu, image, images, category, category_telugu, pages, language, \
     dimensions, weight, publication_year, rating, review_count, in_stock, stock_count, \
     tags, featured, bestseller, new_arrival, sales_count, is_active, created_by, \
     woocommerce_id, import_source, import_date, created_at, updated_at";

/// Provides catalog queries and import upserts for books.
pub struct BookRepo;

impl BookRepo {
    /// List active books matching every provided filter.
    ///
    /// Title search is a case-insensitive substring match. Sorting is
    /// newest-first unless the filter asks for the bestsellers order.
    pub async fn list(pool: &PgPool, filter: &BookFilter) -> Result<Vec<Book>, sqlx::Error> {
        let (conditions, has_category, has_search) = Self::build_conditions(filter);

        let order_by = match filter.sort {
            BookSort::Newest => "created_at DESC",
            BookSort::BestSelling => "sales_count DESC",
        };

        let limit_param = conditions.next_param;
        let offset_param = conditions.next_param + 1;

        let sql = format!(
            "SELECT {COLUMNS} FROM books WHERE {} ORDER BY {order_by} \
             LIMIT ${limit_param} OFFSET ${offset_param}",
            conditions.clauses.join(" AND ")
        );

        let mut query = sqlx::query_as::<_, Book>(&sql);
        if has_category {
            query = query.bind(filter.category.as_deref().unwrap_or_default());
        }
        if has_search {
            query = query.bind(format!("%{}%", filter.search.as_deref().unwrap_or_default()));
        }
        query
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Count active books matching the filter (for listing totals).
    pub async fn count(pool: &PgPool, filter: &BookFilter) -> Result<i64, sqlx::Error> {
        let (conditions, has_category, has_search) = Self::build_conditions(filter);

        let sql = format!(
            "SELECT COUNT(*) FROM books WHERE {}",
            conditions.clauses.join(" AND ")
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if has_category {
            query = query.bind(filter.category.as_deref().unwrap_or_default());
        }
        if has_search {
            query = query.bind(format!("%{}%", filter.search.as_deref().unwrap_or_default()));
        }
        query.fetch_one(pool).await
    }

    /// Find a book by ID regardless of active flag.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Book>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a book from the admin API.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBook,
        created_by: DbId,
    ) -> Result<Book, sqlx::Error> {
        let stock_count = input.stock_count.unwrap_or(0);
        let sql = format!(
            "INSERT INTO books \
                (title, title_telugu, author, author_telugu, publisher, publisher_telugu, \
                 isbn, price, original_price, description, description_telugu, image, images, \
                 category, category_telugu, pages, language, stock_count, in_stock, \
                 featured, bestseller, new_arrival, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                     $16, $17, $18, $19, $20, $21, $22, $23) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(&input.title)
            .bind(&input.title_telugu)
            .bind(&input.author)
            .bind(&input.author_telugu)
            .bind(&input.publisher)
            .bind(&input.publisher_telugu)
            .bind(&input.isbn)
            .bind(input.price)
            .bind(input.original_price.unwrap_or(input.price))
            .bind(&input.description)
            .bind(&input.description_telugu)
            .bind(&input.image)
            .bind(serde_json::json!(input.images))
            .bind(&input.category)
            .bind(&input.category_telugu)
            .bind(input.pages.unwrap_or(ataka_core::import::DEFAULT_PAGES))
            .bind(
                input
                    .language
                    .as_deref()
                    .unwrap_or(ataka_core::import::DEFAULT_LANGUAGE),
            )
            .bind(stock_count)
            .bind(stock_count > 0)
            .bind(input.featured)
            .bind(input.bestseller)
            .bind(input.new_arrival)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update. Absent fields keep their current values.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBook,
    ) -> Result<Option<Book>, sqlx::Error> {
        let sql = format!(
            "UPDATE books SET \
                title = COALESCE($2, title), \
                title_telugu = COALESCE($3, title_telugu), \
                author = COALESCE($4, author), \
                author_telugu = COALESCE($5, author_telugu), \
                publisher = COALESCE($6, publisher), \
                isbn = COALESCE($7, isbn), \
                price = COALESCE($8, price), \
                original_price = COALESCE($9, original_price), \
                discount = COALESCE($10, discount), \
                description = COALESCE($11, description), \
                image = COALESCE($12, image), \
                category = COALESCE($13, category), \
                pages = COALESCE($14, pages), \
                stock_count = COALESCE($15, stock_count), \
                in_stock = COALESCE($15, stock_count) > 0, \
                featured = COALESCE($16, featured), \
                bestseller = COALESCE($17, bestseller), \
                new_arrival = COALESCE($18, new_arrival), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&input.title_telugu)
            .bind(&input.author)
            .bind(&input.author_telugu)
            .bind(&input.publisher)
            .bind(&input.isbn)
            .bind(input.price)
            .bind(input.original_price)
            .bind(input.discount)
            .bind(&input.description)
            .bind(&input.image)
            .bind(&input.category)
            .bind(input.pages)
            .bind(input.stock_count)
            .bind(input.featured)
            .bind(input.bestseller)
            .bind(input.new_arrival)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a book. Returns `true` if a row was deactivated.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE books SET is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Stock ────────────────────────────────────────────────────────

    /// Move `quantity` units of stock into sales in one atomic statement.
    ///
    /// Stock is clamped at zero; `in_stock` reflects the post-adjustment
    /// count. No read-then-write, so concurrent orders cannot double-apply
    /// a stale count.
    pub async fn adjust_stock(
        pool: &PgPool,
        id: DbId,
        quantity: i32,
    ) -> Result<Option<Book>, sqlx::Error> {
        let sql = format!(
            "UPDATE books SET \
                stock_count = GREATEST(stock_count - $2, 0), \
                sales_count = sales_count + $2, \
                in_stock = (stock_count - $2) > 0, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .bind(quantity)
            .fetch_optional(pool)
            .await
    }

    // ── Import ───────────────────────────────────────────────────────

    /// Find a book by its external WooCommerce id.
    pub async fn find_by_woocommerce_id(
        pool: &PgPool,
        woocommerce_id: i64,
    ) -> Result<Option<Book>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM books WHERE woocommerce_id = $1");
        sqlx::query_as::<_, Book>(&sql)
            .bind(woocommerce_id)
            .fetch_optional(pool)
            .await
    }

    /// Merge-candidate lookup for drafts with no external-id match:
    /// first by ISBN, then by exact (title, author) pair.
    pub async fn find_duplicate_candidate(
        pool: &PgPool,
        isbn: &str,
        title: &str,
        author: &str,
    ) -> Result<Option<Book>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM books \
             WHERE isbn = $1 OR (title = $2 AND author = $3) \
             ORDER BY (isbn = $1) DESC, id \
             LIMIT 1"
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(isbn)
            .bind(title)
            .bind(author)
            .fetch_optional(pool)
            .await
    }

    /// Import one transformed draft.
    ///
    /// The WooCommerce id is the canonical upsert key. A draft whose id is
    /// unknown is matched against existing rows by ISBN and (title, author)
    /// as an explicit merge step before falling through to an insert.
    pub async fn import_book(
        pool: &PgPool,
        draft: &BookDraft,
    ) -> Result<ImportOutcome, sqlx::Error> {
        if let Some(existing) = Self::find_by_woocommerce_id(pool, draft.woocommerce_id).await? {
            Self::update_from_draft(pool, existing.id, draft).await?;
            return Ok(ImportOutcome::Updated);
        }

        if let Some(existing) =
            Self::find_duplicate_candidate(pool, &draft.isbn, &draft.title, &draft.author).await?
        {
            Self::update_from_draft(pool, existing.id, draft).await?;
            return Ok(ImportOutcome::Updated);
        }

        Self::insert_from_draft(pool, draft).await?;
        Ok(ImportOutcome::Created)
    }

    /// Overwrite a book's catalog fields from an import draft.
    ///
    /// Operational fields accumulated locally (sales count, rating,
    /// reviews, bestseller/new-arrival flags) are deliberately left alone;
    /// the import owns the catalog data, not the store's history.
    async fn update_from_draft(
        pool: &PgPool,
        id: DbId,
        draft: &BookDraft,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE books SET \
                title = $2, title_telugu = $3, author = $4, author_telugu = $5, \
                publisher = $6, publisher_telugu = $7, isbn = $8, price = $9, \
                original_price = $10, discount = $11, description = $12, \
                description_telugu = $13, image = $14, images = $15, category = $16, \
                category_telugu = $17, pages = $18, language = $19, dimensions = $20, \
                weight = $21, publication_year = $22, in_stock = $23, stock_count = $24, \
                tags = $25, featured = $26, is_active = $27, woocommerce_id = $28, \
                import_source = $29, import_date = $30, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.title_telugu)
        .bind(&draft.author)
        .bind(&draft.author_telugu)
        .bind(&draft.publisher)
        .bind(&draft.publisher_telugu)
        .bind(&draft.isbn)
        .bind(draft.price)
        .bind(draft.original_price)
        .bind(draft.discount)
        .bind(&draft.description)
        .bind(&draft.description_telugu)
        .bind(&draft.image)
        .bind(serde_json::json!(draft.images))
        .bind(&draft.category)
        .bind(&draft.category_telugu)
        .bind(draft.pages)
        .bind(&draft.language)
        .bind(serde_json::to_value(&draft.dimensions).unwrap_or_default())
        .bind(draft.weight)
        .bind(draft.publication_year)
        .bind(draft.in_stock)
        .bind(draft.stock_count)
        .bind(serde_json::json!(draft.tags))
        .bind(draft.featured)
        .bind(draft.is_active)
        .bind(draft.woocommerce_id)
        .bind(&draft.import_source)
        .bind(draft.import_date)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Insert a brand-new book from an import draft.
    async fn insert_from_draft(pool: &PgPool, draft: &BookDraft) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO books \
                (title, title_telugu, author, author_telugu, publisher, publisher_telugu, \
                 isbn, price, original_price, discount, description, description_telugu, \
                 image, images, category, category_telugu, pages, language, dimensions, \
                 weight, publication_year, in_stock, stock_count, tags, featured, \
                 bestseller, new_arrival, is_active, created_by, woocommerce_id, \
                 import_source, import_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                     $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, \
                     $29, $30, $31, $32)",
        )
        .bind(&draft.title)
        .bind(&draft.title_telugu)
        .bind(&draft.author)
        .bind(&draft.author_telugu)
        .bind(&draft.publisher)
        .bind(&draft.publisher_telugu)
        .bind(&draft.isbn)
        .bind(draft.price)
        .bind(draft.original_price)
        .bind(draft.discount)
        .bind(&draft.description)
        .bind(&draft.description_telugu)
        .bind(&draft.image)
        .bind(serde_json::json!(draft.images))
        .bind(&draft.category)
        .bind(&draft.category_telugu)
        .bind(draft.pages)
        .bind(&draft.language)
        .bind(serde_json::to_value(&draft.dimensions).unwrap_or_default())
        .bind(draft.weight)
        .bind(draft.publication_year)
        .bind(draft.in_stock)
        .bind(draft.stock_count)
        .bind(serde_json::json!(draft.tags))
        .bind(draft.featured)
        .bind(draft.bestseller)
        .bind(draft.new_arrival)
        .bind(draft.is_active)
        .bind(draft.created_by)
        .bind(draft.woocommerce_id)
        .bind(&draft.import_source)
        .bind(draft.import_date)
        .execute(pool)
        .await?;
        Ok(())
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Assemble the WHERE clauses for a filter, numbering bind parameters
    /// in the order `list`/`count` bind them (category, then search).
    fn build_conditions(filter: &BookFilter) -> (Conditions, bool, bool) {
        let mut clauses = vec!["is_active = TRUE".to_string()];
        let mut next_param = 1;

        let has_category = filter.category.is_some();
        if has_category {
            clauses.push(format!("category = ${next_param}"));
            next_param += 1;
        }

        let has_search = filter.search.is_some();
        if has_search {
            clauses.push(format!("title ILIKE ${next_param}"));
            next_param += 1;
        }

        if filter.featured {
            clauses.push("featured = TRUE".to_string());
        }
        if filter.bestseller {
            clauses.push("bestseller = TRUE".to_string());
        }
        if filter.new_arrival {
            clauses.push("new_arrival = TRUE".to_string());
        }

        (
            Conditions {
                clauses,
                next_param,
            },
            has_category,
            has_search,
        )
    }
}

/// WHERE clauses plus the next free bind-parameter index.
struct Conditions {
    clauses: Vec<String>,
    next_param: usize,
}
