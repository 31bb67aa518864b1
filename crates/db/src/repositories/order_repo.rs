//! Repository for orders and their status timelines.

use ataka_core::order::TimelineEntry;
use ataka_core::types::DbId;
use sqlx::PgPool;

use crate::models::order::{NewOrder, Order};

/// Column list for `orders` queries.
const COLUMNS: &str = "id, order_number, user_id, items, shipping_address, billing_address, \
     order_summary, payment_details, order_status, is_gift, gift_message, customer_notes, \
     admin_notes, timeline, created_at, updated_at";

/// Provides CRUD operations for orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert a fully-assembled order.
    pub async fn create(pool: &PgPool, input: &NewOrder) -> Result<Order, sqlx::Error> {
        let sql = format!(
            "INSERT INTO orders \
                (order_number, user_id, items, shipping_address, billing_address, \
                 order_summary, payment_details, order_status, is_gift, gift_message, \
                 customer_notes, timeline) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&sql)
            .bind(&input.order_number)
            .bind(input.user_id)
            .bind(&input.items)
            .bind(&input.shipping_address)
            .bind(&input.billing_address)
            .bind(&input.order_summary)
            .bind(&input.payment_details)
            .bind(&input.order_status)
            .bind(input.is_gift)
            .bind(&input.gift_message)
            .bind(&input.customer_notes)
            .bind(&input.timeline)
            .fetch_one(pool)
            .await
    }

    /// Find an order by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's orders, newest first, optionally filtered by status.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let filter = if status.is_some() {
            "AND order_status = $4"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {COLUMNS} FROM orders \
             WHERE user_id = $1 {filter} \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        let mut query = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset);
        if let Some(status) = status {
            query = query.bind(status);
        }
        query.fetch_all(pool).await
    }

    /// List all orders (the admin view), newest first, optionally
    /// filtered by status.
    pub async fn list_all(
        pool: &PgPool,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let filter = if status.is_some() {
            "WHERE order_status = $3"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {COLUMNS} FROM orders {filter} \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        );
        let mut query = sqlx::query_as::<_, Order>(&sql).bind(limit).bind(offset);
        if let Some(status) = status {
            query = query.bind(status);
        }
        query.fetch_all(pool).await
    }

    /// Transition an order's status, appending one timeline entry.
    ///
    /// The append uses JSONB concatenation so concurrent writers cannot
    /// drop each other's entries. An absent admin note keeps the stored
    /// one.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
        admin_notes: Option<&str>,
        entry: &TimelineEntry,
    ) -> Result<Option<Order>, sqlx::Error> {
        let entry_json = serde_json::to_value(entry).unwrap_or_default();
        let sql = format!(
            "UPDATE orders SET \
                order_status = $2, \
                timeline = timeline || $3::jsonb, \
                admin_notes = COALESCE($4, admin_notes), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(status)
            .bind(entry_json)
            .bind(admin_notes)
            .fetch_optional(pool)
            .await
    }

    /// Replace an order's payment details, appending one timeline entry
    /// and optionally transitioning the order status.
    pub async fn update_payment(
        pool: &PgPool,
        id: DbId,
        payment_details: &serde_json::Value,
        new_status: Option<&str>,
        entry: &TimelineEntry,
    ) -> Result<Option<Order>, sqlx::Error> {
        let entry_json = serde_json::to_value(entry).unwrap_or_default();
        let sql = format!(
            "UPDATE orders SET \
                payment_details = $2, \
                order_status = COALESCE($3, order_status), \
                timeline = timeline || $4::jsonb, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(payment_details)
            .bind(new_status)
            .bind(entry_json)
            .fetch_optional(pool)
            .await
    }
}
