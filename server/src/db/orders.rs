//! Order and order-item persistence
//!
//! `create` is the one multi-write path in the system: an order row plus
//! all of its items. The item insert is a single statement, and a
//! failure after the order row was written triggers a compensating
//! delete so no zero-item pending order survives.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Order, OrderItem, OrderStatus, Payment, Restaurant, Table};
use sqlx::PgPool;
use uuid::Uuid;

/// Validated input for order creation. Monetary figures are computed by
/// the caller (cart) and persisted verbatim.
#[derive(Debug)]
pub struct NewOrder<'a> {
    pub restaurant_id: Uuid,
    pub table_id: Uuid,
    pub items: &'a [NewOrderItem],
    pub special_instructions: Option<&'a str>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub menu_item_id: Option<Uuid>,
    pub item_name: String,
    pub quantity: i32,
    pub price_at_time: Decimal,
    pub special_instructions: Option<String>,
}

/// Order with its line items, table, and restaurant
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub table: Table,
    pub restaurant: Restaurant,
}

/// Order with items and payments, as served to POS/admin listings
#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
}

/// Persist an order and all of its items; returns the new order id.
///
/// The items land in one multi-row INSERT (UNNEST), so they are atomic
/// among themselves. If that insert fails after the order row committed,
/// the orphaned order is deleted and the original error is reported.
pub async fn create(pool: &PgPool, new: &NewOrder<'_>) -> Result<Uuid, sqlx::Error> {
    let (order_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO orders (restaurant_id, table_id, status, subtotal, tax, total, special_instructions)
         VALUES ($1, $2, 'pending', $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(new.restaurant_id)
    .bind(new.table_id)
    .bind(new.subtotal)
    .bind(new.tax)
    .bind(new.total)
    .bind(new.special_instructions)
    .fetch_one(pool)
    .await?;

    let menu_item_ids: Vec<Option<Uuid>> = new.items.iter().map(|i| i.menu_item_id).collect();
    let names: Vec<String> = new.items.iter().map(|i| i.item_name.clone()).collect();
    let quantities: Vec<i32> = new.items.iter().map(|i| i.quantity).collect();
    let prices: Vec<Decimal> = new.items.iter().map(|i| i.price_at_time).collect();
    let instructions: Vec<Option<String>> = new
        .items
        .iter()
        .map(|i| i.special_instructions.clone())
        .collect();

    let items_result = sqlx::query(
        "INSERT INTO order_items (order_id, menu_item_id, item_name, quantity, price_at_time, special_instructions)
         SELECT $1, * FROM UNNEST($2::uuid[], $3::text[], $4::int[], $5::numeric[], $6::text[])",
    )
    .bind(order_id)
    .bind(&menu_item_ids)
    .bind(&names)
    .bind(&quantities)
    .bind(&prices)
    .bind(&instructions)
    .execute(pool)
    .await;

    if let Err(e) = items_result {
        // Compensating delete; report the original failure, not this one
        if let Err(cleanup) = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(pool)
            .await
        {
            tracing::error!(
                order_id = %order_id,
                error = %cleanup,
                "Failed to delete orphaned order after item insert failure"
            );
        }
        return Err(e);
    }

    Ok(order_id)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find an order only when it belongs to the given restaurant; a foreign
/// order answers `None`, indistinguishable from a missing one.
pub async fn find_scoped(
    pool: &PgPool,
    id: Uuid,
    restaurant_id: Uuid,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_items(pool: &PgPool, order_id: Uuid) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at")
        .bind(order_id)
        .fetch_all(pool)
        .await
}

/// Full aggregate for order views and invoice generation
pub async fn find_detail(pool: &PgPool, id: Uuid) -> Result<Option<OrderDetail>, sqlx::Error> {
    let Some(order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let items = list_items(pool, id).await?;
    let Some(table) = super::tables::find_by_id(pool, order.table_id).await? else {
        return Ok(None);
    };
    let Some(restaurant) = super::restaurants::find_by_id(pool, order.restaurant_id).await? else {
        return Ok(None);
    };
    Ok(Some(OrderDetail {
        order,
        items,
        table,
        restaurant,
    }))
}

/// Recent orders for a restaurant, newest first, optionally filtered by status
pub async fn list_for_restaurant(
    pool: &PgPool,
    restaurant_id: Uuid,
    status: Option<OrderStatus>,
    limit: i64,
) -> Result<Vec<OrderSummary>, sqlx::Error> {
    let orders: Vec<Order> = match status {
        Some(status) => {
            sqlx::query_as(
                "SELECT * FROM orders WHERE restaurant_id = $1 AND status = $2
                 ORDER BY created_at DESC LIMIT $3",
            )
            .bind(restaurant_id)
            .bind(status)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT * FROM orders WHERE restaurant_id = $1
                 ORDER BY created_at DESC LIMIT $2",
            )
            .bind(restaurant_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    let mut summaries = Vec::with_capacity(orders.len());
    for order in orders {
        let items = list_items(pool, order.id).await?;
        let payments = super::payments::list_by_order(pool, order.id).await?;
        summaries.push(OrderSummary {
            order,
            items,
            payments,
        });
    }
    Ok(summaries)
}

/// Targeted status update stamping updated_at and bumping the version
/// counter. With `expected_version` the write is conditional and a stale
/// version leaves the row untouched (returns false).
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: OrderStatus,
    expected_version: Option<i32>,
) -> Result<bool, sqlx::Error> {
    let result = match expected_version {
        Some(version) => {
            sqlx::query(
                "UPDATE orders SET status = $2, updated_at = now(), version = version + 1
                 WHERE id = $1 AND version = $3",
            )
            .bind(id)
            .bind(status)
            .bind(version)
            .execute(pool)
            .await?
        }
        None => {
            sqlx::query(
                "UPDATE orders SET status = $2, updated_at = now(), version = version + 1
                 WHERE id = $1",
            )
            .bind(id)
            .bind(status)
            .execute(pool)
            .await?
        }
    };
    Ok(result.rows_affected() > 0)
}

/// Payment-driven confirmation: only a pending order advances, so a
/// redelivered success event (or one arriving after the kitchen already
/// started) is a no-op.
pub async fn confirm_if_pending(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE orders SET status = 'confirmed', updated_at = now(), version = version + 1
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
