//! PostgreSQL-backed `OrderRepository` implementation using Diesel ORM.
//!
//! Line items and the delivery estimate live in `jsonb` columns. Transitions
//! are a single `UPDATE ... WHERE id = $1 AND status = $expected`; zero
//! affected rows means another writer got there first.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{
    DeliveryEstimate, LineItem, Order, OrderId, OrderStatus, Price, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewOrderRow, OrderRow, OrderTransition};
use super::pool::{DbPool, PoolError};
use super::schema::orders;

/// Diesel-backed order store.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    map_basic_pool_error(error, OrderRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, OrderRepositoryError> {
    serde_json::to_value(value)
        .map_err(|err| OrderRepositoryError::query(format!("order encoding failed: {err}")))
}

/// Decode a stored estimate, falling back to the legacy default for rows
/// written before estimates were structured.
fn decode_estimate(order_id: uuid::Uuid, value: serde_json::Value) -> DeliveryEstimate {
    if value.is_null() {
        return DeliveryEstimate::legacy_default();
    }
    serde_json::from_value(value).unwrap_or_else(|err| {
        warn!(order_id = %order_id, error = %err, "unreadable delivery estimate, using default");
        DeliveryEstimate::legacy_default()
    })
}

fn row_to_order(row: OrderRow) -> Result<Order, OrderRepositoryError> {
    let id = row.id;
    let line_items: Vec<LineItem> = serde_json::from_value(row.line_items).map_err(|err| {
        OrderRepositoryError::query(format!("stored order {id} has invalid line items: {err}"))
    })?;
    let total_price = Price::new(row.total_price).map_err(|err| {
        OrderRepositoryError::query(format!("stored order {id} has invalid total: {err}"))
    })?;
    let status = OrderStatus::from_str(&row.status).map_err(|err| {
        OrderRepositoryError::query(format!("stored order {id} has invalid status: {err}"))
    })?;
    Ok(Order {
        id: OrderId::from_uuid(id),
        user_id: UserId::from_uuid(row.user_id),
        line_items,
        total_price,
        estimated_delivery_time: decode_estimate(id, row.estimated_delivery_time),
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, OrderRepositoryError> {
    rows.into_iter().map(row_to_order).collect()
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        let line_items = to_json(&order.line_items)?;
        let estimate = to_json(&order.estimated_delivery_time)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewOrderRow {
            id: *order.id.as_uuid(),
            user_id: *order.user_id.as_uuid(),
            line_items: &line_items,
            total_price: order.total_price.value(),
            estimated_delivery_time: &estimate,
            status: order.status.as_str(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        };
        diesel::insert_into(orders::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrderRow> = orders::table
            .filter(orders::id.eq(id.as_uuid()))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_order).transpose()
    }

    async fn list_for_user(&self, owner: &UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrderRow> = orders::table
            .filter(orders::user_id.eq(owner.as_uuid()))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_orders(rows)
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrderRow> = orders::table
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_orders(rows)
    }

    async fn save_transition(
        &self,
        order: &Order,
        expected_status: OrderStatus,
    ) -> Result<(), OrderRepositoryError> {
        let estimate = to_json(&order.estimated_delivery_time)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = OrderTransition {
            status: order.status.as_str(),
            estimated_delivery_time: &estimate,
            updated_at: order.updated_at,
        };
        let updated = diesel::update(
            orders::table
                .filter(orders::id.eq(order.id.as_uuid()))
                .filter(orders::status.eq(expected_status.as_str())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(OrderRepositoryError::status_changed(
                expected_status.as_str(),
            ));
        }
        Ok(())
    }

    async fn delete_owned(
        &self,
        id: &OrderId,
        owner: &UserId,
    ) -> Result<bool, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            orders::table
                .filter(orders::id.eq(id.as_uuid()))
                .filter(orders::user_id.eq(owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
