//! Port for order persistence.
//!
//! Status transitions are written with [`OrderRepository::save_transition`],
//! a conditional update that only applies while the stored status still
//! equals the status the caller read. A lost race surfaces as
//! [`OrderRepositoryError::StatusChanged`] and is never retried.

use async_trait::async_trait;

use crate::domain::{Order, OrderId, OrderStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
        /// The stored status no longer matched the expected one.
        StatusChanged { expected: String } =>
            "order status changed concurrently (expected {expected})",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError>;

    /// Orders owned by `owner`, newest first.
    async fn list_for_user(&self, owner: &UserId) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Persist `order` only if the stored status equals `expected_status`.
    ///
    /// Status, estimate and `updated_at` are written; the owner and line items
    /// are immutable.
    async fn save_transition(
        &self,
        order: &Order,
        expected_status: OrderStatus,
    ) -> Result<(), OrderRepositoryError>;

    /// Delete `id` when it belongs to `owner`. Returns `false` when no row
    /// matched both.
    async fn delete_owned(&self, id: &OrderId, owner: &UserId)
    -> Result<bool, OrderRepositoryError>;
}

/// Order store with no orders.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderRepository;

#[async_trait]
impl OrderRepository for FixtureOrderRepository {
    async fn insert(&self, _order: &Order) -> Result<(), OrderRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(None)
    }

    async fn list_for_user(&self, _owner: &UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderRepositoryError> {
        Ok(Vec::new())
    }

    async fn save_transition(
        &self,
        _order: &Order,
        expected_status: OrderStatus,
    ) -> Result<(), OrderRepositoryError> {
        Err(OrderRepositoryError::status_changed(expected_status.as_str()))
    }

    async fn delete_owned(
        &self,
        _id: &OrderId,
        _owner: &UserId,
    ) -> Result<bool, OrderRepositoryError> {
        Ok(false)
    }
}
