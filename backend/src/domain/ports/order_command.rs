//! Driving port for order mutations.
//!
//! Every operation receives the request-scoped [`Caller`]. Implementations
//! check, in order: the order exists, the caller may act on it, then the
//! requested transition or input is valid.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Caller, Error, LineItemInput, Order, OrderId};

/// Input for placing an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOrderRequest {
    pub items: Vec<LineItemInput>,
    pub total_price: f64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Create a pending order owned by the caller.
    async fn place(&self, caller: &Caller, request: PlaceOrderRequest) -> Result<Order, Error>;

    /// Administrator status change to `pending`, `confirmed` or `cancelled`.
    async fn set_status(
        &self,
        caller: &Caller,
        order_id: OrderId,
        target: &str,
    ) -> Result<Order, Error>;

    /// Cancel a pending order as its owner or an administrator.
    async fn cancel(&self, caller: &Caller, order_id: OrderId) -> Result<Order, Error>;

    /// Administrator estimate update; `minutes` must be a JSON number.
    async fn update_estimate(
        &self,
        caller: &Caller,
        order_id: OrderId,
        minutes: &Value,
    ) -> Result<Order, Error>;

    async fn mark_delivered(&self, caller: &Caller, order_id: OrderId) -> Result<Order, Error>;

    /// Owner-scoped delete.
    async fn delete(&self, caller: &Caller, order_id: OrderId) -> Result<(), Error>;
}
