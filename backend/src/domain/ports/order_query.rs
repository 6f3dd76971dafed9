//! Driving port for order listings.

use async_trait::async_trait;

use crate::domain::{Caller, Error, OrderView};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// The caller's own orders, newest first, with products expanded.
    async fn my_orders(&self, caller: &Caller) -> Result<Vec<OrderView>, Error>;

    /// Every order with products and owner expanded. Administrators only.
    async fn all_orders(&self, caller: &Caller) -> Result<Vec<OrderView>, Error>;
}

/// Query returning no orders.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderQuery;

#[async_trait]
impl OrderQuery for FixtureOrderQuery {
    async fn my_orders(&self, _caller: &Caller) -> Result<Vec<OrderView>, Error> {
        Ok(Vec::new())
    }

    async fn all_orders(&self, caller: &Caller) -> Result<Vec<OrderView>, Error> {
        caller.require_admin()?;
        Ok(Vec::new())
    }
}
