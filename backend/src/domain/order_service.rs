//! Order lifecycle service implementing [`OrderCommand`] and [`OrderQuery`].
//!
//! Checks run in a fixed order: the order must exist (404), the caller must
//! be allowed to act on it (403), then the aggregate validates the input and
//! current state (400/409). Transitions are persisted with a conditional
//! write keyed on the status read at the start of the call.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::port_error_mapping::{map_order_error, map_product_error, map_user_error};
use crate::domain::ports::{
    OrderCommand, OrderQuery, OrderRepository, PlaceOrderRequest, ProductRepository,
    UserRepository,
};
use crate::domain::{
    Caller, DeliveryEstimate, Error, Order, OrderId, OrderStatus, OrderView, OwnerSummary,
    Product, ProductId, UserId,
};

/// Order lifecycle service.
#[derive(Clone)]
pub struct OrderLifecycleService<O, P, U> {
    orders: Arc<O>,
    products: Arc<P>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<O, P, U> OrderLifecycleService<O, P, U> {
    /// Create a service over the given stores.
    ///
    /// # Examples
    /// ```
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// use catering::domain::OrderLifecycleService;
    /// use catering::outbound::memory::{
    ///     InMemoryOrderRepository, InMemoryProductRepository, InMemoryUserRepository,
    /// };
    ///
    /// let service = OrderLifecycleService::new(
    ///     Arc::new(InMemoryOrderRepository::default()),
    ///     Arc::new(InMemoryProductRepository::default()),
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(orders: Arc<O>, products: Arc<P>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            orders,
            products,
            users,
            clock,
        }
    }
}

impl<O, P, U> OrderLifecycleService<O, P, U>
where
    O: OrderRepository,
    P: ProductRepository,
    U: UserRepository,
{
    async fn load(&self, id: OrderId) -> Result<Order, Error> {
        self.orders
            .find_by_id(&id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| Error::not_found(format!("order {id} not found")))
    }

    async fn persist(&self, order: &Order, expected: OrderStatus) -> Result<(), Error> {
        self.orders
            .save_transition(order, expected)
            .await
            .map_err(map_order_error)?;
        info!(
            order_id = %order.id,
            from = %expected,
            to = %order.status,
            "order transition applied"
        );
        Ok(())
    }

    async fn product_index(&self, orders: &[Order]) -> Result<HashMap<ProductId, Product>, Error> {
        let mut ids: Vec<ProductId> = orders
            .iter()
            .flat_map(|order| order.line_items.iter().map(|item| item.product_id))
            .collect();
        ids.sort_by_key(|id| *id.as_uuid());
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let products = self
            .products
            .find_many(&ids)
            .await
            .map_err(map_product_error)?;
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    async fn owner_index(&self, orders: &[Order]) -> Result<HashMap<UserId, OwnerSummary>, Error> {
        let mut ids: Vec<UserId> = orders.iter().map(|order| order.user_id).collect();
        ids.sort_by_key(|id| *id.as_uuid());
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self.users.find_many(&ids).await.map_err(map_user_error)?;
        Ok(users
            .into_iter()
            .map(|user| {
                (
                    user.id,
                    OwnerSummary {
                        id: user.id,
                        username: user.username,
                        email: user.email,
                    },
                )
            })
            .collect())
    }
}

#[async_trait]
impl<O, P, U> OrderCommand for OrderLifecycleService<O, P, U>
where
    O: OrderRepository,
    P: ProductRepository,
    U: UserRepository,
{
    async fn place(&self, caller: &Caller, request: PlaceOrderRequest) -> Result<Order, Error> {
        let order = Order::place(
            caller.user_id,
            &request.items,
            request.total_price,
            self.clock.utc(),
        )?;
        self.orders.insert(&order).await.map_err(map_order_error)?;
        info!(order_id = %order.id, user_id = %caller.user_id, "order placed");
        Ok(order)
    }

    async fn set_status(
        &self,
        caller: &Caller,
        order_id: OrderId,
        target: &str,
    ) -> Result<Order, Error> {
        caller.require_admin()?;
        let target = OrderStatus::settable(target)?;
        let mut order = self.load(order_id).await?;
        let expected = order.status;
        order.set_status(target, self.clock.utc());
        self.persist(&order, expected).await?;
        Ok(order)
    }

    async fn cancel(&self, caller: &Caller, order_id: OrderId) -> Result<Order, Error> {
        let mut order = self.load(order_id).await?;
        caller.require_owner_or_admin(&order.user_id)?;
        let expected = order.status;
        order.cancel(self.clock.utc())?;
        self.persist(&order, expected).await?;
        Ok(order)
    }

    async fn update_estimate(
        &self,
        caller: &Caller,
        order_id: OrderId,
        minutes: &Value,
    ) -> Result<Order, Error> {
        let mut order = self.load(order_id).await?;
        caller.require_admin()?;
        let estimate = DeliveryEstimate::minutes_from_json(minutes)?;
        let expected = order.status;
        order.update_estimate(estimate, self.clock.utc());
        self.persist(&order, expected).await?;
        Ok(order)
    }

    async fn mark_delivered(&self, caller: &Caller, order_id: OrderId) -> Result<Order, Error> {
        let mut order = self.load(order_id).await?;
        caller.require_admin()?;
        let expected = order.status;
        order.mark_delivered(self.clock.utc())?;
        self.persist(&order, expected).await?;
        Ok(order)
    }

    async fn delete(&self, caller: &Caller, order_id: OrderId) -> Result<(), Error> {
        let deleted = self
            .orders
            .delete_owned(&order_id, &caller.user_id)
            .await
            .map_err(map_order_error)?;
        if !deleted {
            debug!(order_id = %order_id, user_id = %caller.user_id, "owner-scoped delete matched nothing");
            return Err(Error::not_found("order not found or access denied"));
        }
        info!(order_id = %order_id, "order deleted");
        Ok(())
    }
}

#[async_trait]
impl<O, P, U> OrderQuery for OrderLifecycleService<O, P, U>
where
    O: OrderRepository,
    P: ProductRepository,
    U: UserRepository,
{
    async fn my_orders(&self, caller: &Caller) -> Result<Vec<OrderView>, Error> {
        let orders = self
            .orders
            .list_for_user(&caller.user_id)
            .await
            .map_err(map_order_error)?;
        let products = self.product_index(&orders).await?;
        Ok(orders
            .into_iter()
            .map(|order| OrderView::expand(order, None, |id| products.get(id).cloned()))
            .collect())
    }

    async fn all_orders(&self, caller: &Caller) -> Result<Vec<OrderView>, Error> {
        caller.require_admin()?;
        let orders = self.orders.list_all().await.map_err(map_order_error)?;
        let products = self.product_index(&orders).await?;
        let owners = self.owner_index(&orders).await?;
        Ok(orders
            .into_iter()
            .map(|order| {
                let owner = owners.get(&order.user_id).cloned();
                OrderView::expand(order, owner, |id| products.get(id).cloned())
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
