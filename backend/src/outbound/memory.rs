//! In-process repositories used when no database is configured.
//!
//! Each store keeps its records in a `Mutex`-guarded map and implements the
//! same port as its Diesel counterpart, including the conditional write for
//! order transitions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    OrderRepository, OrderRepositoryError, ProductRepository, ProductRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Email, Order, OrderId, OrderStatus, Product, ProductId, ProductListQuery, ProductStatus,
    User, UserId,
};

fn lock<'a, T, E>(
    mutex: &'a Mutex<T>,
    poisoned: impl FnOnce(&'static str) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    mutex.lock().map_err(|_| poisoned("in-memory store lock poisoned"))
}

/// Catalog held in memory.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: Mutex<HashMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<ProductId, Product>>, ProductRepositoryError> {
        lock(&self.products, ProductRepositoryError::query)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        self.guard()?.insert(product.id, product.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError> {
        let products = self.guard()?;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn list(&self, query: &ProductListQuery) -> Result<Vec<Product>, ProductRepositoryError> {
        let products = self.guard()?;
        Ok(query.apply(products.values().cloned()))
    }

    async fn set_status(
        &self,
        id: &ProductId,
        status: ProductStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut products = self.guard()?;
        Ok(products.get_mut(id).map(|product| {
            product.set_visibility(status, updated_at);
            product.clone()
        }))
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, ProductRepositoryError> {
        Ok(self.guard()?.remove(id).is_some())
    }
}

/// Orders held in memory.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<OrderId, Order>>, OrderRepositoryError> {
        lock(&self.orders, OrderRepositoryError::query)
    }

    fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        self.guard()?.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }

    async fn list_for_user(&self, owner: &UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let orders = self.guard()?;
        Ok(Self::newest_first(
            orders
                .values()
                .filter(|order| order.user_id == *owner)
                .cloned()
                .collect(),
        ))
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderRepositoryError> {
        Ok(Self::newest_first(self.guard()?.values().cloned().collect()))
    }

    async fn save_transition(
        &self,
        order: &Order,
        expected_status: OrderStatus,
    ) -> Result<(), OrderRepositoryError> {
        let mut orders = self.guard()?;
        match orders.get_mut(&order.id) {
            Some(stored) if stored.status == expected_status => {
                stored.status = order.status;
                stored.estimated_delivery_time = order.estimated_delivery_time.clone();
                stored.updated_at = order.updated_at;
                Ok(())
            }
            _ => Err(OrderRepositoryError::status_changed(
                expected_status.as_str(),
            )),
        }
    }

    async fn delete_owned(
        &self,
        id: &OrderId,
        owner: &UserId,
    ) -> Result<bool, OrderRepositoryError> {
        let mut orders = self.guard()?;
        let owned = orders.get(id).is_some_and(|order| order.user_id == *owner);
        if owned {
            orders.remove(id);
        }
        Ok(owned)
    }
}

/// Accounts held in memory. Email uniqueness is enforced on insert.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<UserId, User>>, UserPersistenceError> {
        lock(&self.users, UserPersistenceError::query)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.guard()?;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.guard()?;
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(UserPersistenceError::query("user not found for update")),
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.guard()?.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .guard()?
            .values()
            .find(|user| user.email == *email)
            .cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let users = self.guard()?;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .guard()?
            .values()
            .find(|user| {
                user.password_reset
                    .as_ref()
                    .is_some_and(|reset| reset.token_hash == token_hash)
            })
            .cloned())
    }
}
