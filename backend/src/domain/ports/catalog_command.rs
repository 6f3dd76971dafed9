//! Driving port for catalog administration.

use async_trait::async_trait;

use crate::domain::{Caller, Error, NewProduct, Product, ProductId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogCommand: Send + Sync {
    async fn create(&self, caller: &Caller, draft: NewProduct) -> Result<Product, Error>;

    /// Exclude the product from the default listing. Idempotent.
    async fn hide(&self, caller: &Caller, id: ProductId) -> Result<Product, Error>;

    /// Return a hidden product to the default listing. Idempotent.
    async fn restore(&self, caller: &Caller, id: ProductId) -> Result<Product, Error>;

    /// Permanent delete. Orders referencing the product are untouched.
    async fn delete(&self, caller: &Caller, id: ProductId) -> Result<(), Error>;
}
