//! Driving port for public catalog reads.

use async_trait::async_trait;

use crate::domain::{Error, Product, ProductId, ProductListQuery};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    async fn list(&self, query: &ProductListQuery) -> Result<Vec<Product>, Error>;

    /// Fetch one product regardless of visibility.
    async fn get(&self, id: ProductId) -> Result<Product, Error>;
}

/// Empty catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogQuery;

#[async_trait]
impl CatalogQuery for FixtureCatalogQuery {
    async fn list(&self, _query: &ProductListQuery) -> Result<Vec<Product>, Error> {
        Ok(Vec::new())
    }

    async fn get(&self, _id: ProductId) -> Result<Product, Error> {
        Err(Error::not_found("product not found"))
    }
}
