//! Port for catalog persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Product, ProductId, ProductListQuery, ProductStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by product repository adapters.
    pub enum ProductRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "product repository query failed: {message}",
    }
}

/// Catalog storage.
///
/// Listing applies the full [`ProductListQuery`] (status, search, inclusive
/// price bounds) and returns newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError>;

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError>;

    /// Fetch every product whose id is in `ids`. Unknown ids are skipped.
    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError>;

    async fn list(&self, query: &ProductListQuery) -> Result<Vec<Product>, ProductRepositoryError>;

    /// Set visibility and return the updated record, or `None` when the id is
    /// unknown.
    async fn set_status(
        &self,
        id: &ProductId,
        status: ProductStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError>;

    /// Permanently remove a product. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &ProductId) -> Result<bool, ProductRepositoryError>;
}

/// Empty catalog that accepts and discards writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProductRepository;

#[async_trait]
impl ProductRepository for FixtureProductRepository {
    async fn insert(&self, _product: &Product) -> Result<(), ProductRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(None)
    }

    async fn find_many(&self, _ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError> {
        Ok(Vec::new())
    }

    async fn list(&self, _query: &ProductListQuery) -> Result<Vec<Product>, ProductRepositoryError> {
        Ok(Vec::new())
    }

    async fn set_status(
        &self,
        _id: &ProductId,
        _status: ProductStatus,
        _updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _id: &ProductId) -> Result<bool, ProductRepositoryError> {
        Ok(false)
    }
}
