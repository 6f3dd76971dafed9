//! Catalog service implementing [`CatalogQuery`] and [`CatalogCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::port_error_mapping::map_product_error;
use crate::domain::ports::{CatalogCommand, CatalogQuery, ProductRepository};
use crate::domain::{Caller, Error, NewProduct, Product, ProductId, ProductListQuery, ProductStatus};

#[derive(Clone)]
pub struct CatalogService<P> {
    products: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<P> CatalogService<P> {
    pub fn new(products: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self { products, clock }
    }
}

impl<P: ProductRepository> CatalogService<P> {
    async fn set_visibility(
        &self,
        caller: &Caller,
        id: ProductId,
        status: ProductStatus,
    ) -> Result<Product, Error> {
        caller.require_admin()?;
        let product = self
            .products
            .set_status(&id, status, self.clock.utc())
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))?;
        info!(product_id = %id, status = %status, "product visibility set");
        Ok(product)
    }
}

#[async_trait]
impl<P: ProductRepository> CatalogQuery for CatalogService<P> {
    async fn list(&self, query: &ProductListQuery) -> Result<Vec<Product>, Error> {
        self.products.list(query).await.map_err(map_product_error)
    }

    async fn get(&self, id: ProductId) -> Result<Product, Error> {
        self.products
            .find_by_id(&id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))
    }
}

#[async_trait]
impl<P: ProductRepository> CatalogCommand for CatalogService<P> {
    async fn create(&self, caller: &Caller, draft: NewProduct) -> Result<Product, Error> {
        caller.require_admin()?;
        let product = Product::create(draft, caller.user_id, self.clock.utc());
        self.products
            .insert(&product)
            .await
            .map_err(map_product_error)?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    async fn hide(&self, caller: &Caller, id: ProductId) -> Result<Product, Error> {
        self.set_visibility(caller, id, ProductStatus::Hidden).await
    }

    async fn restore(&self, caller: &Caller, id: ProductId) -> Result<Product, Error> {
        self.set_visibility(caller, id, ProductStatus::Active).await
    }

    async fn delete(&self, caller: &Caller, id: ProductId) -> Result<(), Error> {
        caller.require_admin()?;
        let deleted = self.products.delete(&id).await.map_err(map_product_error)?;
        if !deleted {
            return Err(Error::not_found(format!("product {id} not found")));
        }
        info!(product_id = %id, "product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockProductRepository, ProductRepositoryError};
    use crate::domain::{ErrorCode, Price, ProductName, Role};
    use crate::test_support::{MutableClock, caller, fixture_timestamp};
    use rstest::rstest;

    fn service(repo: MockProductRepository) -> CatalogService<MockProductRepository> {
        CatalogService::new(Arc::new(repo), MutableClock::shared())
    }

    fn draft() -> NewProduct {
        NewProduct::new(
            ProductName::new("Chole Bhature").expect("name"),
            Some("Spiced chickpeas".to_owned()),
            Price::new(150.0).expect("price"),
            None,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn create_records_admin_as_creator() {
        let admin = caller("admin@example.com", Role::Admin);
        let mut repo = MockProductRepository::new();
        repo.expect_insert().times(1).return_once(|_| Ok(()));

        let product = service(repo).create(&admin, draft()).await.expect("created");
        assert_eq!(product.created_by, admin.user_id);
        assert_eq!(product.status, ProductStatus::Active);
        assert_eq!(product.created_at, fixture_timestamp());
    }

    #[rstest]
    #[tokio::test]
    async fn non_admin_hide_is_forbidden_and_writes_nothing() {
        let user = caller("user@example.com", Role::User);
        let mut repo = MockProductRepository::new();
        repo.expect_set_status().never();

        let err = service(repo)
            .hide(&user, ProductId::random())
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn hide_unknown_product_is_not_found() {
        let admin = caller("admin@example.com", Role::Admin);
        let mut repo = MockProductRepository::new();
        repo.expect_set_status()
            .times(1)
            .return_once(|_, _, _| Ok(None));

        let err = service(repo)
            .hide(&admin, ProductId::random())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn delete_unknown_product_is_not_found() {
        let admin = caller("admin@example.com", Role::Admin);
        let mut repo = MockProductRepository::new();
        repo.expect_delete().times(1).return_once(|_| Ok(false));

        let err = service(repo)
            .delete(&admin, ProductId::random())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failures_are_unavailable() {
        let mut repo = MockProductRepository::new();
        repo.expect_list()
            .times(1)
            .return_once(|_| Err(ProductRepositoryError::connection("refused")));

        let err = service(repo)
            .list(&ProductListQuery::default())
            .await
            .expect_err("unavailable");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
