//! PostgreSQL-backed `ProductRepository` implementation using Diesel ORM.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProductRepository, ProductRepositoryError};
use crate::domain::{
    Price, Product, ProductId, ProductListQuery, ProductName, ProductStatus, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewProductRow, ProductRow};
use super::pool::{DbPool, PoolError};
use super::schema::products;

/// Diesel-backed catalog store.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProductRepositoryError {
    map_basic_pool_error(error, ProductRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProductRepositoryError {
    map_basic_diesel_error(
        error,
        ProductRepositoryError::query,
        ProductRepositoryError::connection,
    )
}

fn row_to_product(row: ProductRow) -> Result<Product, ProductRepositoryError> {
    let invalid = |err: crate::domain::ProductValidationError| {
        ProductRepositoryError::query(format!("stored product {} is invalid: {err}", row.id))
    };
    Ok(Product {
        id: ProductId::from_uuid(row.id),
        name: ProductName::new(&row.name).map_err(invalid)?,
        description: row.description.clone(),
        price: Price::new(row.price).map_err(invalid)?,
        image_url: row.image_url.clone(),
        status: ProductStatus::from_str(&row.status).map_err(invalid)?,
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn rows_to_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, ProductRepositoryError> {
    rows.into_iter().map(row_to_product).collect()
}

/// Escape `LIKE` metacharacters so search text matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewProductRow {
            id: *product.id.as_uuid(),
            name: product.name.as_ref(),
            description: product.description.as_deref(),
            price: product.price.value(),
            image_url: product.image_url.as_deref(),
            status: product.status.as_str(),
            created_by: *product.created_by.as_uuid(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        };
        diesel::insert_into(products::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ProductRow> = products::table
            .filter(products::id.eq(id.as_uuid()))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_product).transpose()
    }

    async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<ProductRow> = products::table
            .filter(products::id.eq_any(uuids))
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_products(rows)
    }

    async fn list(&self, query: &ProductListQuery) -> Result<Vec<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut statement = products::table
            .select(ProductRow::as_select())
            .into_boxed();
        if let Some(status) = query.status().status() {
            statement = statement.filter(products::status.eq(status.as_str()));
        }
        if let Some(search) = query.search() {
            let pattern = like_pattern(search);
            statement = statement.filter(
                products::name
                    .ilike(pattern.clone())
                    .or(products::description.ilike(pattern)),
            );
        }
        if let Some(min) = query.min_price() {
            statement = statement.filter(products::price.ge(min.value()));
        }
        if let Some(max) = query.max_price() {
            statement = statement.filter(products::price.le(max.value()));
        }
        let rows: Vec<ProductRow> = statement
            .order(products::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_products(rows)
    }

    async fn set_status(
        &self,
        id: &ProductId,
        status: ProductStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Rows already in the target status are left untouched.
        let changed: Option<ProductRow> = diesel::update(
            products::table
                .filter(products::id.eq(id.as_uuid()))
                .filter(products::status.ne(status.as_str())),
        )
        .set((
            products::status.eq(status.as_str()),
            products::updated_at.eq(updated_at),
        ))
        .returning(ProductRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        match changed {
            Some(row) => row_to_product(row).map(Some),
            None => {
                drop(conn);
                self.find_by_id(id).await
            }
        }
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(products::table.filter(products::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_timestamp;
    use rstest::rstest;

    fn row(status: &str, price: f64) -> ProductRow {
        ProductRow {
            id: uuid::Uuid::new_v4(),
            name: "Paneer Tikka".to_owned(),
            description: None,
            price,
            image_url: None,
            status: status.to_owned(),
            created_by: uuid::Uuid::new_v4(),
            created_at: fixture_timestamp(),
            updated_at: fixture_timestamp(),
        }
    }

    #[rstest]
    fn row_converts_to_hidden_product() {
        let product = row_to_product(row("hidden", 220.0)).expect("valid row");
        assert_eq!(product.status, ProductStatus::Hidden);
        assert_eq!(product.price.value(), 220.0);
    }

    #[rstest]
    #[case(row("archived", 10.0))]
    #[case(row("active", -1.0))]
    fn corrupt_rows_are_query_errors(#[case] bad: ProductRow) {
        let err = row_to_product(bad).expect_err("invalid row");
        assert!(matches!(err, ProductRepositoryError::Query { .. }));
    }

    #[rstest]
    #[case("tikka", "%tikka%")]
    #[case("50%_off", "%50\\%\\_off%")]
    fn search_text_is_matched_literally(#[case] search: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(search), expected);
    }

    #[rstest]
    fn pool_failure_is_connection_error() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, ProductRepositoryError::Connection { .. }));
    }
}
