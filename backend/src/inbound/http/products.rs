//! Catalog API handlers.
//!
//! Reads are public. Creation, deletion and visibility changes require an
//! administrator token; the role check happens in the catalog service.

use std::str::FromStr;

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{NewProduct, Price, Product, ProductListQuery, ProductName, StatusFilter};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::{ErrorSchema, ProductSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_product_id, product_error,
};

/// Listing filters taken from the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    /// `active` (default), `hidden` or `all`.
    pub status: Option<String>,
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
}

impl ProductListParams {
    fn into_query(self) -> ApiResult<ProductListQuery> {
        let status = self
            .status
            .as_deref()
            .map(StatusFilter::from_str)
            .transpose()
            .map_err(product_error)?
            .unwrap_or_default();
        let min_price = self
            .min_price
            .map(Price::new)
            .transpose()
            .map_err(product_error)?;
        let max_price = self
            .max_price
            .map(Price::new)
            .transpose()
            .map_err(product_error)?;
        ProductListQuery::new(status, self.search.as_deref(), min_price, max_price)
            .map_err(product_error)
    }
}

/// Product creation body. `name` and `price` are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProductRequest {
    #[schema(example = "Jollof rice tray")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = 120.0)]
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

impl TryFrom<NewProductRequest> for NewProduct {
    type Error = crate::domain::Error;

    fn try_from(value: NewProductRequest) -> Result<Self, Self::Error> {
        let name = value
            .name
            .ok_or_else(|| missing_field_error(FieldName::new("name")))?;
        let price = value
            .price
            .ok_or_else(|| missing_field_error(FieldName::new("price")))?;
        let name = ProductName::new(name).map_err(product_error)?;
        let price = Price::new(price).map_err(product_error)?;
        Ok(NewProduct::new(
            name,
            value.description,
            price,
            value.image_url,
        ))
    }
}

/// List catalog entries.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Matching products, newest first", body = [ProductSchema]),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "listProducts",
    security([])
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    params: web::Query<ProductListParams>,
) -> ApiResult<web::Json<Vec<Product>>> {
    let query = params.into_inner().into_query()?;
    let products = state.catalog.list(&query).await?;
    Ok(web::Json(products))
}

/// Fetch one product regardless of visibility.
#[utoipa::path(
    get,
    path = "/api/v1/products/{productId}",
    params(("productId" = String, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product", body = ProductSchema),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "getProduct",
    security([])
)]
#[get("/products/{product_id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Product>> {
    let id = parse_product_id(&path)?;
    let product = state.catalog.get(id).await?;
    Ok(web::Json(product))
}

/// Create an active product.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = NewProductRequest,
    responses(
        (status = 201, description = "Created", body = ProductSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<NewProductRequest>,
) -> ApiResult<HttpResponse> {
    let draft = NewProduct::try_from(payload.into_inner())?;
    let product = state.catalog_admin.create(auth.caller(), draft).await?;
    Ok(HttpResponse::Created().json(product))
}

/// Permanently delete a product. Orders referencing it keep a dangling id.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{productId}",
    params(("productId" = String, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/products/{product_id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_product_id(&path)?;
    state.catalog_admin.delete(auth.caller(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Hide a product from the default listing.
#[utoipa::path(
    put,
    path = "/api/v1/products/{productId}/hide",
    params(("productId" = String, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Hidden product", body = ProductSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "hideProduct"
)]
#[put("/products/{product_id}/hide")]
pub async fn hide_product(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Product>> {
    let id = parse_product_id(&path)?;
    let product = state.catalog_admin.hide(auth.caller(), id).await?;
    Ok(web::Json(product))
}

/// Make a hidden product active again. Restoring an active product is a no-op.
#[utoipa::path(
    put,
    path = "/api/v1/products/{productId}/restore",
    params(("productId" = String, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Active product", body = ProductSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "restoreProduct"
)]
#[put("/products/{product_id}/restore")]
pub async fn restore_product(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Product>> {
    let id = parse_product_id(&path)?;
    let product = state.catalog_admin.restore(auth.caller(), id).await?;
    Ok(web::Json(product))
}
