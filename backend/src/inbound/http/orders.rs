//! Order API handlers.
//!
//! Every endpoint needs a bearer token. Existence, ownership and role checks
//! (404, then 403) and state rules (409) live in the order service; this
//! module only shapes requests and responses.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::PlaceOrderRequest;
use crate::domain::{LineItemInput, Order, OrderView, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::{ErrorSchema, OrderSchema, OrderViewSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_uuid_error, missing_field_error, parse_order_id,
};

const PRODUCTS: FieldName = FieldName::new("products");

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemBody {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub product_id: String,
    #[schema(example = 2)]
    pub quantity: i64,
}

/// Order placement body. The total is stored as supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderBody {
    pub products: Option<Vec<LineItemBody>>,
    #[schema(example = 500.0)]
    pub total_price: Option<f64>,
}

impl TryFrom<PlaceOrderBody> for PlaceOrderRequest {
    type Error = crate::domain::Error;

    fn try_from(body: PlaceOrderBody) -> Result<Self, Self::Error> {
        let total_price = body
            .total_price
            .ok_or_else(|| missing_field_error(FieldName::new("totalPrice")))?;
        let items = body
            .products
            .unwrap_or_default()
            .into_iter()
            .map(|item| {
                let product_id = ProductId::new(&item.product_id)
                    .map_err(|_| invalid_uuid_error(PRODUCTS, &item.product_id))?;
                Ok(LineItemInput {
                    product_id,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, Self::Error>>()?;
        Ok(Self { items, total_price })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StatusBody {
    /// `pending`, `confirmed` or `cancelled`.
    #[schema(example = "confirmed")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimateBody {
    /// Minutes, at least one. Fractions are kept.
    #[serde(default)]
    #[schema(value_type = i64, example = 45)]
    pub estimated_delivery_time: Value,
}

/// Place a pending order for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = PlaceOrderBody,
    responses(
        (status = 201, description = "Order placed", body = OrderSchema),
        (status = 400, description = "Invalid order", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<PlaceOrderBody>,
) -> ApiResult<HttpResponse> {
    let request = PlaceOrderRequest::try_from(payload.into_inner())?;
    let order = state.orders.place(auth.caller(), request).await?;
    Ok(HttpResponse::Created().json(order))
}

/// The caller's orders, newest first, with products expanded.
#[utoipa::path(
    get,
    path = "/api/v1/orders/my",
    responses(
        (status = 200, description = "Own orders", body = [OrderViewSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "myOrders"
)]
#[get("/orders/my")]
pub async fn my_orders(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<web::Json<Vec<OrderView>>> {
    let orders = state.orders_query.my_orders(auth.caller()).await?;
    Ok(web::Json(orders))
}

/// Every order with owner details, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders/all",
    responses(
        (status = 200, description = "All orders", body = [OrderViewSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "allOrders"
)]
#[get("/orders/all")]
pub async fn all_orders(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<web::Json<Vec<OrderView>>> {
    let orders = state.orders_query.all_orders(auth.caller()).await?;
    Ok(web::Json(orders))
}

/// Administrator status override.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{orderId}/status",
    params(("orderId" = String, Path, description = "Order UUID")),
    request_body = StatusBody,
    responses(
        (status = 200, description = "Updated order", body = OrderSchema),
        (status = 400, description = "Invalid status", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Concurrent update", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "setOrderStatus"
)]
#[put("/orders/{order_id}/status")]
pub async fn set_order_status(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
    payload: web::Json<StatusBody>,
) -> ApiResult<web::Json<Order>> {
    let id = parse_order_id(&path)?;
    // A missing value is validated with the rest, after the role check.
    let status = payload.into_inner().status.unwrap_or_default();
    let order = state.orders.set_status(auth.caller(), id, &status).await?;
    Ok(web::Json(order))
}

/// Delete one of the caller's own orders, whatever its status.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{orderId}",
    params(("orderId" = String, Path, description = "Order UUID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "deleteOrder"
)]
#[delete("/orders/{order_id}")]
pub async fn delete_order(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_order_id(&path)?;
    state.orders.delete(auth.caller(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Cancel a pending order (owner or administrator).
#[utoipa::path(
    put,
    path = "/api/v1/orders/{orderId}/cancel",
    params(("orderId" = String, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Cancelled order", body = OrderSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Order is not pending", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "cancelOrder"
)]
#[put("/orders/{order_id}/cancel")]
pub async fn cancel_order(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Order>> {
    let id = parse_order_id(&path)?;
    let order = state.orders.cancel(auth.caller(), id).await?;
    Ok(web::Json(order))
}

/// Set the delivery estimate in minutes.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{orderId}/update-time",
    params(("orderId" = String, Path, description = "Order UUID")),
    request_body = EstimateBody,
    responses(
        (status = 200, description = "Updated order", body = OrderSchema),
        (status = 400, description = "Estimate is not a number", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "updateOrderEstimate"
)]
#[put("/orders/{order_id}/update-time")]
pub async fn update_estimate(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
    payload: web::Json<EstimateBody>,
) -> ApiResult<web::Json<Order>> {
    let id = parse_order_id(&path)?;
    let order = state
        .orders
        .update_estimate(auth.caller(), id, &payload.estimated_delivery_time)
        .await?;
    Ok(web::Json(order))
}

/// Mark any non-delivered order as delivered.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{orderId}/delivered",
    params(("orderId" = String, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Delivered order", body = OrderSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already delivered", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "markOrderDelivered"
)]
#[put("/orders/{order_id}/delivered")]
pub async fn mark_delivered(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Order>> {
    let id = parse_order_id(&path)?;
    let order = state.orders.mark_delivered(auth.caller(), id).await?;
    Ok(web::Json(order))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::ports::MockOrderCommand;
    use crate::domain::{
        Error, OrderId, OrderStatus, OrderValidationError, Role, TransitionError, UserId,
    };
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::{authorised, fixture_ports, test_app};
    use crate::test_support::caller;

    fn pending_order(owner: UserId) -> Order {
        let items = [LineItemInput {
            product_id: ProductId::random(),
            quantity: 2,
        }];
        Order::place(owner, &items, 500.0, Utc::now()).expect("valid order")
    }

    fn with_orders(orders: MockOrderCommand) -> HttpStatePorts {
        HttpStatePorts {
            orders: Arc::new(orders),
            ..fixture_ports()
        }
    }

    #[rstest]
    fn place_body_requires_total() {
        let body = PlaceOrderBody {
            products: Some(vec![]),
            total_price: None,
        };
        let err = PlaceOrderRequest::try_from(body).expect_err("missing total");
        assert_eq!(err.details().and_then(|d| d.get("field")), Some(&json!("totalPrice")));
    }

    #[rstest]
    fn place_body_treats_missing_products_as_empty() {
        let body = PlaceOrderBody {
            products: None,
            total_price: Some(10.0),
        };
        let request = PlaceOrderRequest::try_from(body).expect("shape is valid");
        assert!(request.items.is_empty());
    }

    #[rstest]
    fn place_body_rejects_bad_product_ids() {
        let body = PlaceOrderBody {
            products: Some(vec![LineItemBody {
                product_id: "64f0c0ffee".into(),
                quantity: 1,
            }]),
            total_price: Some(10.0),
        };
        let err = PlaceOrderRequest::try_from(body).expect_err("bad id");
        assert_eq!(err.details().and_then(|d| d.get("value")), Some(&json!("64f0c0ffee")));
    }

    #[actix_web::test]
    async fn place_returns_201_with_pending_order() {
        let customer = caller("guest@example.com", Role::User);
        let owner = customer.user_id;
        let mut orders = MockOrderCommand::new();
        orders
            .expect_place()
            .withf(|_, request| request.items.len() == 2 && request.total_price == 500.0)
            .times(1)
            .return_once(move |_, _| Ok(pending_order(owner)));
        let app = actix_test::init_service(test_app(with_orders(orders))).await;

        let payload = json!({
            "products": [
                {"productId": ProductId::random().to_string(), "quantity": 2},
                {"productId": ProductId::random().to_string(), "quantity": 1}
            ],
            "totalPrice": 500
        });
        let req = authorised(
            actix_test::TestRequest::post()
                .uri("/api/v1/orders")
                .set_json(payload),
            &customer,
        )
        .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["status"], json!("pending"));
        assert_eq!(body["estimatedDeliveryTime"], json!("45 minutes"));
    }

    #[actix_web::test]
    async fn cancel_conflict_is_409() {
        let customer = caller("guest@example.com", Role::User);
        let mut orders = MockOrderCommand::new();
        orders.expect_cancel().return_once(|_, _| {
            Err(TransitionError::NotPending {
                current: OrderStatus::Cancelled,
            }
            .into())
        });
        let app = actix_test::init_service(test_app(with_orders(orders))).await;

        let uri = format!("/api/v1/orders/{}/cancel", OrderId::random());
        let req = authorised(actix_test::TestRequest::put().uri(&uri), &customer).to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["status"], json!("cancelled"));
    }

    #[actix_web::test]
    async fn missing_status_is_validated_by_the_service() {
        let admin = caller("chef@example.com", Role::Admin);
        let mut orders = MockOrderCommand::new();
        orders
            .expect_set_status()
            .withf(|_, _, target| target.is_empty())
            .times(1)
            .return_once(|_, _, _| {
                Err(OrderValidationError::InvalidStatus {
                    value: String::new(),
                }
                .into())
            });
        let app = actix_test::init_service(test_app(with_orders(orders))).await;
        let uri = format!("/api/v1/orders/{}/status", OrderId::random());
        let req = authorised(
            actix_test::TestRequest::put().uri(&uri).set_json(json!({})),
            &admin,
        )
        .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn estimate_value_reaches_the_service_untouched() {
        let admin = caller("chef@example.com", Role::Admin);
        let mut orders = MockOrderCommand::new();
        orders
            .expect_update_estimate()
            .withf(|_, _, minutes| minutes == &json!("abc"))
            .return_once(|_, _, _| {
                Err(Error::invalid_request(
                    "estimated delivery time must be a number (minutes)",
                ))
            });
        let app = actix_test::init_service(test_app(with_orders(orders))).await;

        let uri = format!("/api/v1/orders/{}/update-time", OrderId::random());
        let req = authorised(
            actix_test::TestRequest::put()
                .uri(&uri)
                .set_json(json!({"estimatedDeliveryTime": "abc"})),
            &admin,
        )
        .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn my_orders_routes_ahead_of_order_ids() {
        let customer = caller("guest@example.com", Role::User);
        let app = actix_test::init_service(test_app(fixture_ports())).await;
        let req = authorised(actix_test::TestRequest::get().uri("/api/v1/orders/my"), &customer)
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn all_orders_is_admin_only() {
        let customer = caller("guest@example.com", Role::User);
        let app = actix_test::init_service(test_app(fixture_ports())).await;
        let req = authorised(actix_test::TestRequest::get().uri("/api/v1/orders/all"), &customer)
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn delete_returns_204() {
        let customer = caller("guest@example.com", Role::User);
        let mut orders = MockOrderCommand::new();
        orders.expect_delete().times(1).return_once(|_, _| Ok(()));
        let app = actix_test::init_service(test_app(with_orders(orders))).await;

        let uri = format!("/api/v1/orders/{}", OrderId::random());
        let req = authorised(actix_test::TestRequest::delete().uri(&uri), &customer).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
