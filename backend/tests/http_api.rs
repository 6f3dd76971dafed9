//! End-to-end HTTP tests over the in-memory stores.
//!
//! Each test builds the full `/api/v1` surface with real services, so
//! validation, authorisation and persistence run together.

#[path = "support/app.rs"]
mod app;

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test::{self, TestRequest};
use catering::domain::TRACE_ID_HEADER;
use serde_json::{Value, json};

use app::{TestStack, register, send, with_bearer};

async fn create_product<S, B>(app: &S, admin: &str, name: &str, price: f64) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let req = with_bearer(TestRequest::post().uri("/api/v1/products"), admin)
        .set_json(json!({ "name": name, "price": price }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create product failed: {body}");
    body["id"].as_str().expect("product id").to_owned()
}

fn ids(listing: &Value) -> Vec<String> {
    listing
        .as_array()
        .expect("array body")
        .iter()
        .filter_map(|entry| entry["id"].as_str().map(str::to_owned))
        .collect()
}

#[actix_web::test]
async fn registration_login_and_claims() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;

    let (bearer, user_id) = register(&app, "Ada", "ada@example.com", "s3cret").await;

    let me = with_bearer(TestRequest::get().uri("/api/v1/users/me"), &bearer).to_request();
    let (status, claims) = send(&app, me).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(claims["userId"], user_id.as_str());
    assert_eq!(claims["email"], "ada@example.com");
    assert_eq!(claims["role"], "user");

    let login = TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "email": "ada@example.com", "password": "s3cret" }))
        .to_request();
    let (status, session) = send(&app, login).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["role"], "user");
    assert!(session["expiresAt"].is_string());

    let duplicate = TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(json!({ "username": "Ada2", "email": "ada@example.com", "password": "x" }))
        .to_request();
    let (status, body) = send(&app, duplicate).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[actix_web::test]
async fn wrong_password_is_unauthorised_with_trace_id() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;
    register(&app, "Ada", "ada@example.com", "s3cret").await;

    let req = TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "email": "ada@example.com", "password": "wrong" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["traceId"], header.as_str());
}

#[actix_web::test]
async fn catalog_administration_and_visibility() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;
    let admin = stack.admin_bearer();
    let (customer, _) = register(&app, "Bola", "bola@example.com", "pw").await;

    let rice = create_product(&app, &admin, "Jollof rice tray", 120.0).await;
    let chops = create_product(&app, &admin, "Small chops platter", 80.0).await;

    let forbidden = with_bearer(TestRequest::post().uri("/api/v1/products"), &customer)
        .set_json(json!({ "name": "Puff puff", "price": 10.0 }))
        .to_request();
    let (status, _) = send(&app, forbidden).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let customer_hide = with_bearer(
        TestRequest::put().uri(&format!("/api/v1/products/{rice}/hide")),
        &customer,
    )
    .to_request();
    let (status, _) = send(&app, customer_hide).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let hide = with_bearer(
        TestRequest::put().uri(&format!("/api/v1/products/{rice}/hide")),
        &admin,
    )
    .to_request();
    let (status, hidden) = send(&app, hide).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hidden["status"], "hidden");

    let (_, active) = send(&app, TestRequest::get().uri("/api/v1/products").to_request()).await;
    assert_eq!(ids(&active), vec![chops.clone()]);

    let (_, hidden_listing) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/products?status=hidden")
            .to_request(),
    )
    .await;
    assert_eq!(ids(&hidden_listing), vec![rice.clone()]);

    let (_, cheap) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/products?status=all&maxPrice=100")
            .to_request(),
    )
    .await;
    assert_eq!(ids(&cheap), vec![chops]);

    let restore = with_bearer(
        TestRequest::put().uri(&format!("/api/v1/products/{rice}/restore")),
        &admin,
    )
    .to_request();
    let (status, restored) = send(&app, restore).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["status"], "active");

    let delete = with_bearer(
        TestRequest::delete().uri(&format!("/api/v1/products/{rice}")),
        &admin,
    )
    .to_request();
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        TestRequest::get()
            .uri(&format!("/api/v1/products/{rice}"))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn order_lifecycle_over_http() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;
    let admin = stack.admin_bearer();
    let (customer, customer_id) = register(&app, "Chidi", "chidi@example.com", "pw").await;
    let rice = create_product(&app, &admin, "Jollof rice tray", 120.0).await;
    let chops = create_product(&app, &admin, "Small chops platter", 80.0).await;

    let place = with_bearer(TestRequest::post().uri("/api/v1/orders"), &customer)
        .set_json(json!({
            "products": [
                { "productId": rice, "quantity": 2 },
                { "productId": chops, "quantity": 1 }
            ],
            "totalPrice": 500
        }))
        .to_request();
    let (status, order) = send(&app, place).await;
    assert_eq!(status, StatusCode::CREATED, "place failed: {order}");
    assert_eq!(order["status"], "pending");
    assert_eq!(order["estimatedDeliveryTime"], "45 minutes");
    assert_eq!(order["totalPrice"], 500.0);
    let order_id = order["id"].as_str().expect("order id").to_owned();

    let mine = with_bearer(TestRequest::get().uri("/api/v1/orders/my"), &customer).to_request();
    let (status, mine) = send(&app, mine).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine[0]["products"][0]["product"]["name"], "Jollof rice tray");

    let all_as_customer =
        with_bearer(TestRequest::get().uri("/api/v1/orders/all"), &customer).to_request();
    let (status, _) = send(&app, all_as_customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let all = with_bearer(TestRequest::get().uri("/api/v1/orders/all"), &admin).to_request();
    let (_, all) = send(&app, all).await;
    assert_eq!(all[0]["owner"]["id"], customer_id.as_str());
    assert_eq!(all[0]["owner"]["email"], "chidi@example.com");

    let confirm = with_bearer(
        TestRequest::put().uri(&format!("/api/v1/orders/{order_id}/status")),
        &admin,
    )
    .set_json(json!({ "status": "confirmed" }))
    .to_request();
    let (status, confirmed) = send(&app, confirm).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "confirmed");

    let estimate = with_bearer(
        TestRequest::put().uri(&format!("/api/v1/orders/{order_id}/update-time")),
        &admin,
    )
    .set_json(json!({ "estimatedDeliveryTime": 45 }))
    .to_request();
    let (status, estimated) = send(&app, estimate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(estimated["estimatedDeliveryTime"], 45);

    let bad_estimate = with_bearer(
        TestRequest::put().uri(&format!("/api/v1/orders/{order_id}/update-time")),
        &admin,
    )
    .set_json(json!({ "estimatedDeliveryTime": "abc" }))
    .to_request();
    let (status, body) = send(&app, bad_estimate).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");

    let cancel = with_bearer(
        TestRequest::put().uri(&format!("/api/v1/orders/{order_id}/cancel")),
        &customer,
    )
    .to_request();
    let (status, body) = send(&app, cancel).await;
    assert_eq!(status, StatusCode::CONFLICT, "confirmed orders cannot be cancelled: {body}");

    let deliver = with_bearer(
        TestRequest::put().uri(&format!("/api/v1/orders/{order_id}/delivered")),
        &admin,
    )
    .to_request();
    let (status, delivered) = send(&app, deliver).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["status"], "delivered");
    assert_eq!(delivered["estimatedDeliveryTime"], 45);

    let mine = with_bearer(TestRequest::get().uri("/api/v1/orders/my"), &customer).to_request();
    let (_, mine) = send(&app, mine).await;
    assert_eq!(mine[0]["status"], "delivered");
}

#[actix_web::test]
async fn pending_orders_cancel_once_and_delete_is_owner_scoped() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;
    let admin = stack.admin_bearer();
    let (owner, _) = register(&app, "Dami", "dami@example.com", "pw").await;
    let (stranger, _) = register(&app, "Eze", "eze@example.com", "pw").await;
    let rice = create_product(&app, &admin, "Jollof rice tray", 120.0).await;

    let place = with_bearer(TestRequest::post().uri("/api/v1/orders"), &owner)
        .set_json(json!({
            "products": [{ "productId": rice, "quantity": 1 }],
            "totalPrice": 120
        }))
        .to_request();
    let (_, order) = send(&app, place).await;
    let order_id = order["id"].as_str().expect("order id").to_owned();
    let cancel_uri = format!("/api/v1/orders/{order_id}/cancel");

    let (status, _) = send(
        &app,
        with_bearer(TestRequest::put().uri(&cancel_uri), &stranger).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, cancelled) = send(
        &app,
        with_bearer(TestRequest::put().uri(&cancel_uri), &owner).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, _) = send(
        &app,
        with_bearer(TestRequest::put().uri(&cancel_uri), &owner).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let delete_uri = format!("/api/v1/orders/{order_id}");
    let (status, _) = send(
        &app,
        with_bearer(TestRequest::delete().uri(&delete_uri), &stranger).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        with_bearer(TestRequest::delete().uri(&delete_uri), &owner).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn empty_orders_are_rejected() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;
    let (customer, _) = register(&app, "Funmi", "funmi@example.com", "pw").await;

    let place = with_bearer(TestRequest::post().uri("/api/v1/orders"), &customer)
        .set_json(json!({ "products": [], "totalPrice": 0 }))
        .to_request();
    let (status, body) = send(&app, place).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn password_reset_round_trip() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;
    register(&app, "Gbenga", "gbenga@example.com", "old-password").await;

    let forgot = TestRequest::post()
        .uri("/api/v1/users/forgot-password")
        .set_json(json!({ "email": "gbenga@example.com" }))
        .to_request();
    let (status, _) = send(&app, forgot).await;
    assert_eq!(status, StatusCode::OK);

    let sent = stack.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains(app::CLIENT_URL));
    let token = stack.mailer.last_reset_token().expect("reset token in email");
    assert_eq!(token.len(), 64);

    let reset_uri = format!("/api/v1/users/reset-password/{token}");
    let reset = TestRequest::post()
        .uri(&reset_uri)
        .set_json(json!({ "password": "new-password" }))
        .to_request();
    let (status, _) = send(&app, reset).await;
    assert_eq!(status, StatusCode::OK);

    let reused = TestRequest::post()
        .uri(&reset_uri)
        .set_json(json!({ "password": "another" }))
        .to_request();
    let (status, _) = send(&app, reused).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let old_login = TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "email": "gbenga@example.com", "password": "old-password" }))
        .to_request();
    let (status, _) = send(&app, old_login).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let new_login = TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({ "email": "gbenga@example.com", "password": "new-password" }))
        .to_request();
    let (status, _) = send(&app, new_login).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn forgot_password_for_unknown_email_is_not_found() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;

    let forgot = TestRequest::post()
        .uri("/api/v1/users/forgot-password")
        .set_json(json!({ "email": "nobody@example.com" }))
        .to_request();
    let (status, _) = send(&app, forgot).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(stack.mailer.sent().is_empty());
}

#[actix_web::test]
async fn profile_update_changes_only_supplied_fields() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;
    let (bearer, _) = register(&app, "Hauwa", "hauwa@example.com", "pw").await;

    let update = with_bearer(TestRequest::put().uri("/api/v1/users/profile"), &bearer)
        .set_json(json!({ "profilePic": "/uploads/me.png" }))
        .to_request();
    let (status, profile) = send(&app, update).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "Hauwa");
    assert_eq!(profile["profilePic"], "/uploads/me.png");
}

#[actix_web::test]
async fn uploads_store_the_image_and_return_its_url() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;
    let (bearer, _) = register(&app, "Ife", "ife@example.com", "pw").await;

    let upload = with_bearer(TestRequest::post().uri("/api/v1/uploads"), &bearer)
        .insert_header((CONTENT_TYPE, "image/png"))
        .set_payload(&b"\x89PNG\r\n\x1a\n"[..])
        .to_request();
    let (status, body) = send(&app, upload).await;
    assert_eq!(status, StatusCode::OK);
    let url = body["imageUrl"].as_str().expect("image url");
    let name = url.strip_prefix("/uploads/").expect("public prefix");
    assert!(name.ends_with(".png"));
    assert!(stack.upload_dir().join(name).is_file());

    let empty = with_bearer(TestRequest::post().uri("/api/v1/uploads"), &bearer)
        .insert_header((CONTENT_TYPE, "image/jpeg"))
        .to_request();
    let (status, _) = send(&app, empty).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn status_changes_check_role_then_value_then_order() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;
    let admin = stack.admin_bearer();
    let (customer, _) = register(&app, "Jide", "jide@example.com", "pw").await;
    let unknown = format!("/api/v1/orders/{}/status", uuid::Uuid::new_v4());

    let as_customer = with_bearer(TestRequest::put().uri(&unknown), &customer)
        .set_json(json!({ "status": "confirmed" }))
        .to_request();
    let (status, _) = send(&app, as_customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let missing_value = with_bearer(TestRequest::put().uri(&unknown), &admin)
        .set_json(json!({}))
        .to_request();
    let (status, body) = send(&app, missing_value).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "status");

    let unknown_order = with_bearer(TestRequest::put().uri(&unknown), &admin)
        .set_json(json!({ "status": "confirmed" }))
        .to_request();
    let (status, _) = send(&app, unknown_order).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn fractional_estimates_are_kept() {
    let stack = TestStack::new();
    let app = test::init_service(stack.app()).await;
    let admin = stack.admin_bearer();
    let (customer, _) = register(&app, "Kemi", "kemi@example.com", "pw").await;
    let rice = create_product(&app, &admin, "Jollof rice tray", 120.0).await;

    let place = with_bearer(TestRequest::post().uri("/api/v1/orders"), &customer)
        .set_json(json!({
            "products": [{ "productId": rice, "quantity": 1 }],
            "totalPrice": 120
        }))
        .to_request();
    let (_, order) = send(&app, place).await;
    let order_id = order["id"].as_str().expect("order id").to_owned();

    let estimate = with_bearer(
        TestRequest::put().uri(&format!("/api/v1/orders/{order_id}/update-time")),
        &admin,
    )
    .set_json(json!({ "estimatedDeliveryTime": 12.5 }))
    .to_request();
    let (status, updated) = send(&app, estimate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["estimatedDeliveryTime"], 12.5);

    let too_small = with_bearer(
        TestRequest::put().uri(&format!("/api/v1/orders/{order_id}/update-time")),
        &admin,
    )
    .set_json(json!({ "estimatedDeliveryTime": 0.5 }))
    .to_request();
    let (status, _) = send(&app, too_small).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
