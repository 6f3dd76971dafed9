//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every handler under `/api/v1` plus the health probes
//! - **Schemas**: wrappers from [`crate::inbound::http::schemas`] that describe
//!   domain types without coupling them to utoipa, and the request bodies
//!   declared next to their handlers
//! - **Security**: bearer JWT authentication, applied to every operation that
//!   does not opt out with `security([])`
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::orders::{EstimateBody, LineItemBody, PlaceOrderBody, StatusBody};
use crate::inbound::http::products::NewProductRequest;
use crate::inbound::http::schemas::{
    AuthResponseSchema, CallerSchema, ErrorCodeSchema, ErrorSchema, ExpandedLineItemSchema,
    LineItemSchema, OrderSchema, OrderStatusSchema, OrderViewSchema, OwnerSummarySchema,
    ProductSchema, ProductStatusSchema, RoleSchema, UserProfileSchema,
};
use crate::inbound::http::uploads::UploadResponse;
use crate::inbound::http::users::{
    ForgotPasswordRequest, LoginRequest, ProfileRequest, RegisterRequest, ResetPasswordRequest,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token returned by POST /api/v1/users/register or /api/v1/users/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Catering ordering API",
        description = "Accounts, product catalog and order lifecycle for a catering shop."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::forgot_password,
        crate::inbound::http::users::reset_password,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::products::hide_product,
        crate::inbound::http::products::restore_product,
        crate::inbound::http::orders::place_order,
        crate::inbound::http::orders::my_orders,
        crate::inbound::http::orders::all_orders,
        crate::inbound::http::orders::set_order_status,
        crate::inbound::http::orders::delete_order,
        crate::inbound::http::orders::cancel_order,
        crate::inbound::http::orders::update_estimate,
        crate::inbound::http::orders::mark_delivered,
        crate::inbound::http::uploads::upload_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RoleSchema,
        UserProfileSchema,
        CallerSchema,
        AuthResponseSchema,
        ProductStatusSchema,
        ProductSchema,
        OrderStatusSchema,
        LineItemSchema,
        OrderSchema,
        ExpandedLineItemSchema,
        OwnerSummarySchema,
        OrderViewSchema,
        RegisterRequest,
        LoginRequest,
        ProfileRequest,
        ForgotPasswordRequest,
        ResetPasswordRequest,
        NewProductRequest,
        LineItemBody,
        PlaceOrderBody,
        StatusBody,
        EstimateBody,
        UploadResponse,
    )),
    tags(
        (name = "users", description = "Registration, login, profile and password reset"),
        (name = "products", description = "Catalog browsing and administration"),
        (name = "orders", description = "Order placement and lifecycle"),
        (name = "uploads", description = "Image storage"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
