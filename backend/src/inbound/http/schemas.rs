//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation.
//! The wrappers mirror the JSON shape of their domain counterparts but live in
//! the inbound adapter layer where framework concerns belong.
#![expect(
    dead_code,
    reason = "Schema wrappers are used only for OpenAPI generation via utoipa"
)]

use utoipa::ToSchema;

/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The resource is not in a state that allows the operation.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing store or collaborator is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = Error)]
#[schema(rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "order must contain products")]
    message: String,
    /// Correlation identifier echoed in the `Trace-Id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field-level context such as `{ "field", "code", "value" }`.
    details: Option<serde_json::Value>,
}

#[derive(ToSchema)]
#[schema(as = Role)]
pub enum RoleSchema {
    #[schema(rename = "user")]
    User,
    #[schema(rename = "admin")]
    Admin,
}

/// Account data safe to return to clients.
#[derive(ToSchema)]
#[schema(as = UserProfile)]
#[schema(rename_all = "camelCase")]
pub struct UserProfileSchema {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "Ada")]
    username: String,
    #[schema(example = "ada@example.com")]
    email: String,
    role: RoleSchema,
    profile_pic: Option<String>,
    created_at: String,
}

/// Claims of the authenticated caller.
#[derive(ToSchema)]
#[schema(as = Caller)]
#[schema(rename_all = "camelCase")]
pub struct CallerSchema {
    user_id: String,
    email: String,
    role: RoleSchema,
}

/// Issued bearer credential plus the account it belongs to.
#[derive(ToSchema)]
#[schema(as = AuthResponse)]
#[schema(rename_all = "camelCase")]
pub struct AuthResponseSchema {
    /// HS256 JWT to send as `Authorization: Bearer <token>`.
    token: String,
    /// RFC 3339 expiry, 30 days after issue.
    expires_at: String,
    user: UserProfileSchema,
}

#[derive(ToSchema)]
#[schema(as = ProductStatus)]
pub enum ProductStatusSchema {
    #[schema(rename = "active")]
    Active,
    #[schema(rename = "hidden")]
    Hidden,
}

/// Catalog entry.
#[derive(ToSchema)]
#[schema(as = Product)]
#[schema(rename_all = "camelCase")]
pub struct ProductSchema {
    id: String,
    #[schema(example = "Jollof rice tray")]
    name: String,
    description: Option<String>,
    #[schema(example = 120.0)]
    price: f64,
    image_url: Option<String>,
    status: ProductStatusSchema,
    created_by: String,
    created_at: String,
    updated_at: String,
}

#[derive(ToSchema)]
#[schema(as = OrderStatus)]
pub enum OrderStatusSchema {
    #[schema(rename = "pending")]
    Pending,
    #[schema(rename = "confirmed")]
    Confirmed,
    #[schema(rename = "cancelled")]
    Cancelled,
    #[schema(rename = "delivered")]
    Delivered,
}

#[derive(ToSchema)]
#[schema(as = LineItem)]
#[schema(rename_all = "camelCase")]
pub struct LineItemSchema {
    product_id: String,
    #[schema(minimum = 1)]
    quantity: u32,
}

/// Stored order as returned by mutating endpoints.
///
/// `estimatedDeliveryTime` is a number of minutes or free text such as
/// `"45 minutes"`.
#[derive(ToSchema)]
#[schema(as = Order)]
#[schema(rename_all = "camelCase")]
pub struct OrderSchema {
    id: String,
    user_id: String,
    products: Vec<LineItemSchema>,
    total_price: f64,
    #[schema(value_type = Object, example = 45)]
    estimated_delivery_time: serde_json::Value,
    status: OrderStatusSchema,
    created_at: String,
    updated_at: String,
}

/// Line item with its product resolved; `product` is null when deleted.
#[derive(ToSchema)]
#[schema(as = ExpandedLineItem)]
#[schema(rename_all = "camelCase")]
pub struct ExpandedLineItemSchema {
    product_id: String,
    quantity: u32,
    product: Option<ProductSchema>,
}

#[derive(ToSchema)]
#[schema(as = OwnerSummary)]
pub struct OwnerSummarySchema {
    id: String,
    username: String,
    email: String,
}

/// Order as returned by listing endpoints.
#[derive(ToSchema)]
#[schema(as = OrderView)]
#[schema(rename_all = "camelCase")]
pub struct OrderViewSchema {
    id: String,
    user_id: String,
    /// Present in the administrator listing only.
    owner: Option<OwnerSummarySchema>,
    products: Vec<ExpandedLineItemSchema>,
    total_price: f64,
    #[schema(value_type = Object, example = "45 minutes")]
    estimated_delivery_time: serde_json::Value,
    status: OrderStatusSchema,
    created_at: String,
    updated_at: String,
}
