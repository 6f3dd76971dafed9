//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed entities for accounts, the product catalog
//! and orders, plus the services that drive them through the ports in
//! [`ports`]. Types validate on construction; serde contracts are documented
//! on each type.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - User, Caller: stored accounts and the authenticated principal.
//! - Product, ProductListQuery: catalog entries and listing filters.
//! - Order, OrderView: the order aggregate and its expanded read model.
//! - OrderLifecycleService, CatalogService, AccountService,
//!   ImageUploadService: implementations of the driving ports.

pub mod access;
pub mod account_service;
pub mod auth;
pub mod catalog_service;
pub mod error;
pub mod order;
pub mod order_service;
pub(crate) mod port_error_mapping;
pub mod ports;
pub mod product;
pub mod trace_id;
pub mod upload_service;
pub mod user;

pub use self::access::Caller;
pub use self::account_service::{AccountCollaborators, AccountService, RESET_TOKEN_TTL_MINUTES};
pub use self::auth::{
    CredentialValidationError, LoginCredentials, NewPassword, RESET_TOKEN_BYTES,
    RegistrationDetails, ResetToken,
};
pub use self::catalog_service::CatalogService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::order::{
    DeliveryEstimate, ExpandedLineItem, LEGACY_DEFAULT_ESTIMATE, LineItem, LineItemInput, Order,
    OrderId, OrderStatus, OrderValidationError, OrderView, OwnerSummary, PENDING_RESET_MINUTES,
    PLACEMENT_ESTIMATE, Quantity, TransitionError,
};
pub use self::order_service::OrderLifecycleService;
pub use self::product::{
    NewProduct, Price, Product, ProductId, ProductListQuery, ProductName, ProductStatus,
    ProductValidationError, StatusFilter,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::upload_service::ImageUploadService;
pub use self::user::{
    Email, PasswordReset, Role, USERNAME_MAX, User, UserId, UserProfile, UserValidationError,
    Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use catering::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
