//! Translation of driven-port failures into domain errors.
//!
//! Connection failures become `service_unavailable`; query failures become
//! `internal_error` and are redacted at the HTTP boundary.

use serde_json::json;
use tracing::warn;

use super::Error;
use super::ports::{
    AccessTokenError, BlobStoreError, MailerError, OrderRepositoryError, PasswordHashError,
    ProductRepositoryError, UserPersistenceError,
};

pub(crate) fn map_product_error(error: ProductRepositoryError) -> Error {
    match error {
        ProductRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("product repository unavailable: {message}"))
        }
        ProductRepositoryError::Query { message } => {
            Error::internal(format!("product repository error: {message}"))
        }
    }
}

pub(crate) fn map_order_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("order repository unavailable: {message}"))
        }
        OrderRepositoryError::Query { message } => {
            Error::internal(format!("order repository error: {message}"))
        }
        OrderRepositoryError::StatusChanged { expected } => {
            warn!(expected = %expected, "order transition lost a concurrent update");
            Error::conflict("order was modified concurrently").with_details(json!({
                "code": "concurrent_update",
                "expectedStatus": expected,
            }))
        }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => duplicate_email(),
    }
}

pub(crate) fn duplicate_email() -> Error {
    Error::conflict("user already exists").with_details(json!({
        "field": "email",
        "code": "duplicate_email",
    }))
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_token_error(error: AccessTokenError) -> Error {
    match error {
        AccessTokenError::Expired | AccessTokenError::Invalid { .. } => {
            Error::unauthorized("invalid or expired token")
        }
        AccessTokenError::Signing { message } => {
            Error::internal(format!("failed to issue access token: {message}"))
        }
    }
}

pub(crate) fn map_mailer_error(error: MailerError) -> Error {
    match error {
        MailerError::Unavailable { message } => {
            Error::service_unavailable(format!("mail relay unavailable: {message}"))
        }
        MailerError::Rejected { message } => {
            Error::internal(format!("mail relay rejected message: {message}"))
        }
    }
}

pub(crate) fn map_blob_error(error: BlobStoreError) -> Error {
    match error {
        BlobStoreError::Unavailable { message } => {
            Error::service_unavailable(format!("image store unavailable: {message}"))
        }
        BlobStoreError::Write { message } => {
            Error::internal(format!("failed to store image: {message}"))
        }
    }
}
