//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose details carry
//! `{ "field", "code", "value"? }` so clients can highlight the failing input.

use serde_json::json;

use crate::domain::{
    CredentialValidationError, Error, OrderId, ProductId, ProductValidationError,
    UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
    InvalidToken,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidToken => "invalid_token",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const PRODUCT_ID: FieldName = FieldName::new("productId");
pub(crate) const ORDER_ID: FieldName = FieldName::new("orderId");

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_product_id(raw: &str) -> Result<ProductId, Error> {
    ProductId::new(raw).map_err(|_| invalid_uuid_error(PRODUCT_ID, raw))
}

pub(crate) fn parse_order_id(raw: &str) -> Result<OrderId, Error> {
    OrderId::new(raw).map_err(|_| invalid_uuid_error(ORDER_ID, raw))
}

pub(crate) fn user_field_error(field: FieldName, err: &UserValidationError) -> Error {
    ValidationError::new(field.as_str(), err.to_string()).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn credential_error(err: CredentialValidationError) -> Error {
    let code = match err {
        CredentialValidationError::MalformedResetToken => ErrorCode::InvalidToken,
        _ => ErrorCode::InvalidValue,
    };
    ValidationError::new(err.field(), err.to_string()).with_code(code)
}

pub(crate) fn product_error(err: ProductValidationError) -> Error {
    let validation = ValidationError::new(err.field(), err.to_string());
    match &err {
        ProductValidationError::InvalidStatusFilter { value }
        | ProductValidationError::InvalidStatus { value } => {
            validation.with_value(ErrorCode::InvalidValue, value.clone())
        }
        ProductValidationError::InvalidPrice { value } => {
            validation.with_value(ErrorCode::InvalidValue, value.to_string())
        }
        _ => validation.with_code(ErrorCode::InvalidValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    #[rstest]
    fn invalid_uuid_details_echo_the_value() {
        let err = parse_order_id("abc").expect_err("not a uuid");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "orderId", "value": "abc", "code": "invalid_uuid" }))
        );
    }

    #[rstest]
    fn product_ids_parse() {
        let id = parse_product_id("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    fn malformed_reset_tokens_use_the_token_code() {
        let err = credential_error(CredentialValidationError::MalformedResetToken);
        assert_eq!(
            err.details(),
            Some(&json!({ "field": "token", "code": "invalid_token" }))
        );
    }

    #[rstest]
    #[case(ProductValidationError::EmptyName, "name", None)]
    #[case(
        ProductValidationError::InvalidStatusFilter { value: "gone".into() },
        "status",
        Some("gone")
    )]
    fn product_errors_name_the_field(
        #[case] source: ProductValidationError,
        #[case] field: &str,
        #[case] value: Option<&str>,
    ) {
        let err = product_error(source);
        let details = err.details().expect("details");
        assert_eq!(details["field"], json!(field));
        assert_eq!(details.get("value").and_then(|v| v.as_str()), value);
    }

    #[rstest]
    fn missing_fields_are_reported() {
        let err = missing_field_error(FieldName::new("password"));
        assert_eq!(err.message(), "missing required field: password");
    }
}
