//! Orders and their status lifecycle.
//!
//! The [`Order`] aggregate owns every state rule. Services check existence and
//! permission first, then ask the aggregate to apply a transition, then
//! persist it with a conditional write keyed on the status they read.
//!
//! ```text
//! pending ──confirm──▶ confirmed ──deliver──▶ delivered
//!    │                     │
//!    └──cancel──▶ cancelled ◀──(admin set-status)
//! ```
//!
//! Administrators may set `pending`, `confirmed` or `cancelled` from any
//! state, and mark any non-delivered order as delivered.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{Email, Error, Price, Product, ProductId, UserId, Username};

/// Estimate attached to freshly placed orders.
pub const PLACEMENT_ESTIMATE: &str = "45 minutes";
/// Estimate applied when an administrator moves an order back to pending.
pub const PENDING_RESET_MINUTES: u32 = 30;
/// Estimate assumed for stored rows that carry none.
pub const LEGACY_DEFAULT_ESTIMATE: &str = "30";

/// Validation errors raised while building or updating orders.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("order id must be a valid UUID")]
    InvalidId,
    #[error("order must contain products")]
    EmptyOrder,
    #[error("quantity must be at least 1")]
    InvalidQuantity { index: usize },
    #[error("total price must be a finite, non-negative number")]
    InvalidTotal,
    #[error("invalid status value")]
    InvalidStatus { value: String },
    #[error("estimated delivery time must be a number (minutes)")]
    EstimateNotNumber,
    #[error("estimated delivery time must be at least 1 minute")]
    EstimateTooSmall,
    #[error("estimated delivery time is too large")]
    EstimateTooLarge,
}

impl OrderValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "orderId",
            Self::EmptyOrder | Self::InvalidQuantity { .. } => "products",
            Self::InvalidTotal => "totalPrice",
            Self::InvalidStatus { .. } => "status",
            Self::EstimateNotNumber
            | Self::EstimateTooSmall
            | Self::EstimateTooLarge => "estimatedDeliveryTime",
        }
    }

    /// Stable sub-code for error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_id",
            Self::EmptyOrder => "empty_order",
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::InvalidTotal => "invalid_total",
            Self::InvalidStatus { .. } => "invalid_status",
            Self::EstimateNotNumber => "estimate_not_number",
            Self::EstimateTooSmall => "estimate_too_small",
            Self::EstimateTooLarge => "estimate_too_large",
        }
    }
}

impl From<OrderValidationError> for Error {
    fn from(value: OrderValidationError) -> Self {
        let mut details = serde_json::json!({
            "field": value.field(),
            "code": value.code(),
        });
        match &value {
            OrderValidationError::InvalidStatus { value: raw } => {
                details["value"] = Value::String(raw.clone());
            }
            OrderValidationError::InvalidQuantity { index } => {
                details["index"] = Value::from(*index);
            }
            _ => {}
        }
        Error::invalid_request(value.to_string()).with_details(details)
    }
}

/// Rejected state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("only pending orders can be cancelled (current status: {current})")]
    NotPending { current: OrderStatus },
    #[error("order is already marked as delivered")]
    AlreadyDelivered,
}

impl From<TransitionError> for Error {
    fn from(value: TransitionError) -> Self {
        let current = match value {
            TransitionError::NotPending { current } => current,
            TransitionError::AlreadyDelivered => OrderStatus::Delivered,
        };
        Error::conflict(value.to_string())
            .with_details(serde_json::json!({ "status": current.as_str() }))
    }
}

/// Stable order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new(id: impl AsRef<str>) -> Result<Self, OrderValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| OrderValidationError::InvalidId)
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Delivered => "delivered",
        }
    }

    /// Parse a target accepted by the administrator set-status operation.
    ///
    /// Only `pending`, `confirmed` and `cancelled` are settable; `delivered`
    /// has its own operation.
    pub fn settable(raw: &str) -> Result<Self, OrderValidationError> {
        match raw.parse::<Self>() {
            Ok(status @ (Self::Pending | Self::Confirmed | Self::Cancelled)) => Ok(status),
            Ok(Self::Delivered) | Err(_) => Err(OrderValidationError::InvalidStatus {
                value: raw.to_owned(),
            }),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "delivered" => Ok(Self::Delivered),
            other => Err(OrderValidationError::InvalidStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Delivery estimate: free text (placement default) or minutes.
///
/// Whole values stay integral on the wire; fractional ones such as `12.5`
/// are kept as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeliveryEstimate {
    Minutes(u32),
    FractionalMinutes(f64),
    Text(String),
}

impl DeliveryEstimate {
    pub fn placement_default() -> Self {
        Self::Text(PLACEMENT_ESTIMATE.to_owned())
    }

    pub fn legacy_default() -> Self {
        Self::Text(LEGACY_DEFAULT_ESTIMATE.to_owned())
    }

    /// Validate an administrator-supplied estimate.
    ///
    /// The value must be a JSON number of at least one minute. Numeric
    /// strings such as `"45"` are rejected.
    ///
    /// # Examples
    /// ```
    /// use catering::domain::DeliveryEstimate;
    /// use serde_json::json;
    ///
    /// assert_eq!(
    ///     DeliveryEstimate::minutes_from_json(&json!(45)),
    ///     Ok(DeliveryEstimate::Minutes(45))
    /// );
    /// assert!(DeliveryEstimate::minutes_from_json(&json!("abc")).is_err());
    /// ```
    pub fn minutes_from_json(value: &Value) -> Result<Self, OrderValidationError> {
        let Value::Number(number) = value else {
            return Err(OrderValidationError::EstimateNotNumber);
        };
        if let Some(minutes) = number.as_u64() {
            return match u32::try_from(minutes) {
                Ok(0) => Err(OrderValidationError::EstimateTooSmall),
                Ok(m) => Ok(Self::Minutes(m)),
                Err(_) => Err(OrderValidationError::EstimateTooLarge),
            };
        }
        if number.as_i64().is_some() {
            return Err(OrderValidationError::EstimateTooSmall);
        }
        let Some(float) = number.as_f64() else {
            return Err(OrderValidationError::EstimateNotNumber);
        };
        if float < 1.0 {
            return Err(OrderValidationError::EstimateTooSmall);
        }
        if float > f64::from(u32::MAX) {
            return Err(OrderValidationError::EstimateTooLarge);
        }
        if float.fract() != 0.0 {
            return Ok(Self::FractionalMinutes(float));
        }
        // `45.0` is stored as whole minutes.
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "bounds checked above"
        )]
        let minutes = float as u32;
        Ok(Self::Minutes(minutes))
    }
}

impl fmt::Display for DeliveryEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes(m) => write!(f, "{m}"),
            Self::FractionalMinutes(m) => write!(f, "{m}"),
            Self::Text(t) => f.write_str(t),
        }
    }
}

/// Quantity of a product within an order. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Option<Self> {
        (value >= 1).then_some(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// A product reference plus quantity. The reference is weak: the product may
/// have since been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Unvalidated line item as submitted by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItemInput {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(rename = "products")]
    pub line_items: Vec<LineItem>,
    pub total_price: Price,
    pub estimated_delivery_time: DeliveryEstimate,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a pending order owned by `owner`.
    ///
    /// The total is trusted as supplied; no catalog lookup is performed.
    pub fn place(
        owner: UserId,
        items: &[LineItemInput],
        total_price: f64,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderValidationError> {
        if items.is_empty() {
            return Err(OrderValidationError::EmptyOrder);
        }
        let line_items = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                u32::try_from(item.quantity)
                    .ok()
                    .and_then(Quantity::new)
                    .map(|quantity| LineItem {
                        product_id: item.product_id,
                        quantity,
                    })
                    .ok_or(OrderValidationError::InvalidQuantity { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let total_price =
            Price::new(total_price).map_err(|_| OrderValidationError::InvalidTotal)?;
        Ok(Self {
            id: OrderId::random(),
            user_id: owner,
            line_items,
            total_price,
            estimated_delivery_time: DeliveryEstimate::placement_default(),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Cancel a pending order. Any other status is left untouched.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.status != OrderStatus::Pending {
            return Err(TransitionError::NotPending {
                current: self.status,
            });
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Apply an administrator status change.
    ///
    /// Moving to pending resets the estimate to [`PENDING_RESET_MINUTES`].
    pub fn set_status(&mut self, target: OrderStatus, now: DateTime<Utc>) {
        self.status = target;
        if target == OrderStatus::Pending {
            self.estimated_delivery_time = DeliveryEstimate::Minutes(PENDING_RESET_MINUTES);
        }
        self.updated_at = now;
    }

    pub fn update_estimate(&mut self, estimate: DeliveryEstimate, now: DateTime<Utc>) {
        self.estimated_delivery_time = estimate;
        self.updated_at = now;
    }

    pub fn mark_delivered(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.status == OrderStatus::Delivered {
            return Err(TransitionError::AlreadyDelivered);
        }
        self.status = OrderStatus::Delivered;
        self.updated_at = now;
        Ok(())
    }
}

/// Line item with the referenced product resolved, or `None` when dangling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedLineItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub product: Option<Product>,
}

/// Owner fields shown to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
}

/// Order as returned by listing queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerSummary>,
    pub products: Vec<ExpandedLineItem>,
    pub total_price: Price,
    pub estimated_delivery_time: DeliveryEstimate,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderView {
    /// Expand `order` using `lookup` to resolve product references.
    pub fn expand<F>(order: Order, owner: Option<OwnerSummary>, mut lookup: F) -> Self
    where
        F: FnMut(&ProductId) -> Option<Product>,
    {
        let products = order
            .line_items
            .into_iter()
            .map(|item| ExpandedLineItem {
                product: lookup(&item.product_id),
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect();
        Self {
            id: order.id,
            user_id: order.user_id,
            owner,
            products,
            total_price: order.total_price,
            estimated_delivery_time: order.estimated_delivery_time,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
