//! Catalog products and listing filters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Validation errors raised by product value constructors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProductValidationError {
    #[error("product id must be a valid UUID")]
    InvalidId,
    #[error("product name must not be empty")]
    EmptyName,
    #[error("price must be a finite, non-negative number")]
    InvalidPrice { value: f64 },
    #[error("status must be one of active, hidden or all")]
    InvalidStatusFilter { value: String },
    #[error("status must be active or hidden")]
    InvalidStatus { value: String },
    #[error("minPrice must not exceed maxPrice")]
    InvertedPriceRange,
}

impl ProductValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "productId",
            Self::EmptyName => "name",
            Self::InvalidPrice { .. } => "price",
            Self::InvalidStatusFilter { .. } | Self::InvalidStatus { .. } => "status",
            Self::InvertedPriceRange => "minPrice",
        }
    }
}

/// Stable product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    pub fn new(id: impl AsRef<str>) -> Result<Self, ProductValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ProductValidationError::InvalidId)
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

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-blank product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductName(String);

impl ProductName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProductValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ProductName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ProductName> for String {
    fn from(value: ProductName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProductName {
    type Error = ProductValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Monetary amount in the store currency. Finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, ProductValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ProductValidationError::InvalidPrice { value });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl TryFrom<f64> for Price {
    type Error = ProductValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Catalog visibility of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Hidden,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = ProductValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "hidden" => Ok(Self::Hidden),
            other => Err(ProductValidationError::InvalidStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub status: ProductStatus,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Materialise a new active product.
    pub fn create(draft: NewProduct, created_by: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: ProductId::random(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            image_url: draft.image_url,
            status: ProductStatus::Active,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Change visibility. Returns `false` when the status was already `status`.
    pub fn set_visibility(&mut self, status: ProductStatus, now: DateTime<Utc>) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.updated_at = now;
        true
    }
}

/// Validated input for product creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: ProductName,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
}

impl NewProduct {
    /// Blank optional strings are treated as absent.
    pub fn new(
        name: ProductName,
        description: Option<String>,
        price: Price,
        image_url: Option<String>,
    ) -> Self {
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        Self {
            name,
            description: non_blank(description),
            price,
            image_url: non_blank(image_url),
        }
    }
}

/// Status selector for catalog listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    Active,
    Hidden,
    All,
}

impl StatusFilter {
    pub fn admits(self, status: ProductStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == ProductStatus::Active,
            Self::Hidden => status == ProductStatus::Hidden,
        }
    }

    /// The single status selected, or `None` for [`StatusFilter::All`].
    pub fn status(self) -> Option<ProductStatus> {
        match self {
            Self::Active => Some(ProductStatus::Active),
            Self::Hidden => Some(ProductStatus::Hidden),
            Self::All => None,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ProductValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "hidden" => Ok(Self::Hidden),
            "all" => Ok(Self::All),
            other => Err(ProductValidationError::InvalidStatusFilter {
                value: other.to_owned(),
            }),
        }
    }
}

/// Catalog listing criteria.
///
/// ## Invariants
/// - `search` is trimmed and non-empty when present.
/// - `min_price <= max_price` when both are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListQuery {
    status: StatusFilter,
    search: Option<String>,
    min_price: Option<Price>,
    max_price: Option<Price>,
}

impl ProductListQuery {
    pub fn new(
        status: StatusFilter,
        search: Option<&str>,
        min_price: Option<Price>,
        max_price: Option<Price>,
    ) -> Result<Self, ProductValidationError> {
        if matches!((min_price, max_price), (Some(min), Some(max)) if min > max) {
            return Err(ProductValidationError::InvertedPriceRange);
        }
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        Ok(Self {
            status,
            search,
            min_price,
            max_price,
        })
    }

    pub fn status(&self) -> StatusFilter {
        self.status
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn min_price(&self) -> Option<Price> {
        self.min_price
    }

    pub fn max_price(&self) -> Option<Price> {
        self.max_price
    }

    /// Whether `product` satisfies every criterion.
    ///
    /// Search is a case-insensitive substring match against the name or the
    /// description; price bounds are inclusive.
    pub fn matches(&self, product: &Product) -> bool {
        if !self.status.admits(product.status) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        match &self.search {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                product.name.as_ref().to_lowercase().contains(&needle)
                    || product
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
        }
    }

    /// Filter and order products newest first.
    pub fn apply<I>(&self, products: I) -> Vec<Product>
    where
        I: IntoIterator<Item = Product>,
    {
        let mut matched: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }
}
