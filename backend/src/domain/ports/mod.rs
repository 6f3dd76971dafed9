//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, credentials, hashing, mail, blobs) describe
//! what the services need from infrastructure. Driving ports (commands and
//! queries) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod access_token;
mod account_command;
mod blob_store;
mod catalog_command;
mod catalog_query;
mod image_upload_command;
mod mailer;
mod order_command;
mod order_query;
mod order_repository;
mod password_hasher;
mod product_repository;
mod user_repository;

#[cfg(test)]
pub use access_token::MockAccessTokenService;
pub use access_token::{
    ACCESS_TOKEN_TTL_DAYS, AccessTokenError, AccessTokenService, IssuedToken, access_token_ttl,
};
#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, AuthSession, ProfileUpdate};
#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError, ImageKind};
pub use catalog_command::CatalogCommand;
#[cfg(test)]
pub use catalog_command::MockCatalogCommand;
#[cfg(test)]
pub use catalog_query::MockCatalogQuery;
pub use catalog_query::{CatalogQuery, FixtureCatalogQuery};
pub use image_upload_command::ImageUploadCommand;
#[cfg(test)]
pub use image_upload_command::MockImageUploadCommand;
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{FixtureMailer, Mailer, MailerError, OutboundEmail};
#[cfg(test)]
pub use order_command::MockOrderCommand;
pub use order_command::{OrderCommand, PlaceOrderRequest};
#[cfg(test)]
pub use order_query::MockOrderQuery;
pub use order_query::{FixtureOrderQuery, OrderQuery};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{FixtureOrderRepository, OrderRepository, OrderRepositoryError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{FixtureProductRepository, ProductRepository, ProductRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
