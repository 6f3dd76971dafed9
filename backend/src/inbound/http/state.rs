//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccessTokenService, AccountCommand, CatalogCommand, CatalogQuery, ImageUploadCommand,
    OrderCommand, OrderQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub catalog: Arc<dyn CatalogQuery>,
    pub catalog_admin: Arc<dyn CatalogCommand>,
    pub orders: Arc<dyn OrderCommand>,
    pub orders_query: Arc<dyn OrderQuery>,
    pub uploads: Arc<dyn ImageUploadCommand>,
}

/// Dependency bundle for HTTP handlers.
///
/// `tokens` and `clock` back the bearer extractor; every other field is a
/// driving port.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub catalog: Arc<dyn CatalogQuery>,
    pub catalog_admin: Arc<dyn CatalogCommand>,
    pub orders: Arc<dyn OrderCommand>,
    pub orders_query: Arc<dyn OrderQuery>,
    pub uploads: Arc<dyn ImageUploadCommand>,
    pub tokens: Arc<dyn AccessTokenService>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Assemble state from driving ports plus the credential verifier.
    pub fn new(
        ports: HttpStatePorts,
        tokens: Arc<dyn AccessTokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let HttpStatePorts {
            accounts,
            catalog,
            catalog_admin,
            orders,
            orders_query,
            uploads,
        } = ports;
        Self {
            accounts,
            catalog,
            catalog_admin,
            orders,
            orders_query,
            uploads,
            tokens,
            clock,
        }
    }
}
