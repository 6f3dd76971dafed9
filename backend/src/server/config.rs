//! HTTP server configuration object and helpers.

use catering::config::AppSettings;
use catering::outbound::persistence::DbPool;
use std::net::SocketAddr;
use zeroize::Zeroizing;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) settings: AppSettings,
    pub(crate) token_secret: Zeroizing<Vec<u8>>,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration from loaded settings and the signing
    /// secret.
    #[must_use]
    pub fn new(
        settings: AppSettings,
        token_secret: Zeroizing<Vec<u8>>,
        bind_addr: SocketAddr,
    ) -> Self {
        Self {
            settings,
            token_secret,
            bind_addr,
            db_pool: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, the user, product and order stores are Postgres-backed;
    /// otherwise they live in memory for the lifetime of the process.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
