//! Backend entry-point: loads settings, wires stores and serves the REST API.

mod server;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use catering::config::AppSettings;
use catering::inbound::http::health::HealthState;
use catering::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, create_server};

const EPHEMERAL_SECRET_BYTES: usize = 32;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|e| eyre!("failed to load configuration: {e}"))?;
    let token_secret = load_token_secret(&settings)?;
    let bind_addr = settings
        .bind_addr()
        .wrap_err("invalid bind address")?;
    let db_pool = connect_database(&settings).await?;

    let config = ServerConfig::new(settings, token_secret, bind_addr);
    let config = match db_pool {
        Some(pool) => config.with_db_pool(pool),
        None => config,
    };
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(make_metrics()?));

    info!(addr = %config.bind_addr(), "starting catering api");
    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?
        .await
        .wrap_err("http server failed")
}

/// Read the signing secret, or mint a throwaway one in development.
fn load_token_secret(settings: &AppSettings) -> Result<Zeroizing<Vec<u8>>> {
    let path = settings.token_secret_file();
    match std::fs::read(path) {
        Ok(bytes) if !bytes.is_empty() => Ok(Zeroizing::new(bytes)),
        Ok(_) => Err(eyre!("token secret at {} is empty", path.display())),
        Err(e) => {
            if cfg!(debug_assertions) || settings.allow_ephemeral_secret {
                warn!(path = %path.display(), error = %e, "using temporary token secret (dev only)");
                Ok(ephemeral_secret())
            } else {
                Err(eyre!("failed to read token secret at {}: {e}", path.display()))
            }
        }
    }
}

fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    Zeroizing::new(rand::random::<[u8; EPHEMERAL_SECRET_BYTES]>().to_vec())
}

/// Connect to Postgres when a URL is configured, applying migrations first if
/// asked to.
async fn connect_database(settings: &AppSettings) -> Result<Option<DbPool>> {
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(None);
    };
    if settings.run_migrations {
        run_pending_migrations(url)
            .await
            .wrap_err("failed to apply migrations")?;
        info!("database migrations applied");
    }
    let pool = DbPool::new(PoolConfig::new(url))
        .await
        .wrap_err("failed to create database pool")?;
    Ok(Some(pool))
}

#[cfg(feature = "metrics")]
fn make_metrics() -> Result<actix_web_prom::PrometheusMetrics> {
    PrometheusMetricsBuilder::new("catering")
        .endpoint("/metrics")
        .build()
        .map_err(|e| eyre!("configure Prometheus metrics: {e}"))
}
