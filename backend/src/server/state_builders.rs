//! Builders for HTTP state: stores, collaborators and domain services.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use url::Url;

use catering::config::AppSettings;
use catering::domain::ports::{
    AccessTokenService, Mailer, OrderRepository, ProductRepository, UserRepository,
};
use catering::domain::{
    AccountCollaborators, AccountService, CatalogService, ImageUploadService,
    OrderLifecycleService,
};
use catering::inbound::http::state::{HttpState, HttpStatePorts};
use catering::outbound::blob::LocalBlobStore;
use catering::outbound::mail::{HttpMailRelay, TracingMailer};
use catering::outbound::memory::{
    InMemoryOrderRepository, InMemoryProductRepository, InMemoryUserRepository,
};
use catering::outbound::password::Argon2PasswordHasher;
use catering::outbound::persistence::{
    DieselOrderRepository, DieselProductRepository, DieselUserRepository,
};
use catering::outbound::token::JwtAccessTokens;

use super::ServerConfig;

/// Collaborators shared by every service regardless of the store backend.
#[derive(Clone)]
struct SharedCollaborators {
    tokens: Arc<dyn AccessTokenService>,
    mailer: Arc<dyn Mailer>,
    blobs: Arc<LocalBlobStore>,
    clock: Arc<dyn Clock>,
}

/// Pick the relay client when an endpoint is configured, otherwise log mail.
fn build_mailer(settings: &AppSettings) -> std::io::Result<Arc<dyn Mailer>> {
    let Some(raw) = settings.mail_relay_url.as_deref() else {
        warn!("no mail relay configured; reset emails are logged only");
        return Ok(Arc::new(TracingMailer));
    };
    let endpoint = Url::parse(raw).map_err(|err| {
        std::io::Error::other(format!("invalid mail relay url {raw}: {err}"))
    })?;
    let relay = HttpMailRelay::new(endpoint, settings.mail_from())
        .map_err(|err| std::io::Error::other(format!("mail relay client failed: {err}")))?;
    Ok(Arc::new(relay))
}

/// Wire domain services over one set of stores.
fn build_ports<O, P, U>(
    orders: Arc<O>,
    products: Arc<P>,
    users: Arc<U>,
    shared: &SharedCollaborators,
    client_url: &str,
) -> HttpStatePorts
where
    O: OrderRepository + 'static,
    P: ProductRepository + 'static,
    U: UserRepository + 'static,
{
    let accounts = AccountService::new(
        users.clone(),
        AccountCollaborators {
            hasher: Arc::new(Argon2PasswordHasher::default()),
            tokens: shared.tokens.clone(),
            mailer: shared.mailer.clone(),
            clock: shared.clock.clone(),
        },
        client_url,
    );
    let catalog = Arc::new(CatalogService::new(products.clone(), shared.clock.clone()));
    let lifecycle = Arc::new(OrderLifecycleService::new(
        orders,
        products,
        users,
        shared.clock.clone(),
    ));

    HttpStatePorts {
        accounts: Arc::new(accounts),
        catalog: catalog.clone(),
        catalog_admin: catalog,
        orders: lifecycle.clone(),
        orders_query: lifecycle,
        uploads: Arc::new(ImageUploadService::new(shared.blobs.clone())),
    }
}

fn in_memory_ports(shared: &SharedCollaborators, client_url: &str) -> HttpStatePorts {
    build_ports(
        Arc::new(InMemoryOrderRepository::default()),
        Arc::new(InMemoryProductRepository::default()),
        Arc::new(InMemoryUserRepository::default()),
        shared,
        client_url,
    )
}

/// Build the shared HTTP state, choosing Postgres stores when a pool is
/// configured and in-memory stores otherwise.
///
/// # Errors
/// Returns [`std::io::Error`] when the upload directory cannot be opened or
/// the mail relay client cannot be constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let settings = &config.settings;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens: Arc<dyn AccessTokenService> =
        Arc::new(JwtAccessTokens::new(config.token_secret.as_slice()));
    let shared = SharedCollaborators {
        tokens: tokens.clone(),
        mailer: build_mailer(settings)?,
        blobs: Arc::new(LocalBlobStore::open(
            settings.upload_dir(),
            settings.upload_base_url(),
        )?),
        clock: clock.clone(),
    };

    let ports = match &config.db_pool {
        Some(pool) => {
            info!("using postgres-backed stores");
            build_ports(
                Arc::new(DieselOrderRepository::new(pool.clone())),
                Arc::new(DieselProductRepository::new(pool.clone())),
                Arc::new(DieselUserRepository::new(pool.clone())),
                &shared,
                settings.client_url(),
            )
        }
        None => {
            warn!("no database configured; orders and accounts are kept in memory");
            in_memory_ports(&shared, settings.client_url())
        }
    };

    Ok(web::Data::new(HttpState::new(ports, tokens, clock)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::Path;

    use catering::domain::{ProductListQuery, Role};
    use catering::test_support::{RecordingMailer, caller, temp_upload_dir};
    use env_lock::lock_env;
    use ortho_config::OrthoConfig;
    use rstest::rstest;

    fn settings_with(mail_relay_url: Option<&str>) -> AppSettings {
        let _guard = lock_env([("CATERING_MAIL_RELAY_URL", mail_relay_url)]);
        AppSettings::load_from_iter([OsString::from("catering")]).expect("config should load")
    }

    fn shared(upload_dir: &Path) -> SharedCollaborators {
        SharedCollaborators {
            tokens: Arc::new(JwtAccessTokens::new(b"state-builder-secret")),
            mailer: Arc::new(RecordingMailer::default()),
            blobs: Arc::new(
                LocalBlobStore::open(upload_dir, "/uploads").expect("open upload dir"),
            ),
            clock: Arc::new(DefaultClock),
        }
    }

    #[rstest]
    fn relay_url_must_parse() {
        let settings = settings_with(Some("not a url"));
        assert!(build_mailer(&settings).is_err());
    }

    #[rstest]
    fn relay_is_optional() {
        let settings = settings_with(None);
        assert!(build_mailer(&settings).is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn in_memory_ports_start_with_an_empty_catalog() {
        let dir = temp_upload_dir();
        let ports = in_memory_ports(&shared(dir.path()), "http://localhost:5173");

        let products = ports
            .catalog
            .list(&ProductListQuery::default())
            .await
            .expect("list products");
        assert!(products.is_empty());

        let guest = caller("guest@example.com", Role::User);
        let mine = ports.orders_query.my_orders(&guest).await.expect("my orders");
        assert!(mine.is_empty());
    }
}
