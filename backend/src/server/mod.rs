//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use catering::Trace;
#[cfg(debug_assertions)]
use catering::doc::ApiDoc;
use catering::inbound::http::configure_api;
use catering::inbound::http::health::{HealthState, live, ready};
use catering::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] with the signing secret, binding and
///   optional store and metrics settings.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when wiring the stores, binding the socket or
/// starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        bind_addr,
        #[cfg(feature = "metrics")]
        prometheus,
        ..
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::{AppDependencies, HealthState, ServerConfig, build_app, build_http_state, web};
    use std::ffi::OsString;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use catering::config::AppSettings;
    use catering::test_support::temp_upload_dir;
    use env_lock::lock_env;
    use ortho_config::OrthoConfig;
    use zeroize::Zeroizing;

    fn config_for(upload_dir: &str) -> ServerConfig {
        let _guard = lock_env([
            ("CATERING_UPLOAD_DIR", Some(upload_dir)),
            ("CATERING_MAIL_RELAY_URL", None),
        ]);
        let settings =
            AppSettings::load_from_iter([OsString::from("catering")]).expect("config should load");
        let bind_addr = settings.bind_addr().expect("bind address");
        ServerConfig::new(settings, Zeroizing::new(b"server-test".to_vec()), bind_addr)
    }

    #[actix_web::test]
    async fn routes_health_and_api_through_one_app() {
        let dir = temp_upload_dir();
        let config = config_for(dir.path().to_str().expect("utf-8 temp path"));
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        let app = actix_test::init_service(build_app(AppDependencies {
            health_state,
            http_state: build_http_state(&config).expect("http state"),
        }))
        .await;

        let ready = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(ready.status(), StatusCode::OK);
        assert!(ready.headers().contains_key("trace-id"));

        let products = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/products").to_request(),
        )
        .await;
        assert_eq!(products.status(), StatusCode::OK);

        let me = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/users/me").to_request(),
        )
        .await;
        assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    }
}
