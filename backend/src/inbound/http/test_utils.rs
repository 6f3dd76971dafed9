//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::test::TestRequest;
use actix_web::{App, web};
use chrono::Utc;
use mockable::DefaultClock;

use crate::Trace;
use crate::domain::Caller;
use crate::domain::ports::{
    AccessTokenService, FixtureCatalogQuery, FixtureOrderQuery, MockAccountCommand,
    MockCatalogCommand, MockImageUploadCommand, MockOrderCommand,
};
use crate::outbound::token::JwtAccessTokens;

use super::state::{HttpState, HttpStatePorts};

const TEST_SECRET: &[u8] = b"http-adapter-test-secret";

/// Ports that fail the test if a handler touches them unexpectedly.
///
/// Override the field under test with struct update syntax.
pub fn fixture_ports() -> HttpStatePorts {
    HttpStatePorts {
        accounts: Arc::new(MockAccountCommand::new()),
        catalog: Arc::new(FixtureCatalogQuery),
        catalog_admin: Arc::new(MockCatalogCommand::new()),
        orders: Arc::new(MockOrderCommand::new()),
        orders_query: Arc::new(FixtureOrderQuery),
        uploads: Arc::new(MockImageUploadCommand::new()),
    }
}

/// Build handler state with a fixed signing secret and the system clock.
pub fn state_with(ports: HttpStatePorts) -> HttpState {
    HttpState::new(
        ports,
        Arc::new(JwtAccessTokens::new(TEST_SECRET)),
        Arc::new(DefaultClock),
    )
}

/// `Authorization` header value carrying a valid token for `caller`.
pub fn bearer(caller: &Caller) -> String {
    match JwtAccessTokens::new(TEST_SECRET).issue(caller, Utc::now()) {
        Ok(issued) => format!("Bearer {}", issued.token),
        Err(err) => panic!("test token: {err}"),
    }
}

/// Attach a bearer header for `caller` to `req`.
pub fn authorised(req: TestRequest, caller: &Caller) -> TestRequest {
    req.insert_header((AUTHORIZATION, bearer(caller)))
}

/// Full `/api/v1` surface over `ports`, wrapped in the trace middleware.
pub fn test_app(
    ports: HttpStatePorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state_with(ports)))
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(super::configure_api))
}
