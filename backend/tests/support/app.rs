//! Full-stack HTTP harness over the in-memory stores.
//!
//! Wires the same services the server binary uses, with a recording mailer,
//! cheap Argon2 parameters and a throwaway upload directory.

use std::path::Path;
use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use argon2::Params;
use chrono::Utc;
use mockable::{Clock, DefaultClock};
use serde_json::Value;
use tempfile::TempDir;

use catering::Trace;
use catering::domain::ports::AccessTokenService;
use catering::domain::{
    AccountCollaborators, AccountService, CatalogService, Caller, ImageUploadService,
    OrderLifecycleService, Role,
};
use catering::inbound::http::configure_api;
use catering::inbound::http::state::{HttpState, HttpStatePorts};
use catering::outbound::blob::LocalBlobStore;
use catering::outbound::memory::{
    InMemoryOrderRepository, InMemoryProductRepository, InMemoryUserRepository,
};
use catering::outbound::password::Argon2PasswordHasher;
use catering::outbound::token::JwtAccessTokens;
use catering::test_support::{RecordingMailer, caller};

const SECRET: &[u8] = b"integration-test-secret";
pub const CLIENT_URL: &str = "http://localhost:5173";

pub struct TestStack {
    pub state: web::Data<HttpState>,
    pub mailer: Arc<RecordingMailer>,
    tokens: Arc<JwtAccessTokens>,
    uploads: TempDir,
}

impl TestStack {
    pub fn new() -> Self {
        let uploads = tempfile::tempdir().expect("upload dir");
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let tokens = Arc::new(JwtAccessTokens::new(SECRET));
        let mailer = Arc::new(RecordingMailer::default());
        let users = Arc::new(InMemoryUserRepository::default());
        let products = Arc::new(InMemoryProductRepository::default());
        let orders = Arc::new(InMemoryOrderRepository::default());
        let hasher = Argon2PasswordHasher::with_params(
            Params::new(8, 1, 1, None).expect("argon2 params"),
        );

        let accounts = AccountService::new(
            users.clone(),
            AccountCollaborators {
                hasher: Arc::new(hasher),
                tokens: tokens.clone(),
                mailer: mailer.clone(),
                clock: clock.clone(),
            },
            CLIENT_URL,
        );
        let catalog = Arc::new(CatalogService::new(products.clone(), clock.clone()));
        let lifecycle = Arc::new(OrderLifecycleService::new(
            orders,
            products,
            users,
            clock.clone(),
        ));
        let blobs = LocalBlobStore::open(uploads.path(), "/uploads").expect("blob store");

        let ports = HttpStatePorts {
            accounts: Arc::new(accounts),
            catalog: catalog.clone(),
            catalog_admin: catalog,
            orders: lifecycle.clone(),
            orders_query: lifecycle,
            uploads: Arc::new(ImageUploadService::new(Arc::new(blobs))),
        };
        let state = web::Data::new(HttpState::new(ports, tokens.clone(), clock));

        Self {
            state,
            mailer,
            tokens,
            uploads,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(configure_api))
    }

    pub fn upload_dir(&self) -> &Path {
        self.uploads.path()
    }

    /// `Authorization` value for a caller the stores know nothing about.
    pub fn bearer(&self, caller: &Caller) -> String {
        let issued = self.tokens.issue(caller, Utc::now()).expect("issue token");
        format!("Bearer {}", issued.token)
    }

    pub fn admin_bearer(&self) -> String {
        self.bearer(&caller("admin@example.com", Role::Admin))
    }
}

/// Attach a bearer value produced by [`TestStack::bearer`] or a login.
pub fn with_bearer(req: TestRequest, bearer: &str) -> TestRequest {
    req.insert_header((AUTHORIZATION, bearer.to_owned()))
}

/// Call `app` and decode the body as JSON; empty bodies decode to `Null`.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, json)
}

/// Register a customer and return their bearer value and user id.
pub async fn register<S, B>(app: &S, username: &str, email: &str, password: &str) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = TestRequest::post()
        .uri("/api/v1/users/register")
        .set_json(serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    let token = body["token"].as_str().expect("token").to_owned();
    let user_id = body["user"]["id"].as_str().expect("user id").to_owned();
    (format!("Bearer {token}"), user_id)
}
