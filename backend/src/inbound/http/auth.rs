//! Bearer-credential extraction for HTTP handlers.
//!
//! Handlers that need an identity take an [`Authenticated`] argument; the
//! extractor verifies the `Authorization: Bearer <token>` header against the
//! [`AccessTokenService`](crate::domain::ports::AccessTokenService) held in
//! [`HttpState`] and hands the resulting [`Caller`] to the handler. Nothing is
//! stored between requests.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::AccessTokenError;
use crate::domain::{Caller, Error};

use super::state::HttpState;

const BEARER_SCHEME: &str = "bearer";

/// Verified caller identity for the current request.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Caller);

impl Authenticated {
    pub fn caller(&self) -> &Caller {
        &self.0
    }

    pub fn into_inner(self) -> Caller {
        self.0
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let (scheme, token) = raw
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || token.is_empty() {
        return Err(Error::unauthorized("malformed authorization header"));
    }
    Ok(token)
}

fn authenticate(req: &HttpRequest) -> Result<Caller, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state is not registered"))?;
    let token = bearer_token(req.headers())?;
    state
        .tokens
        .verify(token, state.clock.utc())
        .map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            match err {
                AccessTokenError::Expired => Error::unauthorized("token expired"),
                _ => Error::unauthorized("invalid token"),
            }
        })
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Self))
    }
}
