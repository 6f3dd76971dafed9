//! Port for issuing and verifying bearer credentials.
//!
//! Verification takes the current time explicitly so expiry follows the
//! injected clock rather than the wall clock.

use chrono::{DateTime, Duration, Utc};

use crate::domain::Caller;

use super::define_port_error;

/// Lifetime of an issued credential, in days.
pub const ACCESS_TOKEN_TTL_DAYS: i64 = 30;

/// Lifetime of an issued credential.
pub fn access_token_ttl() -> Duration {
    Duration::days(ACCESS_TOKEN_TTL_DAYS)
}

define_port_error! {
    /// Errors raised by credential adapters.
    pub enum AccessTokenError {
        /// The credential's expiry has passed.
        Expired => "access token expired",
        /// The credential could not be decoded or its signature is wrong.
        Invalid { message: String } => "access token invalid: {message}",
        /// Signing a new credential failed.
        Signing { message: String } => "access token signing failed: {message}",
    }
}

/// A freshly signed credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
pub trait AccessTokenService: Send + Sync {
    /// Sign a credential for `caller` valid for [`access_token_ttl`].
    fn issue(&self, caller: &Caller, now: DateTime<Utc>) -> Result<IssuedToken, AccessTokenError>;

    /// Decode and validate `token`, returning the embedded caller.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Caller, AccessTokenError>;
}
