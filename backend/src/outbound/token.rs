//! HS256 JSON Web Token adapter for [`AccessTokenService`].
//!
//! Claims: `sub` (user id), `email`, `role`, `iat`, `exp`. Expiry is checked
//! against the `now` passed in rather than the library's wall clock.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{AccessTokenError, AccessTokenService, IssuedToken, access_token_ttl};
use crate::domain::{Caller, Email, Role, UserId};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer credentials with a shared secret.
#[derive(Clone)]
pub struct JwtAccessTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAccessTokens {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl AccessTokenService for JwtAccessTokens {
    fn issue(&self, caller: &Caller, now: DateTime<Utc>) -> Result<IssuedToken, AccessTokenError> {
        let expires_at = now + access_token_ttl();
        let claims = Claims {
            sub: caller.user_id.to_string(),
            email: caller.email.as_ref().to_owned(),
            role: caller.role.as_str().to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| AccessTokenError::signing(err.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Caller, AccessTokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            AccessTokenError::invalid(err.to_string())
        })?;
        let claims = data.claims;
        if claims.exp <= now.timestamp() {
            return Err(AccessTokenError::Expired);
        }
        let user_id =
            UserId::new(&claims.sub).map_err(|err| AccessTokenError::invalid(err.to_string()))?;
        let email =
            Email::new(&claims.email).map_err(|err| AccessTokenError::invalid(err.to_string()))?;
        let role =
            Role::from_str(&claims.role).map_err(|err| AccessTokenError::invalid(err.to_string()))?;
        Ok(Caller::new(user_id, email, role))
    }
}
