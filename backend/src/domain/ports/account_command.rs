//! Driving port for account use-cases: registration, login, profile edits
//! and password reset.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it
//! without knowing which stores, hasher or mailer back it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Caller, Email, Error, LoginCredentials, NewPassword, RegistrationDetails, ResetToken,
    UserProfile, Username,
};

/// A signed-in session: bearer credential plus the account it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

/// Profile fields to change. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: Option<Username>,
    pub profile_pic: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create a `user`-role account and sign it in.
    async fn register(&self, details: RegistrationDetails) -> Result<AuthSession, Error>;

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    async fn update_profile(
        &self,
        caller: &Caller,
        update: ProfileUpdate,
    ) -> Result<UserProfile, Error>;

    /// Store a fresh reset digest and email the link, superseding any open
    /// reset for the account.
    async fn request_password_reset(&self, email: Email) -> Result<(), Error>;

    /// Redeem a reset token once, replacing the password.
    async fn reset_password(&self, token: ResetToken, password: NewPassword) -> Result<(), Error>;
}
