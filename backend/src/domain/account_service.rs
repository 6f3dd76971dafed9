//! Account service: registration, login, profile edits and password reset.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::port_error_mapping::{
    duplicate_email, map_hash_error, map_mailer_error, map_token_error, map_user_error,
};
use crate::domain::ports::{
    AccessTokenService, AccountCommand, AuthSession, Mailer, OutboundEmail, PasswordHasher,
    ProfileUpdate, UserRepository,
};
use crate::domain::{
    Caller, Email, Error, LoginCredentials, NewPassword, PasswordReset, RegistrationDetails,
    ResetToken, User, UserProfile,
};

/// How long an emailed reset link stays valid.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 15;

/// Collaborators the account service delegates to.
#[derive(Clone)]
pub struct AccountCollaborators {
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn AccessTokenService>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    collaborators: AccountCollaborators,
    client_url: String,
}

impl<U> AccountService<U> {
    /// `client_url` is the front-end origin used to build reset links.
    pub fn new(users: Arc<U>, collaborators: AccountCollaborators, client_url: &str) -> Self {
        Self {
            users,
            collaborators,
            client_url: client_url.trim_end_matches('/').to_owned(),
        }
    }

    fn reset_email(&self, to: Email, token: &ResetToken) -> OutboundEmail {
        let link = format!("{}/reset-password/{}", self.client_url, token.as_str());
        OutboundEmail {
            to,
            subject: "Reset Your Password".to_owned(),
            text: format!("Click this link to reset your password: {link}"),
            html: reset_email_html(&link),
        }
    }
}

impl<U: UserRepository> AccountService<U> {
    fn start_session(&self, user: &User) -> Result<AuthSession, Error> {
        let caller = Caller::new(user.id, user.email.clone(), user.role);
        let issued = self
            .collaborators
            .tokens
            .issue(&caller, self.collaborators.clock.utc())
            .map_err(map_token_error)?;
        Ok(AuthSession {
            token: issued.token,
            expires_at: issued.expires_at,
            user: user.profile(),
        })
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, Error> {
        self.users.find_by_email(email).await.map_err(map_user_error)
    }
}

#[async_trait]
impl<U: UserRepository> AccountCommand for AccountService<U> {
    async fn register(&self, details: RegistrationDetails) -> Result<AuthSession, Error> {
        if self.find_by_email(details.email()).await?.is_some() {
            return Err(duplicate_email());
        }
        let hash = self
            .collaborators
            .hasher
            .hash(details.password())
            .map_err(map_hash_error)?;
        let user = User::register(
            details.username().clone(),
            details.email().clone(),
            hash,
            self.collaborators.clock.utc(),
        );
        self.users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, "user registered");
        self.start_session(&user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let Some(user) = self.find_by_email(credentials.email()).await? else {
            return Err(Error::unauthorized("invalid credentials"));
        };
        let valid = self
            .collaborators
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .map_err(map_hash_error)?;
        if !valid {
            return Err(Error::unauthorized("invalid credentials"));
        }
        self.start_session(&user)
    }

    async fn update_profile(
        &self,
        caller: &Caller,
        update: ProfileUpdate,
    ) -> Result<UserProfile, Error> {
        let mut user = self
            .users
            .find_by_id(&caller.user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(profile_pic) = update.profile_pic {
            user.profile_pic = Some(profile_pic);
        }
        user.updated_at = self.collaborators.clock.utc();
        self.users.update(&user).await.map_err(map_user_error)?;
        Ok(user.profile())
    }

    async fn request_password_reset(&self, email: Email) -> Result<(), Error> {
        let mut user = self
            .find_by_email(&email)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;
        let token = ResetToken::generate();
        let now = self.collaborators.clock.utc();
        user.password_reset = Some(PasswordReset {
            token_hash: token.digest(),
            expires_at: now + TimeDelta::minutes(RESET_TOKEN_TTL_MINUTES),
        });
        user.updated_at = now;
        self.users.update(&user).await.map_err(map_user_error)?;

        let message = self.reset_email(user.email.clone(), &token);
        if let Err(err) = self.collaborators.mailer.send(&message).await {
            warn!(user_id = %user.id, error = %err, "reset email delivery failed");
            return Err(map_mailer_error(err));
        }
        info!(user_id = %user.id, "password reset issued");
        Ok(())
    }

    async fn reset_password(&self, token: ResetToken, password: NewPassword) -> Result<(), Error> {
        let now = self.collaborators.clock.utc();
        let invalid = || Error::invalid_request("invalid or expired token");
        let mut user = self
            .users
            .find_by_reset_token_hash(&token.digest())
            .await
            .map_err(map_user_error)?
            .ok_or_else(invalid)?;
        let open = user
            .password_reset
            .as_ref()
            .is_some_and(|reset| reset.is_open_at(now));
        if !open {
            return Err(invalid());
        }
        user.password_hash = self
            .collaborators
            .hasher
            .hash(password.as_str())
            .map_err(map_hash_error)?;
        user.password_reset = None;
        user.updated_at = now;
        self.users.update(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, "password reset completed");
        Ok(())
    }
}

fn reset_email_html(link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8" /><title>Password Reset</title></head>
<body style="font-family: Arial, sans-serif; background-color: #f8fafc; padding: 20px;">
  <div style="max-width: 480px; margin: 0 auto; background-color: #ffffff; padding: 30px; border-radius: 8px;">
    <p style="font-size: 22px; font-weight: bold; color: #333333;">Reset Your Password</p>
    <p style="font-size: 15px; color: #555555;">You requested to reset your password. Click the button below to proceed. This link will expire in {RESET_TOKEN_TTL_MINUTES} minutes.</p>
    <p style="text-align: center;">
      <a href="{link}" style="display: inline-block; padding: 12px 20px; background-color: #f97316; color: #ffffff; text-decoration: none; border-radius: 4px; font-weight: bold;">Reset Password</a>
    </p>
    <p style="font-size: 15px; color: #555555;">If you did not request this, please ignore this email.</p>
  </div>
</body>
</html>
"#
    )
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
