//! Authentication primitives: login, registration and password-reset inputs.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::{Email, UserValidationError, Username};

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email was missing or malformed.
    Email(UserValidationError),
    /// Username was missing or too long.
    Username(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Reset token was not 64 hexadecimal characters.
    MalformedResetToken,
}

impl CredentialValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Username(_) => "username",
            Self::EmptyPassword => "password",
            Self::MalformedResetToken => "token",
        }
    }
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) | Self::Username(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::MalformedResetToken => write!(f, "reset token is malformed"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

fn non_empty_password(password: &str) -> Result<Zeroizing<String>, CredentialValidationError> {
    if password.is_empty() {
        return Err(CredentialValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` is normalised to lowercase.
/// - `password` is non-empty but retains caller-provided whitespace.
///
/// # Examples
/// ```
/// use catering::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Chef@Example.com", "pw").unwrap();
/// assert_eq!(creds.email().as_ref(), "chef@example.com");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email = Email::new(email).map_err(CredentialValidationError::Email)?;
        let password = non_empty_password(password)?;
        Ok(Self { email, password })
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDetails {
    username: Username,
    email: Email,
    password: Zeroizing<String>,
}

impl RegistrationDetails {
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let username = Username::new(username).map_err(CredentialValidationError::Username)?;
        let email = Email::new(email).map_err(CredentialValidationError::Email)?;
        let password = non_empty_password(password)?;
        Ok(Self {
            username,
            email,
            password,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Length in bytes of a password-reset token before hex encoding.
pub const RESET_TOKEN_BYTES: usize = 32;

/// Plain reset token as carried in the emailed link.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetToken(Zeroizing<String>);

impl ResetToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        let bytes: [u8; RESET_TOKEN_BYTES] = rand::random();
        Self(Zeroizing::new(hex::encode(bytes)))
    }

    /// Parse a token taken from a request path.
    pub fn parse(raw: &str) -> Result<Self, CredentialValidationError> {
        let well_formed =
            raw.len() == RESET_TOKEN_BYTES * 2 && raw.bytes().all(|b| b.is_ascii_hexdigit());
        if !well_formed {
            return Err(CredentialValidationError::MalformedResetToken);
        }
        Ok(Self(Zeroizing::new(raw.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Hex-encoded SHA-256 digest; the only form persisted.
    pub fn digest(&self) -> String {
        use sha2::{Digest, Sha256};
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetToken(..)")
    }
}

/// Replacement password submitted with a reset token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    pub fn new(raw: &str) -> Result<Self, CredentialValidationError> {
        non_empty_password(raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
