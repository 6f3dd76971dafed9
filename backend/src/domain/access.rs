//! Request-scoped caller identity.
//!
//! A [`Caller`] is built once per request from verified credential claims and
//! passed explicitly to every service call. Role comes from the claims and is
//! never re-read from storage.

use serde::{Deserialize, Serialize};

use super::{Email, Error, Role, UserId};

/// The authenticated principal behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub user_id: UserId,
    pub email: Email,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: UserId, email: Email, role: Role) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller owns a resource belonging to `owner`.
    pub fn owns(&self, owner: &UserId) -> bool {
        &self.user_id == owner
    }

    /// Reject non-administrators with a forbidden error.
    ///
    /// # Examples
    /// ```
    /// use catering::domain::{Caller, Email, ErrorCode, Role, UserId};
    ///
    /// let caller = Caller::new(
    ///     UserId::random(),
    ///     Email::new("guest@example.com").unwrap(),
    ///     Role::User,
    /// );
    /// let err = caller.require_admin().unwrap_err();
    /// assert_eq!(err.code(), ErrorCode::Forbidden);
    /// ```
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("administrator role required"))
        }
    }

    /// Allow the owner or any administrator.
    pub fn require_owner_or_admin(&self, owner: &UserId) -> Result<(), Error> {
        if self.owns(owner) || self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("not permitted to modify this resource"))
        }
    }
}
