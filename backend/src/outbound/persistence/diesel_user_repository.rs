//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Reset state is stored as a nullable digest/expiry column pair and
//! surfaces in the domain as `Option<PasswordReset>`.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, PasswordReset, Role, User, UserId, Username};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed account store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = row.id;
    let invalid = |err: crate::domain::UserValidationError| {
        UserPersistenceError::query(format!("stored user {id} is invalid: {err}"))
    };
    let password_reset = match (row.reset_token_hash, row.reset_token_expires_at) {
        (Some(token_hash), Some(expires_at)) => Some(PasswordReset {
            token_hash,
            expires_at,
        }),
        (None, None) => None,
        _ => {
            warn!(user_id = %id, "half-written reset state ignored");
            None
        }
    };
    Ok(User {
        id: UserId::from_uuid(id),
        username: Username::new(&row.username).map_err(invalid)?,
        email: Email::new(&row.email).map_err(invalid)?,
        password_hash: row.password_hash,
        role: Role::from_str(&row.role).map_err(invalid)?,
        profile_pic: row.profile_pic,
        password_reset,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl DieselUserRepository {
    async fn find_one<F>(&self, filter: F) -> Result<Option<User>, UserPersistenceError>
    where
        F: FnOnce(users::BoxedQuery<'static, diesel::pg::Pg>) -> users::BoxedQuery<'static, diesel::pg::Pg>
            + Send,
    {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = filter(users::table.into_boxed())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: &user.password_hash,
            role: user.role.as_str(),
            profile_pic: user.profile_pic.as_deref(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err, EMAIL_CONSTRAINT) {
                    UserPersistenceError::duplicate_email(user.email.as_ref())
                } else {
                    map_diesel_error(err)
                }
            })
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserUpdate {
            username: user.username.as_ref(),
            password_hash: &user.password_hash,
            profile_pic: user.profile_pic.as_deref(),
            reset_token_hash: user
                .password_reset
                .as_ref()
                .map(|reset| reset.token_hash.as_str()),
            reset_token_expires_at: user.password_reset.as_ref().map(|reset| reset.expires_at),
            updated_at: user.updated_at,
        };
        let updated = diesel::update(users::table.filter(users::id.eq(user.id.as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(UserPersistenceError::query("user not found for update"));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let id = *id.as_uuid();
        self.find_one(move |query| query.filter(users::id.eq(id)))
            .await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let email = email.as_ref().to_owned();
        self.find_one(move |query| query.filter(users::email.eq(email)))
            .await
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(uuids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let token_hash = token_hash.to_owned();
        self.find_one(move |query| query.filter(users::reset_token_hash.eq(token_hash)))
            .await
    }
}
