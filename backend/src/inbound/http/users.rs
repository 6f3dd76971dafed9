//! Account API handlers.
//!
//! ```text
//! POST /api/v1/users/register                {"username","email","password"}
//! POST /api/v1/users/login                   {"email","password"}
//! GET  /api/v1/users/me
//! POST /api/v1/users/logout
//! PUT  /api/v1/users/profile                 {"username"?,"profilePic"?}
//! POST /api/v1/users/forgot-password         {"email"}
//! POST /api/v1/users/reset-password/{token}  {"password"}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{AuthSession, ProfileUpdate};
use crate::domain::{
    Caller, Email, LoginCredentials, NewPassword, RegistrationDetails, ResetToken, UserProfile,
    Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::{
    AuthResponseSchema, CallerSchema, ErrorSchema, UserProfileSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, credential_error, user_field_error};

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub username: Option<String>,
    pub profile_pic: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    expires_at: DateTime<Utc>,
    user: UserProfile,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at,
            user: session.user,
        }
    }
}

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");

/// Create an account and return a bearer token for it.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponseSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let details =
        RegistrationDetails::try_from_parts(&username, &email, &password).map_err(credential_error)?;
    let session = state.accounts.register(details).await?;
    Ok(HttpResponse::Created().json(AuthResponse::from(session)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponseSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(credential_error)?;
    let session = state.accounts.login(credentials).await?;
    Ok(HttpResponse::Ok().json(AuthResponse::from(session)))
}

/// Echo the claims carried by the caller's token.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Caller claims", body = CallerSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(auth: Authenticated) -> ApiResult<web::Json<Caller>> {
    Ok(web::Json(auth.into_inner()))
}

/// Acknowledge a logout. Tokens are stateless; clients discard theirs.
#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses((status = 200, description = "Logged out")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/users/logout")]
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Logged out successfully" }))
}

/// Update the caller's username and/or profile picture.
#[utoipa::path(
    put,
    path = "/api/v1/users/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfileSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    let ProfileRequest {
        username,
        profile_pic,
    } = payload.into_inner();
    let username = username
        .map(Username::new)
        .transpose()
        .map_err(|err| user_field_error(USERNAME, &err))?;
    let update = ProfileUpdate {
        username,
        profile_pic,
    };
    let profile = state.accounts.update_profile(auth.caller(), update).await?;
    Ok(web::Json(profile))
}

/// Email a single-use password reset link.
#[utoipa::path(
    post,
    path = "/api/v1/users/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "No account for this email", body = ErrorSchema),
        (status = 503, description = "Mail relay unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/users/forgot-password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let email = Email::new(&payload.email).map_err(|err| user_field_error(EMAIL, &err))?;
    state.accounts.request_password_reset(email).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Reset link sent to your email." })))
}

/// Redeem a reset token and set a new password.
#[utoipa::path(
    post,
    path = "/api/v1/users/reset-password/{token}",
    params(("token" = String, Path, description = "Token from the emailed link")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced"),
        (status = 400, description = "Invalid or expired token", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/users/reset-password/{token}")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let token = ResetToken::parse(&path.into_inner()).map_err(credential_error)?;
    let password = NewPassword::new(&payload.password).map_err(credential_error)?;
    state.accounts.reset_password(token, password).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password reset successful" })))
}
