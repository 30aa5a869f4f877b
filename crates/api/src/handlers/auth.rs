//! Handlers for the `/auth` resource (sign-up, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use eventreg_core::error::CoreError;
use eventreg_core::roles::Role;
use eventreg_core::types::DbId;
use eventreg_db::models::user::{CreateUser, UserResponse};
use eventreg_db::repositories::user_repo::UQ_USERNAME;
use eventreg_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub role: Role,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user_id: DbId,
    pub username: String,
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an organizer or attendee account. Returns 201 with the new user.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let created = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username.trim().to_string(),
            email: input.email,
            password_hash,
            role: input.role,
        },
    )
    .await;

    let user = match created {
        Ok(user) => user,
        Err(e) if eventreg_db::is_unique_violation(&e, UQ_USERNAME) => {
            return Err(AppError::Core(CoreError::Conflict(
                "A user with that username already exists.".into(),
            )));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = user.id, role = %user.role, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns an access token.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid username or password".into()));

    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    let access_token = generate_access_token(user.id, user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse {
        access_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user_id: user.id,
        username: user.username,
        role: user.role,
    }))
}
