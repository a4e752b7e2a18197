//! Handlers for account registration and login.

use crate::{auth::middleware::create_token, errors::AppError, state::AppState, types::user_payload};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use voxtutor_access::{create_user, find_user_by_email, record_login, verify_password, NewUser};

const MIN_PASSWORD_LENGTH: usize = 6;
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub university: Option<String>,
    pub course: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Handler for `POST /api/auth/register`.
pub async fn register_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if name.len() < MIN_NAME_LENGTH {
        return Err(AppError::validation("Name must be at least 2 characters"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(AppError::validation("Name cannot exceed 50 characters"));
    }
    if !payload.email.contains('@') {
        return Err(AppError::validation("A valid email address is required"));
    }
    if payload.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::validation(
            "Password must be at least 6 characters long",
        ));
    }

    let user = create_user(
        &app_state.sqlite_provider.db,
        NewUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            university: payload.university,
            course: payload.course,
        },
    )
    .await?;
    info!(user_id = %user.id, "New account registered");

    let token = create_token(
        &user,
        &app_state.config.jwt_secret,
        app_state.config.jwt_expires_in_secs,
    )
    .map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Account created successfully",
            "data": {
                "user": user_payload(&user),
                "token": token,
            }
        })),
    ))
}

/// Handler for `POST /api/auth/login`.
///
/// Unknown emails and wrong passwords produce the same message, so the
/// endpoint cannot be used to probe which accounts exist.
pub async fn login_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<Value>, AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let user = find_user_by_email(&app_state.sqlite_provider.db, &payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&user, &payload.password)? {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    record_login(&app_state.sqlite_provider.db, &user.id).await?;
    info!(user_id = %user.id, "User logged in");

    let token = create_token(
        &user,
        &app_state.config.jwt_secret,
        app_state.config.jwt_expires_in_secs,
    )
    .map_err(|e| AppError::Internal(e.into()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "user": user_payload(&user),
            "token": token,
        }
    })))
}
