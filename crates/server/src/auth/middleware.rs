//! # Authentication Middleware
//!
//! Axum extractor for JWT-based authentication. Protected handlers take an
//! `AuthenticatedUser` argument, which validates the `Authorization: Bearer`
//! header and loads the account from the database. Requests without a valid
//! token are rejected with a `401 Unauthorized` JSON body.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, warn};
use voxtutor_access::{find_user_by_id, User};

use crate::state::AppState;

/// The claims carried in every issued JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The subject of the token: the user's database ID.
    pub sub: String,
    pub email: String,
    pub name: String,
    /// The expiration timestamp.
    pub exp: usize,
}

/// Issues a signed token for a user, expiring after the configured lifetime.
pub fn create_token(
    user: &User,
    secret: &str,
    expires_in_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        + expires_in_secs;
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        exp: expiration as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

/// An Axum extractor that provides the currently authenticated user.
///
/// Resolution is strict: a missing header, an invalid or expired token, or a
/// deactivated account all reject the request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// A custom rejection type for authentication failures.
pub struct AuthError(StatusCode, String);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            self.0,
            Json(json!({ "success": false, "error": self.1 })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AuthError(
                        StatusCode::UNAUTHORIZED,
                        "Authentication token required.".to_string(),
                    )
                })?;

        let token_data = decode::<Claims>(
            bearer.token(),
            &DecodingKey::from_secret(state.config.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|e| {
            warn!("JWT validation failed: {}", e);
            AuthError(
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token.".to_string(),
            )
        })?;

        let user = find_user_by_id(&state.sqlite_provider.db, &token_data.claims.sub)
            .await
            .map_err(|e| {
                error!("Failed to load user for token: {}", e);
                AuthError(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Could not retrieve user: {e}"),
                )
            })?
            .ok_or_else(|| {
                // The account was deleted or deactivated after the token was issued.
                AuthError(StatusCode::NOT_FOUND, "User not found".to_string())
            })?;

        Ok(AuthenticatedUser(user))
    }
}
