//! Registration, login, and bearer-token authentication
//!
//! Registration stores an Argon2 hash, never the password itself. Login
//! verifies the hash and mints an HS256 access token. Protected routes pull
//! the caller's identity out of the `Authorization` header through the
//! [`AuthUser`] extractor; a missing, malformed, or expired token rejects the
//! request with 401 before the handler runs.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use taskd_core::{
    error::TaskError,
    models::{Credentials, NewUser},
    validation::CredentialValidator,
};

use crate::credentials::{hash_password, verify_password};
use crate::error::ApiError;
use crate::server::AppState;

/// Register a new user.
///
/// `POST /auth/register` with `{username, password}`. Blank fields are a
/// validation failure; a username that already exists is a conflict.
pub async fn register(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    CredentialValidator::validate(&credentials)?;

    let password_hash = hash_password(&credentials.password)?;
    state
        .users
        .create(NewUser {
            username: credentials.username.clone(),
            password_hash,
        })
        .await?;

    tracing::info!(username = %credentials.username, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// Exchange a username and password for an access token.
///
/// `POST /auth/login` with `{username, password}`. Unknown usernames and
/// wrong passwords are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    CredentialValidator::validate(&credentials)?;

    let user = state
        .users
        .find_by_username(&credentials.username)
        .await?
        .ok_or(TaskError::InvalidCredentials)?;

    if !verify_password(&credentials.password, &user.password_hash) {
        return Err(TaskError::InvalidCredentials.into());
    }

    let token = state.jwt.mint(&user.username)?;
    tracing::info!(username = %user.username, "User logged in");
    Ok(Json(json!({ "access_token": token })))
}

/// The authenticated caller, extracted from a verified bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::MissingToken)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(ApiError::MissingToken)?;

        let claims = state.jwt.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            ApiError::InvalidToken
        })?;

        Ok(AuthUser {
            username: claims.username,
        })
    }
}
