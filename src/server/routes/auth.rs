//! Login and registration. Both endpoints are public.
//!
//! Unknown usernames, disabled accounts and wrong passwords are
//! indistinguishable to the caller: all yield the same 401 outcome so the
//! endpoint cannot be used to enumerate usernames.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{check_email, check_len, require};
use crate::db::models::UserRole;
use crate::db::patch::UserCreate;
use crate::error::CmsError;
use crate::server::router::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, CmsError> {
    let Json(request) = payload
        .map_err(|_| CmsError::Validation("Request body must be a JSON object".to_string()))?;

    require("Username", request.username.as_deref())?;
    require("Password", request.password.as_deref())?;
    let username = request.username.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let user = state
        .db
        .find_user_by_username(&username)
        .await?
        .filter(|user| user.enabled)
        .ok_or(CmsError::AuthenticationFailed)?;

    let password_ok = state
        .passwords
        .verify(password, user.password_hash.clone())
        .await?;
    if !password_ok {
        return Err(CmsError::AuthenticationFailed);
    }

    let token = state.tokens.issue(&user)?;
    info!(username = %user.username, "user logged in");

    Ok(Json(AuthResponse {
        token,
        token_type: "Bearer",
        username: user.username,
        email: user.email,
        role: user.role,
    }))
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), CmsError> {
    let Json(request) = payload
        .map_err(|_| CmsError::Validation("Request body must be a JSON object".to_string()))?;

    require("Username", request.username.as_deref())?;
    check_len("Username", request.username.as_deref(), 50)?;
    let username = request.username.unwrap_or_default();
    if username.trim().chars().count() < 3 {
        return Err(CmsError::Validation(
            "Username must be at least 3 characters".to_string(),
        ));
    }

    require("Email", request.email.as_deref())?;
    check_len("Email", request.email.as_deref(), 255)?;
    let email = request.email.unwrap_or_default();
    check_email(&email)?;

    require("Password", request.password.as_deref())?;
    check_len("Password", request.password.as_deref(), 100)?;
    let password = request.password.unwrap_or_default();
    if password.chars().count() < 6 {
        return Err(CmsError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    if state.db.username_exists(&username).await? {
        return Err(CmsError::Validation(
            "Username is already taken".to_string(),
        ));
    }
    if state.db.email_exists(&email).await? {
        return Err(CmsError::Validation("Email is already in use".to_string()));
    }

    let password_hash = state.passwords.hash(password).await?;
    let user = state
        .db
        .create_user(UserCreate {
            username,
            email,
            password_hash,
            role: UserRole::User,
        })
        .await?;

    info!(username = %user.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
}
