use crate::auth::Claims;
use crate::db::models::UserRole;
use crate::server::router::AppState;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde_json::json;

fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Admin gate for write routes.
///
/// Produces one of three outcomes consumed uniformly by every protected
/// handler: pass-through (valid admin token), 401 (missing/invalid/expired
/// token), or 403 (valid token, wrong role).
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;

        let claims = state
            .tokens
            .verify(&token)
            .map_err(|_| AuthError::InvalidToken)?;

        if claims.role != UserRole::Admin {
            return Err(AuthError::Forbidden);
        }

        Ok(RequireAdmin(claims))
    }
}

pub enum AuthError {
    MissingToken,
    InvalidToken,
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, reason) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing bearer token",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Invalid or expired token",
            ),
            AuthError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Admin role required",
            ),
        };
        (status, Json(json!({ "error": error, "reason": reason }))).into_response()
    }
}
