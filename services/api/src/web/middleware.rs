//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use study_buddy_core::PortError;
use tracing::error;

use crate::web::{rest::ErrorBody, state::AppState};

/// Middleware that resolves the caller's auth token to a user id.
///
/// The token comes from an `Authorization: Bearer` header or, failing that, the
/// `session` cookie. If valid, the user id is inserted into the request
/// extensions for handlers to use. Otherwise the request is rejected with 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = auth_token(req.headers()) else {
        return unauthorized("Authentication required");
    };

    let user_id = match state.db.validate_auth_session(&token).await {
        Ok(user_id) => user_id,
        Err(PortError::Unauthorized) | Err(PortError::NotFound(_)) => {
            return unauthorized("Invalid or expired session");
        }
        Err(e) => {
            error!("Failed to validate auth session: {:?}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Internal server error")),
            )
                .into_response();
        }
    };

    req.extensions_mut().insert(user_id);
    next.run(req).await
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ErrorBody::new(message))).into_response()
}

/// Extracts the auth token, preferring the bearer header over the cookie.
fn auth_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| session_cookie(headers))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
