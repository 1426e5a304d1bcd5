use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::inbound::http::router::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied request id that is kept as is.
pub const MAX_REQUEST_ID_LEN: usize = 64;

/// Drops a client-supplied `X-Request-Id` that is empty or longer than
/// [`MAX_REQUEST_ID_LEN`], so the id layer generates a fresh one.
pub async fn limit_request_id(mut req: Request) -> Request {
    let unusable = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .is_some_and(|id| id.is_empty() || id.len() > MAX_REQUEST_ID_LEN);

    if unusable {
        req.headers_mut().remove(REQUEST_ID_HEADER);
    }

    req
}

/// Middleware that verifies the bearer access token and stores the resolved
/// `AuthenticatedUser` in the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let user = state
        .auth_service
        .verify_access_token(token)
        .await
        .map_err(|e| {
            tracing::warn!(reason = %e, "Bearer token rejected");
            ApiError::from(e)
        })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )),
    }
}
