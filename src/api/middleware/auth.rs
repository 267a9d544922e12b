//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, checks it against the
//! in-memory session store, and injects `AuthenticatedUser` into request
//! extensions for downstream handlers.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthenticatedUser};

/// Bearer token from the `Authorization` header, if well-formed.
pub fn bearer_token<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Require a bearer token that belongs to a live session.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_session(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_session_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_session_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = bearer_token(&req).ok_or(ApiError::Unauthorized)?.to_string();

    let session = ctx.sessions.get(&token)?.ok_or_else(|| {
        tracing::debug!("Rejected unknown session token");
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        username: session.username,
        token,
    });

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-store"));

    Ok(response)
}
