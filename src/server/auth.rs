//! Bearer-token middleware for the credential routes.
//!
//! Resolves `Authorization: Bearer <token>` through the configured
//! [`IdentityProvider`](crate::auth::IdentityProvider) and stores the
//! resulting [`Caller`] in the request extensions. Requests without a
//! valid token are rejected with 401 before any handler runs, so the
//! store is never touched for them.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::Caller;
use crate::errors::VaultError;

use super::handlers::ApiError;
use super::AppState;

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(&request) else {
        tracing::debug!("request without bearer token rejected");
        return Err(VaultError::Unauthorized.into());
    };

    let caller: Caller = state.identity.authenticate(token).map_err(|e| {
        tracing::debug!("bearer token rejected");
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}
