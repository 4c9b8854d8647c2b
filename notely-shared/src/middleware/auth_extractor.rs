use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use crate::errors::AppError;
use crate::session::SessionState;
use crate::types::auth::AuthUser;

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: SessionState + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let id = state.sessions().resolve(token).map_err(|e| {
            tracing::debug!(error = %e, "session token rejected");
            AppError::unauthorized("invalid or expired token")
        })?;

        Ok(AuthUser { id })
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("access token required"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("invalid authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("access token required"))
}
