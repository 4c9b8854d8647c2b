//! Session tokens: HS256 JWTs carrying the user id.
//!
//! Tokens are stateless bearer credentials. There is no revocation list;
//! a token stays valid until its `exp` passes.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::errors::{AppError, AppResult, ErrorCode};
use crate::types::auth::Claims;

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl SessionIssuer {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> AppResult<String> {
        let claims = Claims::new(user_id, self.ttl_secs);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
    }

    /// Verify signature and expiry and return the embedded user id.
    pub fn resolve(&self, token: &str) -> AppResult<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::new(ErrorCode::TokenInvalid, "token has expired"),
            _ => AppError::new(ErrorCode::TokenInvalid, "invalid token"),
        })?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::new(ErrorCode::TokenInvalid, "invalid token subject"))
    }
}

/// Router state that can hand out the session issuer.
///
/// Implemented for `Arc<T>` so handlers can keep sharing state behind an `Arc`.
pub trait SessionState {
    fn sessions(&self) -> &SessionIssuer;
}

impl SessionState for SessionIssuer {
    fn sessions(&self) -> &SessionIssuer {
        self
    }
}

impl<T: SessionState> SessionState for Arc<T> {
    fn sessions(&self) -> &SessionIssuer {
        (**self).sessions()
    }
}
