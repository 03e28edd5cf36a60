use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use satchel_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub exp: i64,
    pub iat: i64,
}

/// Caller identity. `None` for anonymous requests.
///
/// A missing `Authorization` header (or a server without a JWT secret) yields an
/// anonymous caller; a header that is present but invalid is rejected with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Option<Uuid>);

impl CurrentUser {
    /// The user id, or an authentication error for anonymous callers.
    pub fn require(self) -> Result<Uuid, AppError> {
        self.0
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CurrentUser(None));
        };
        let Some(jwt) = state.jwt.as_ref() else {
            tracing::debug!("Ignoring Authorization header: no JWT secret configured");
            return Ok(CurrentUser(None));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                AppError::Unauthorized("Authorization header must be 'Bearer <token>'".into())
            })?;

        let claims = jwt.verify(token.trim())?;
        Ok(CurrentUser(Some(claims.sub)))
    }
}
