//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`; anything that converts into `AppError`
//! converts into `HttpAppError` and renders as a JSON [`ErrorResponse`].
//!
//! The rendered body never carries internal details. For non-sensitive errors the
//! detailed body rides along as a [`DetailedErrorBody`] response extension, which
//! [`crate::middleware::error_details_middleware`] publishes outside production.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use satchel_core::{AppError, ErrorMetadata, LogLevel};
use satchel_db::DbError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: both the trait and `AppError` are foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<DbError> for HttpAppError {
    fn from(err: DbError) -> Self {
        HttpAppError(err.into())
    }
}

/// Error body with `details` and `error_type` filled in.
#[derive(Debug, Clone)]
pub struct DetailedErrorBody(pub ErrorResponse);

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse {
            error: app_error.client_message(),
            details: None,
            error_type: None,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        };
        let detailed = (!app_error.is_sensitive()).then(|| {
            DetailedErrorBody(ErrorResponse {
                details: Some(app_error.detailed_message()),
                error_type: Some(app_error.error_type().to_string()),
                ..body.clone()
            })
        });

        let mut response = (status, Json(body)).into_response();
        if let Some(detailed) = detailed {
            response.extensions_mut().insert(detailed);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (
                AppError::Integrity("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(HttpAppError(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_details_only_attached_for_non_sensitive_errors() {
        let response = HttpAppError(AppError::Validation("No file uploaded".into())).into_response();
        let detailed = response.extensions().get::<DetailedErrorBody>().unwrap();
        assert_eq!(detailed.0.code, "VALIDATION_ERROR");
        assert_eq!(detailed.0.error_type.as_deref(), Some("Validation"));
        assert!(detailed.0.details.as_deref().unwrap().contains("No file uploaded"));

        let response = HttpAppError(AppError::Persistence("disk full".into())).into_response();
        assert!(response.extensions().get::<DetailedErrorBody>().is_none());
    }

    #[test]
    fn test_missing_attachment_is_integrity_error() {
        let err = HttpAppError::from(DbError::MissingAttachment(uuid::Uuid::nil()));
        assert!(matches!(err.0, AppError::Integrity(_)));
    }
}
