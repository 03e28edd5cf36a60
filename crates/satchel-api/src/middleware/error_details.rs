use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::DetailedErrorBody;

/// Whether error responses may carry internal details
#[derive(Debug, Clone, Copy)]
pub struct ErrorDetailsConfig {
    pub is_production: bool,
}

impl ErrorDetailsConfig {
    pub fn new(is_production: bool) -> Self {
        Self { is_production }
    }
}

/// Error details middleware
/// Replaces error bodies with their detailed form outside production
pub async fn error_details_middleware(
    State(config): State<ErrorDetailsConfig>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(DetailedErrorBody(body)) = response.extensions_mut().remove::<DetailedErrorBody>()
    else {
        return response;
    };
    if config.is_production {
        return response;
    }

    let status = response.status();
    let mut detailed = Json(body).into_response();
    *detailed.status_mut() = status;
    detailed
}
