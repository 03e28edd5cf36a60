//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use crate::views;

/// Registers the optional bearer JWT scheme referenced by protected operations.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Satchel API",
        version = "0.1.0",
        description = "Upload resource: multipart ingestion with optional image inspection and resizing, transactional storage of records and attachments, and attachment retrieval."
    ),
    paths(
        handlers::upload::list_uploads,
        handlers::upload::create_upload,
        handlers::upload::get_upload,
        handlers::upload::get_attachment_body,
        handlers::health::health_check,
    ),
    components(
        schemas(
            views::UploadSummary,
            views::UploadResponse,
            views::AttachmentResponse,
            views::BodyRef,
            handlers::health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "upload", description = "Upload records and their attachments"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_upload_paths() {
        let spec = get_openapi_spec();
        for path in [
            "/upload",
            "/upload/{id}",
            "/upload/{id}/attachments/{attachment_id}/body",
            "/health",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
