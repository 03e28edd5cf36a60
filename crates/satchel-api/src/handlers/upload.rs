//! Upload resource: list, ingest, read, and serve attachment bodies.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, rejection::PathRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use satchel_core::constants::FIRST_ATTACHMENT;
use satchel_core::{AppError, Attachment, UploadRecord};
use satchel_db::{with_transaction, AttachmentSelector, RecordFilter, StoreTransaction};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::constants::upload_location;
use crate::error::{ErrorResponse, HttpAppError};
use crate::multipart::decode_multipart;
use crate::state::AppState;
use crate::views::{UploadResponse, UploadSummary};

/// Load the single record of `record_type` with `id`.
async fn find_record(
    tx: &mut dyn StoreTransaction,
    record_type: &str,
    id: Uuid,
) -> Result<UploadRecord, AppError> {
    let mut records = tx.search_records(record_type, RecordFilter::by_id(id)).await?;
    match records.len() {
        0 => Err(AppError::NotFound(format!("Upload {} not found", id))),
        1 => Ok(records.remove(0)),
        n => Err(AppError::Integrity(format!(
            "{} upload records share id {}",
            n, id
        ))),
    }
}

async fn find_attachment(
    tx: &mut dyn StoreTransaction,
    record: &UploadRecord,
    selector: AttachmentSelector,
) -> Result<Attachment, AppError> {
    let mut attachments = tx.search_attachments(record, selector).await?;
    match attachments.len() {
        0 => Err(AppError::NotFound(format!(
            "Attachment not found on upload {}",
            record.id
        ))),
        1 => Ok(attachments.remove(0)),
        n => Err(AppError::Integrity(format!(
            "{} attachments of upload {} match one id",
            n, record.id
        ))),
    }
}

fn path_error(rejection: PathRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}

fn parse_selector(attachment_id: &str) -> Result<AttachmentSelector, AppError> {
    if attachment_id == FIRST_ATTACHMENT {
        return Ok(AttachmentSelector::First);
    }
    Uuid::parse_str(attachment_id)
        .map(AttachmentSelector::Id)
        .map_err(|_| {
            AppError::Validation(format!(
                "Attachment id must be a UUID or '{}'",
                FIRST_ATTACHMENT
            ))
        })
}

/// List the caller's uploads
#[utoipa::path(
    get,
    path = "/upload",
    tag = "upload",
    responses(
        (status = 200, description = "Uploads owned by the caller", body = Vec<UploadSummary>),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all, fields(operation = "list_uploads", owner = ?user.0))]
pub async fn list_uploads(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<UploadSummary>>, HttpAppError> {
    let owner = user.require()?;
    let upload_type = state.upload_type().to_string();

    let records = with_transaction(state.store.as_ref(), move |tx| {
        Box::pin(async move {
            Ok(tx
                .search_records(&upload_type, RecordFilter::by_owner(owner))
                .await?)
        })
    })
    .await?;

    Ok(Json(records.iter().map(UploadSummary::from).collect()))
}

/// Upload one or more files
///
/// Files are taken from the first configured field (by default `image`, then
/// `background`) that carries any. Responds with a redirect to the new record.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    request_body(content = Vec<u8>, content_type = "multipart/form-data"),
    responses(
        (status = 303, description = "Upload stored; Location points at the new record"),
        (status = 400, description = "No file, malformed body or unreadable image", body = ErrorResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 413, description = "Body too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(operation = "create_upload", owner = ?user.0))]
pub async fn create_upload(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Redirect, HttpAppError> {
    let multipart = multipart.map_err(|e| AppError::Decode(e.body_text()))?;
    let upload = decode_multipart(multipart, state.config.upload_tmp_dir.as_deref()).await?;

    let record_id = state.pipeline.ingest(upload, user.0).await?;

    Ok(Redirect::to(&upload_location(record_id)))
}

/// Get an upload with its attachment metadata
#[utoipa::path(
    get,
    path = "/upload/{id}",
    tag = "upload",
    params(("id" = Uuid, Path, description = "Upload record ID")),
    responses(
        (status = 200, description = "Upload record", body = UploadResponse),
        (status = 400, description = "Malformed upload id", body = ErrorResponse),
        (status = 404, description = "Upload not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(record_id = tracing::field::Empty))]
pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let Path(id) = path.map_err(path_error)?;
    tracing::Span::current().record("record_id", tracing::field::display(id));
    let upload_type = state.upload_type().to_string();

    let response = with_transaction(state.store.as_ref(), move |tx| {
        Box::pin(async move {
            let record = find_record(tx.as_mut(), &upload_type, id).await?;
            let attachments = tx
                .search_attachments(&record, AttachmentSelector::All)
                .await?;
            if attachments.is_empty() {
                return Err(AppError::Integrity(format!(
                    "Upload {} has no attachments",
                    id
                )));
            }
            Ok(UploadResponse::new(&record, &attachments))
        })
    })
    .await?;

    Ok(Json(response))
}

/// Download an attachment body
///
/// `attachment_id` is an attachment UUID or `first` for the earliest attachment.
#[utoipa::path(
    get,
    path = "/upload/{id}/attachments/{attachment_id}/body",
    tag = "upload",
    params(
        ("id" = Uuid, Path, description = "Upload record ID"),
        ("attachment_id" = String, Path, description = "Attachment ID or `first`")
    ),
    responses(
        (status = 200, description = "Attachment body", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Malformed upload or attachment id", body = ErrorResponse),
        (status = 404, description = "Upload or attachment not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(record_id = tracing::field::Empty, attachment = tracing::field::Empty))]
pub async fn get_attachment_body(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(Uuid, String)>, PathRejection>,
) -> Result<Response, HttpAppError> {
    let Path((id, attachment_id)) = path.map_err(path_error)?;
    let span = tracing::Span::current();
    span.record("record_id", tracing::field::display(id));
    span.record("attachment", attachment_id.as_str());
    let selector = parse_selector(&attachment_id)?;
    let upload_type = state.upload_type().to_string();

    let (attachment, body) = with_transaction(state.store.as_ref(), move |tx| {
        Box::pin(async move {
            let record = find_record(tx.as_mut(), &upload_type, id).await?;
            let attachment = find_attachment(tx.as_mut(), &record, selector).await?;
            let body = tx.load_body(&attachment).await?;
            Ok((attachment, body))
        })
    })
    .await?;

    tracing::debug!(attachment_id = %attachment.id, size = body.len(), "Serving attachment body");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, attachment.content_type_or_default())
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            AppError::Internal(e.to_string())
        })?;

    Ok(response.into_response())
}
