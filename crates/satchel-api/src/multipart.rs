//! Multipart decoding into request-scoped temporary files

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use satchel_core::AppError;
use satchel_processing::{AttachmentFile, DecodedUpload};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Decode(err.body_text())
    }
}

fn create_workdir(tmp_root: Option<&Path>) -> Result<tempfile::TempDir, AppError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("satchel-upload-");
    let dir = match tmp_root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    };
    dir.map_err(|e| AppError::Internal(format!("Failed to create upload directory: {}", e)))
}

/// Decode a multipart body.
///
/// Text parts become fields; parts with a filename are streamed to disk inside a fresh
/// temporary directory (under `tmp_root` when given) owned by the returned upload.
pub async fn decode_multipart(
    mut multipart: Multipart,
    tmp_root: Option<&Path>,
) -> Result<DecodedUpload, AppError> {
    let mut upload = DecodedUpload::new(create_workdir(tmp_root)?);

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            tracing::debug!("Skipping unnamed multipart part");
            continue;
        };

        if field.file_name().is_none() {
            let value = field.text().await.map_err(multipart_error)?;
            upload.push_field(name, value);
            continue;
        }

        let dir = upload
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| AppError::Internal("Upload directory missing".to_string()))?;
        let file = save_file(field, &dir).await?;
        tracing::debug!(
            field = %name,
            file = %file.original_filename,
            size = file.size,
            "Received upload file"
        );
        upload.push_file(name, file);
    }

    Ok(upload)
}

async fn save_file(mut field: Field<'_>, dir: &Path) -> Result<AttachmentFile, AppError> {
    let original_filename = field
        .file_name()
        .filter(|n| !n.is_empty())
        .unwrap_or("unknown")
        .to_string();
    let content_type = field.content_type().map(str::to_string);

    let path: PathBuf = dir.join(Uuid::new_v4().to_string());
    let mut out = tokio::fs::File::create(&path).await?;
    let mut size: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        out.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    out.flush().await?;

    Ok(AttachmentFile::new(
        path,
        original_filename,
        content_type,
        size,
    ))
}
