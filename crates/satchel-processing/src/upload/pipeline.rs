//! Ingestion pipeline: select → inspect → resize → re-inspect → persist.
//!
//! Steps run one file at a time, in upload order, and the first failure ends the
//! request. Only the persist step touches the store: the record and every attachment
//! are written in one transaction that is committed last, so a failed upload leaves
//! nothing visible behind.

use satchel_core::{AppError, ImageInfo, NewAttachment, PipelineConfig, ResizeSpec};
use satchel_db::{with_transaction, DocumentStore, StoreTransaction};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use super::types::{AttachmentFile, DecodedUpload};
use crate::error::ImageError;
use crate::image::{ImageInspector, ImageProcessor, ImageResize, ImageResizer, ResizeRequest};

fn inspection_error(file: &AttachmentFile, err: ImageError) -> AppError {
    AppError::ImageInspection {
        file: file.original_filename.clone(),
        message: err.to_string(),
    }
}

fn resize_error(file: &AttachmentFile, err: ImageError) -> AppError {
    match err {
        ImageError::Geometry(msg) => AppError::ResizeGeometry(msg),
        other => AppError::Resize {
            file: file.original_filename.clone(),
            message: other.to_string(),
        },
    }
}

pub struct IngestionPipeline {
    config: PipelineConfig,
    inspector: Arc<dyn ImageInspector>,
    resizer: Arc<dyn ImageResizer>,
    store: Arc<dyn DocumentStore>,
}

impl IngestionPipeline {
    /// Pipeline using the `image`-crate inspector and resizer.
    pub fn new(config: PipelineConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self::with_image_tools(
            config,
            store,
            Arc::new(ImageProcessor),
            Arc::new(ImageResize),
        )
    }

    pub fn with_image_tools(
        config: PipelineConfig,
        store: Arc<dyn DocumentStore>,
        inspector: Arc<dyn ImageInspector>,
        resizer: Arc<dyn ImageResizer>,
    ) -> Self {
        Self {
            config,
            inspector,
            resizer,
            store,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline and return the id of the committed record.
    ///
    /// The upload (and with it the request's temporary directory) is dropped on return.
    #[tracing::instrument(skip_all, fields(owner = ?owner))]
    pub async fn ingest(
        &self,
        mut upload: DecodedUpload,
        owner: Option<Uuid>,
    ) -> Result<Uuid, AppError> {
        let mut files = self.select_files(&mut upload)?;
        tracing::debug!(files = files.len(), "Selected upload files");

        if self.config.image_aware() {
            self.inspect_originals(&mut files).await?;
        }

        let resize = self.config.resize();
        if let Some(spec) = resize {
            self.resize_files(&mut files, spec).await?;
        }

        if self.config.image_aware() {
            if resize.is_some() {
                self.inspect_results(&mut files).await?;
            } else {
                for file in files.iter_mut() {
                    file.info = file.original_info.clone();
                }
            }
        }

        let record_id = self.persist(&files, owner).await?;
        tracing::info!(record_id = %record_id, attachments = files.len(), "Upload stored");
        Ok(record_id)
    }

    /// Take the files of the first configured field that has any.
    pub fn select_files(&self, upload: &mut DecodedUpload) -> Result<Vec<AttachmentFile>, AppError> {
        for name in self.config.attachment_field_names() {
            if let Some(files) = upload.files.remove(name) {
                if !files.is_empty() {
                    tracing::debug!(field = %name, "Using attachment field");
                    return Ok(files);
                }
            }
        }

        Err(AppError::Validation(format!(
            "No file uploaded; expected one of: {}",
            self.config.attachment_field_names().join(", ")
        )))
    }

    async fn inspect_originals(&self, files: &mut [AttachmentFile]) -> Result<(), AppError> {
        for file in files.iter_mut() {
            let info = self
                .inspector
                .inspect(&file.path)
                .await
                .map_err(|e| inspection_error(file, e))?;
            tracing::debug!(
                file = %file.original_filename,
                width = info.width,
                height = info.height,
                "Inspected original image"
            );
            file.original_info = Some(info);
        }
        Ok(())
    }

    async fn resize_files(
        &self,
        files: &mut [AttachmentFile],
        spec: ResizeSpec,
    ) -> Result<(), AppError> {
        for file in files.iter_mut() {
            let source = file.original_info.as_ref().map(|i| (i.width, i.height));
            let (width, height) =
                ImageResize::calculate_dimensions(source, spec).map_err(|e| resize_error(file, e))?;

            let original_path = AttachmentFile::original_path_for(&file.path);
            tokio::fs::rename(&file.path, &original_path)
                .await
                .map_err(|e| resize_error(file, ImageError::Io {
                    path: file.path.clone(),
                    source: e,
                }))?;
            file.original_path = Some(original_path.clone());

            self.resizer
                .resize(ResizeRequest {
                    src: original_path,
                    dst: file.path.clone(),
                    width: Some(width),
                    height: Some(height),
                })
                .await
                .map_err(|e| resize_error(file, e))?;
            tracing::debug!(file = %file.original_filename, width, height, "Resized image");
        }
        Ok(())
    }

    async fn inspect_results(&self, files: &mut [AttachmentFile]) -> Result<(), AppError> {
        for file in files.iter_mut() {
            let info = self
                .inspector
                .inspect(&file.path)
                .await
                .map_err(|e| inspection_error(file, e))?;
            file.info = Some(info);
        }
        Ok(())
    }

    async fn persist(
        &self,
        files: &[AttachmentFile],
        owner: Option<Uuid>,
    ) -> Result<Uuid, AppError> {
        let upload_type = self.config.upload_type().to_string();
        let pending: Vec<(PathBuf, NewAttachment)> = files
            .iter()
            .map(|file| {
                let meta =
                    NewAttachment::new(&file.original_filename, file.content_type.as_deref())
                        .with_info(ImageInfo::to_json(file.info.as_ref()))
                        .with_original(file.original_descriptor());
                (file.path.clone(), meta)
            })
            .collect();

        with_transaction(self.store.as_ref(), move |tx| {
            Box::pin(async move { write_all(tx.as_mut(), &upload_type, owner, pending).await })
        })
        .await
    }
}

/// Create the record and then its attachments, stopping at the first failure.
async fn write_all(
    tx: &mut dyn StoreTransaction,
    upload_type: &str,
    owner: Option<Uuid>,
    pending: Vec<(PathBuf, NewAttachment)>,
) -> Result<Uuid, AppError> {
    let record = tx.create_record(upload_type, owner).await?;

    for (path, meta) in pending {
        let name = meta.name.clone();
        tx.create_attachment(&record, &path, meta)
            .await
            .map_err(|e| {
                tracing::warn!(
                    record_id = %record.id,
                    file = %name,
                    error = %e,
                    "Failed to store attachment"
                );
                AppError::from(e)
            })?;
    }

    Ok(record.id)
}
