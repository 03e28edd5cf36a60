//! Types for the ingestion pipeline.

use satchel_core::ImageInfo;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use satchel_core::constants::ORIGINAL_FILE_SUFFIX;

/// An uploaded file on its way through the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachmentFile {
    /// Current location; the resized image once resizing ran.
    pub path: PathBuf,
    /// Where the untouched upload was moved to, set only when resized.
    pub original_path: Option<PathBuf>,
    pub original_filename: String,
    pub content_type: Option<String>,
    pub size: u64,
    pub original_info: Option<ImageInfo>,
    pub info: Option<ImageInfo>,
}

impl AttachmentFile {
    pub fn new(
        path: impl Into<PathBuf>,
        original_filename: impl Into<String>,
        content_type: Option<String>,
        size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            original_path: None,
            original_filename: original_filename.into(),
            content_type,
            size,
            original_info: None,
            info: None,
        }
    }

    /// `path` with [`ORIGINAL_FILE_SUFFIX`] appended.
    pub fn original_path_for(path: &Path) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(ORIGINAL_FILE_SUFFIX);
        PathBuf::from(name)
    }

    /// Descriptor of the file as uploaded, persisted as the attachment's `original`.
    pub fn original_descriptor(&self) -> serde_json::Value {
        serde_json::json!({
            "filename": self.original_filename,
            "content_type": self.content_type,
            "size": self.size,
            "info": ImageInfo::to_json(self.original_info.as_ref()),
        })
    }
}

/// A decoded multipart body.
///
/// Files live in `workdir`, which is removed (best effort) when the upload is dropped.
#[derive(Debug, Default)]
pub struct DecodedUpload {
    pub fields: HashMap<String, Vec<String>>,
    pub files: HashMap<String, Vec<AttachmentFile>>,
    pub workdir: Option<TempDir>,
}

impl DecodedUpload {
    pub fn new(workdir: TempDir) -> Self {
        Self {
            workdir: Some(workdir),
            ..Default::default()
        }
    }

    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }

    pub fn push_file(&mut self, name: impl Into<String>, file: AttachmentFile) {
        self.files.entry(name.into()).or_default().push(file);
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(TempDir::path)
    }
}
