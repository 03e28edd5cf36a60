use std::path::PathBuf;
use thiserror::Error;

/// Image inspection and resize errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("{} is not a decodable image: {message}", path.display())]
    NotAnImage { path: PathBuf, message: String },

    /// Target size cannot be derived from the source dimensions.
    #[error("Invalid resize geometry: {0}")]
    Geometry(String),

    #[error("Image I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image codec failed for {}: {message}", path.display())]
    Codec { path: PathBuf, message: String },

    #[error("Image task failed: {0}")]
    Task(String),
}

impl ImageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<tokio::task::JoinError> for ImageError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
