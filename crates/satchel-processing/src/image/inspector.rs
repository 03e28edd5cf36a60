//! Image inspector - metadata extraction from files on disk

use async_trait::async_trait;
use image::{GenericImageView, ImageReader};
use satchel_core::ImageInfo;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::ImageError;

#[async_trait]
pub trait ImageInspector: Send + Sync {
    /// Read width, height and format of the image at `path`.
    ///
    /// Fails with [`ImageError::NotAnImage`] when the file does not decode.
    async fn inspect(&self, path: &Path) -> Result<ImageInfo, ImageError>;
}

/// [`ImageInspector`] backed by the `image` crate. Decoding runs on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProcessor;

impl ImageProcessor {
    pub fn extract_info(path: &Path, data: &[u8]) -> Result<ImageInfo, ImageError> {
        let not_an_image = |message: String| ImageError::NotAnImage {
            path: path.to_path_buf(),
            message,
        };

        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| not_an_image(e.to_string()))?;
        let format = reader
            .format()
            .map(|f| format!("{:?}", f))
            .ok_or_else(|| not_an_image("unrecognized image format".to_string()))?;
        let img = reader.decode().map_err(|e| not_an_image(e.to_string()))?;

        let (width, height) = img.dimensions();

        Ok(ImageInfo {
            width,
            height,
            format,
            size_bytes: Some(data.len() as u64),
        })
    }
}

#[async_trait]
impl ImageInspector for ImageProcessor {
    async fn inspect(&self, path: &Path) -> Result<ImageInfo, ImageError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| ImageError::io(path, e))?;
        let path: PathBuf = path.to_path_buf();

        tokio::task::spawn_blocking(move || Self::extract_info(&path, &data)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    #[tokio::test]
    async fn test_inspect_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        RgbImage::from_pixel(200, 50, Rgb([10, 20, 30]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let info = ImageProcessor.inspect(&path).await.unwrap();
        assert_eq!(info.width, 200);
        assert_eq!(info.height, 50);
        assert_eq!(info.format, "Png");
        assert!(info.size_bytes.unwrap() > 0);
    }

    #[tokio::test]
    async fn test_inspect_rejects_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"definitely not pixels").unwrap();

        let err = ImageProcessor.inspect(&path).await.unwrap_err();
        assert!(matches!(err, ImageError::NotAnImage { .. }));
    }

    #[tokio::test]
    async fn test_inspect_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageProcessor
            .inspect(&dir.path().join("gone.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::Io { .. }));
    }
}
