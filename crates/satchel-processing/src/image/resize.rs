use async_trait::async_trait;
use image::{DynamicImage, GenericImageView, ImageReader};
use satchel_core::ResizeSpec;
use std::path::{Path, PathBuf};

use crate::error::ImageError;

/// One resize job: read `src`, write the resized image to `dst` in the same format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeRequest {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[async_trait]
pub trait ImageResizer: Send + Sync {
    /// Needs at least one target dimension; a missing one keeps the source aspect ratio.
    async fn resize(&self, request: ResizeRequest) -> Result<(), ImageError>;
}

/// Image resize operations
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResize;

impl ImageResize {
    /// Calculate target dimensions for `spec`.
    ///
    /// With a single target dimension the other is `round(target * other / this)` of the
    /// source, never less than 1. Both given: used as-is, the source is not needed.
    pub fn calculate_dimensions(
        source: Option<(u32, u32)>,
        spec: ResizeSpec,
    ) -> Result<(u32, u32), ImageError> {
        Self::derive(source, spec.width(), spec.height())
    }

    fn derive(
        source: Option<(u32, u32)>,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<(u32, u32), ImageError> {
        match (width, height) {
            (Some(w), Some(h)) => Ok((w, h)),
            (Some(w), None) => {
                let (orig_width, orig_height) = Self::known_source(source)?;
                let aspect_ratio = orig_height as f64 / orig_width as f64;
                let h = (w as f64 * aspect_ratio).round() as u32;
                Ok((w, h.max(1)))
            }
            (None, Some(h)) => {
                let (orig_width, orig_height) = Self::known_source(source)?;
                let aspect_ratio = orig_width as f64 / orig_height as f64;
                let w = (h as f64 * aspect_ratio).round() as u32;
                Ok((w.max(1), h))
            }
            (None, None) => Err(ImageError::Geometry(
                "at least one target dimension is required".to_string(),
            )),
        }
    }

    fn known_source(source: Option<(u32, u32)>) -> Result<(u32, u32), ImageError> {
        match source {
            Some((w, h)) if w > 0 && h > 0 => Ok((w, h)),
            Some((w, h)) => Err(ImageError::Geometry(format!(
                "source dimensions {}x{} contain a zero",
                w, h
            ))),
            None => Err(ImageError::Geometry(
                "source dimensions are unknown".to_string(),
            )),
        }
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> image::imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            image::imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            image::imageops::FilterType::CatmullRom
        } else {
            image::imageops::FilterType::Lanczos3
        }
    }

    /// Resize image to exact dimensions
    pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }

    fn resize_file(request: &ResizeRequest) -> Result<(), ImageError> {
        let codec = |path: &Path, e: image::ImageError| ImageError::Codec {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let reader = ImageReader::open(&request.src)
            .map_err(|e| ImageError::io(&request.src, e))?
            .with_guessed_format()
            .map_err(|e| ImageError::io(&request.src, e))?;
        let format = reader.format().ok_or_else(|| ImageError::NotAnImage {
            path: request.src.clone(),
            message: "unrecognized image format".to_string(),
        })?;
        let img = reader.decode().map_err(|e| codec(&request.src, e))?;

        let (width, height) = Self::derive(Some(img.dimensions()), request.width, request.height)?;
        Self::resize_image(&img, width, height)
            .save_with_format(&request.dst, format)
            .map_err(|e| codec(&request.dst, e))
    }
}

#[async_trait]
impl ImageResizer for ImageResize {
    async fn resize(&self, request: ResizeRequest) -> Result<(), ImageError> {
        tokio::task::spawn_blocking(move || Self::resize_file(&request)).await?
    }
}
