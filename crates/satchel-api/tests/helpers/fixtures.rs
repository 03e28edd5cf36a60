//! Test fixtures: generated images and multipart parts.

use axum_test::multipart::Part;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// PNG of the given size.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 90, 160])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn file_part(bytes: impl Into<Vec<u8>>, file_name: &str, mime_type: &str) -> Part {
    Part::bytes(bytes.into())
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string())
}

pub fn png_part(width: u32, height: u32, file_name: &str) -> Part {
    file_part(create_test_png(width, height), file_name, "image/png")
}
