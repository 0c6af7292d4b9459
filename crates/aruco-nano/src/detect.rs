use crate::core::{ColorImageView, ColorOrder, GrayImageView};
use crate::{Marker, MarkerDetector};
use image::DynamicImage;
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Open and decode an image file.
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage, DetectError> {
    let reader = image::ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(image::ImageError::IoError)?;
    Ok(reader.decode()?)
}

/// Convert an `image::GrayImage` into the lightweight `aruco-nano-core` view type.
pub fn gray_view(img: &image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Borrow an `image::RgbImage` as an RGB color view.
pub fn color_view(img: &image::RgbImage) -> ColorImageView<'_> {
    ColorImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        order: ColorOrder::Rgb,
        data: img.as_raw(),
    }
}

/// Run `detector` on any decoded image.
///
/// Single-channel images are used as they are; everything else goes through
/// the detector's RGB luminance conversion.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, detector), fields(width = img.width(), height = img.height()))
)]
pub fn detect_markers(img: &DynamicImage, detector: &MarkerDetector) -> Vec<Marker> {
    match img {
        DynamicImage::ImageLuma8(gray) => detector.detect(&gray_view(gray)),
        DynamicImage::ImageRgb8(rgb) => detector.detect_color(&color_view(rgb)),
        other => {
            log::debug!("converting {:?} input to rgb8", other.color());
            let rgb = other.to_rgb8();
            detector.detect_color(&color_view(&rgb))
        }
    }
}

/// Convenience overload using `MarkerDetector::default()`.
pub fn detect_markers_default(img: &DynamicImage) -> Vec<Marker> {
    detect_markers(img, &MarkerDetector::default())
}

/// Build an `image::GrayImage` from a raw grayscale buffer.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<image::GrayImage, DetectError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some((w, h)) = w.zip(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    let Some(expected) = w.checked_mul(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        });
    }
    image::GrayImage::from_raw(width, height, pixels.to_vec())
        .ok_or(DetectError::InvalidGrayDimensions { width, height })
}

/// Detect markers in a raw row-major grayscale buffer.
pub fn detect_markers_from_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    detector: &MarkerDetector,
) -> Result<Vec<Marker>, DetectError> {
    let img = gray_image_from_slice(width, height, pixels)?;
    Ok(detector.detect(&gray_view(&img)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_buffer_length_is_checked() {
        let err = gray_image_from_slice(4, 3, &[0u8; 11]).expect_err("short buffer");
        assert!(matches!(
            err,
            DetectError::InvalidGrayBuffer {
                expected: 12,
                got: 11
            }
        ));
        assert!(gray_image_from_slice(4, 3, &[0u8; 12]).is_ok());
    }

    #[test]
    fn blank_buffers_yield_no_markers() {
        let detector = MarkerDetector::default();
        let found = detect_markers_from_gray_u8(32, 32, &[255u8; 32 * 32], &detector)
            .expect("valid buffer");
        assert!(found.is_empty());

        let rgba = DynamicImage::new_rgba8(40, 30);
        assert!(detect_markers(&rgba, &detector).is_empty());
    }
}
