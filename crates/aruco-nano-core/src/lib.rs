//! Core types and utilities for square fiducial marker detection.
//!
//! This crate is intentionally small and purely numeric. It provides the
//! primitive image services the detector is built on:
//! - lightweight gray/color image views and luminance conversion,
//! - bilinear sampling with explicit border policies,
//! - adaptive mean thresholding,
//! - 4-point homographies,
//! - iterative sub-pixel corner refinement,
//! - a pinhole camera model with Brown-Conrady distortion.
//!
//! It does *not* know anything about marker dictionaries or candidate
//! extraction; see `aruco-nano-dict` and `aruco-nano-detector` for that.

mod camera;
mod homography;
mod image;
mod logger;
mod subpix;
mod threshold;

pub use camera::{CameraIntrinsics, CameraModel, RadialTangentialDistortion, UndistortConfig};
pub use homography::{homography_from_4pt_f64, square_to_quad, Homography};
pub use image::{
    luminance_from_color, sample_bilinear_clamped, sample_bilinear_interior,
    ColorImageView, ColorOrder, GrayImage, GrayImageView,
};
pub use subpix::{refine_corners_subpix, SubpixParams};
pub use threshold::{adaptive_threshold_mean_inv, AdaptiveThresholdParams};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
