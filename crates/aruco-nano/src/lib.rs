//! High-level facade crate for the `aruco-nano-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - (feature-gated) helpers that run the marker detector on `image` crate
//!   buffers and draw the results.
//!
//! ## Quickstart
//!
//! ```no_run
//! use aruco_nano::detect;
//! use aruco_nano::{CameraModel, MarkerDetector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = detect::load_image("scene.png")?;
//! let markers = detect::detect_markers(&img, &MarkerDetector::default());
//!
//! let camera = CameraModel::pinhole(900.0, 900.0, 640.0, 360.0);
//! for m in &markers {
//!     let pose = m.estimate_pose(&camera, 0.05)?;
//!     println!("id {} at {:?}", m.id, pose.tvec);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `aruco_nano::core`: image views, thresholding, homographies, sub-pixel refinement, camera model.
//! - `aruco_nano::dict`: the `ARUCO_MIP_36h12` dictionary and grid decoding.
//! - `aruco_nano::detector`: the detection pipeline, markers and pose.
//! - `aruco_nano::detect` (feature `image`): helpers from `image::DynamicImage`.
//! - `aruco_nano::draw` (feature `image`): marker overlays.

pub use aruco_nano_core as core;
pub use aruco_nano_detector as detector;
pub use aruco_nano_dict as dict;

pub use aruco_nano_core::{CameraModel, GrayImageView};
pub use aruco_nano_detector::{DetectorParams, Marker, MarkerDetector, MarkerPose, PoseError};

#[cfg(feature = "image")]
pub mod detect;

#[cfg(feature = "image")]
pub mod draw;
