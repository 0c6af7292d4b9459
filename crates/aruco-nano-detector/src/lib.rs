//! Square fiducial marker detection.
//!
//! Current focus:
//! - contour-based candidate extraction on an adaptively thresholded image,
//! - rotation-invariant decoding against `ARUCO_MIP_36h12` with jittered retries,
//! - one marker per id with sub-pixel refined corners,
//! - per-marker planar pose (IPPE) for a calibrated camera.
//!
//! Dictionary data and grid decoding live in `aruco-nano-dict`.
//!
//! ```no_run
//! use aruco_nano_core::GrayImage;
//! use aruco_nano_detector::detect;
//!
//! let img = GrayImage::filled(640, 480, 255);
//! for marker in detect(&img.view(), 10) {
//!     println!("{} at {:?}", marker.id, marker.corners[0]);
//! }
//! ```

mod detector;
mod marker;
mod pose;

pub use detector::{detect, quad_perimeter, DetectorParams, MarkerDetector};
pub use marker::Marker;
pub use pose::{
    estimate_square_pose, marker_object_points, rotation_vector, MarkerPose, PoseError,
};
