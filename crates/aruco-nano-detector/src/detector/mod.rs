//! Marker detection pipeline.
//!
//! Binarize, trace contours into convex quad candidates, normalize their
//! winding, decode each one (retrying with jittered corners), keep the largest
//! detection per id and refine the surviving corners to sub-pixel accuracy.

mod candidates;
mod params;
mod pipeline;
mod quad;

pub use params::DetectorParams;
pub use pipeline::{detect, MarkerDetector};
pub use quad::quad_perimeter;
