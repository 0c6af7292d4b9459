use aruco_nano_core::{AdaptiveThresholdParams, SubpixParams};
use serde::{Deserialize, Serialize};

/// Configuration for [`crate::MarkerDetector`].
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Adaptive binarization (block 7, offset 7).
    pub threshold: AdaptiveThresholdParams,
    /// Contours with fewer points are ignored.
    pub min_contour_points: usize,
    /// Polygon approximation tolerance as a fraction of the contour point count.
    pub poly_epsilon_rel: f64,
    /// Sampling attempts per candidate; `0` behaves like `1`.
    pub max_attempts_per_candidate: u32,
    /// Standard deviation (pixels) of the corner jitter used on retries.
    pub jitter_sigma: f32,
    /// Seed of the jitter RNG created by [`crate::MarkerDetector::detect`].
    pub seed: u64,
    /// Run sub-pixel refinement on the accepted corners.
    pub refine_corners: bool,
    pub subpix: SubpixParams,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            threshold: AdaptiveThresholdParams::default(),
            min_contour_points: 50,
            poly_epsilon_rel: 0.05,
            max_attempts_per_candidate: 10,
            jitter_sigma: 0.75,
            seed: 0,
            refine_corners: true,
            subpix: SubpixParams::default(),
        }
    }
}

impl DetectorParams {
    /// Defaults with a different attempt budget.
    pub fn with_max_attempts(max_attempts_per_candidate: u32) -> Self {
        Self {
            max_attempts_per_candidate,
            ..Self::default()
        }
    }

    /// Effective attempt budget (at least one).
    #[inline]
    pub fn attempts(&self) -> u32 {
        self.max_attempts_per_candidate.max(1)
    }
}
