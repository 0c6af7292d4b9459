use super::candidates::find_candidate_quads;
use super::quad::normalize_winding;
use super::DetectorParams;
use crate::Marker;
use aruco_nano_core::{
    adaptive_threshold_mean_inv, luminance_from_color, refine_corners_subpix, ColorImageView,
    GrayImageView,
};
use aruco_nano_dict::{builtins, decode_quad, rotate_corners, Dictionary};
use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Contour-based square marker detector.
///
/// Immutable after construction; one instance can serve many threads.
#[derive(Clone, Debug)]
pub struct MarkerDetector {
    params: DetectorParams,
    dict: &'static Dictionary,
}

impl Default for MarkerDetector {
    fn default() -> Self {
        Self::new(DetectorParams::default())
    }
}

impl MarkerDetector {
    /// Detector for the built-in `ARUCO_MIP_36h12` dictionary.
    pub fn new(params: DetectorParams) -> Self {
        Self {
            params,
            dict: &builtins::ARUCO_MIP_36H12,
        }
    }

    #[inline]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    #[inline]
    pub fn dictionary(&self) -> &'static Dictionary {
        self.dict
    }

    /// Detect markers in a gray image.
    ///
    /// The retry jitter is drawn from a fresh `StdRng` seeded with
    /// `params.seed`, so repeated calls on the same image agree.
    pub fn detect(&self, image: &GrayImageView<'_>) -> Vec<Marker> {
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        self.detect_with_rng(image, &mut rng)
    }

    /// Detect markers in a 3-channel image.
    pub fn detect_color(&self, image: &ColorImageView<'_>) -> Vec<Marker> {
        let gray = luminance_from_color(image);
        self.detect(&gray.view())
    }

    /// Detect markers with a caller-provided random source for the retry jitter.
    ///
    /// The result is sorted by id with at most one marker per id.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, image, rng), fields(w = image.width, h = image.height))
    )]
    pub fn detect_with_rng<R: Rng + ?Sized>(
        &self,
        image: &GrayImageView<'_>,
        rng: &mut R,
    ) -> Vec<Marker> {
        if image.is_empty() {
            log::warn!(
                "empty image ({}x{}), nothing to detect",
                image.width,
                image.height
            );
            return Vec::new();
        }
        if image.data.len() < image.width * image.height {
            log::warn!(
                "gray buffer holds {} bytes, {}x{} needs {}",
                image.data.len(),
                image.width,
                image.height,
                image.width * image.height
            );
            return Vec::new();
        }

        let binary = adaptive_threshold_mean_inv(image, &self.params.threshold);
        let quads = find_candidate_quads(
            &binary,
            self.params.min_contour_points,
            self.params.poly_epsilon_rel,
        );

        let jitter = Normal::new(0.0f32, self.params.jitter_sigma.max(0.0)).ok();
        let mut markers: Vec<Marker> = quads
            .into_iter()
            .filter_map(|quad| self.decode_candidate(image, normalize_winding(quad), jitter, rng))
            .collect();
        let decoded = markers.len();

        dedup_keep_largest(&mut markers);
        log::debug!("{} candidates decoded, {} unique ids", decoded, markers.len());

        if self.params.refine_corners && !markers.is_empty() {
            refine_marker_corners(image, &mut markers, &self.params);
        }
        markers
    }

    /// Sample and decode one normalized quad, retrying with jittered corners.
    fn decode_candidate<R: Rng + ?Sized>(
        &self,
        image: &GrayImageView<'_>,
        quad: [Point2<f32>; 4],
        jitter: Option<Normal<f32>>,
        rng: &mut R,
    ) -> Option<Marker> {
        for attempt in 0..self.params.attempts() {
            let sampled = match (attempt, jitter) {
                (0, _) | (_, None) => quad,
                (_, Some(noise)) => quad.map(|p| {
                    Point2::new(p.x + noise.sample(rng), p.y + noise.sample(rng))
                }),
            };
            if let Some(hit) = decode_quad(image, &sampled, self.dict) {
                if attempt > 0 {
                    log::trace!("id {} decoded on attempt {}", hit.id, attempt + 1);
                }
                return Some(Marker {
                    id: hit.id,
                    corners: rotate_corners(&quad, hit.rotation),
                    rotation: hit.rotation,
                });
            }
        }
        None
    }
}

/// Sort by id ascending (larger perimeter first within an id) and keep the
/// first marker of each id.
pub(crate) fn dedup_keep_largest(markers: &mut Vec<Marker>) {
    markers.sort_by(|a, b| {
        a.id
            .cmp(&b.id)
            .then_with(|| b.perimeter().total_cmp(&a.perimeter()))
    });
    markers.dedup_by_key(|m| m.id);
}

fn refine_marker_corners(
    image: &GrayImageView<'_>,
    markers: &mut [Marker],
    params: &DetectorParams,
) {
    let mut corners: Vec<Point2<f32>> = markers.iter().flat_map(|m| m.corners).collect();
    refine_corners_subpix(image, &mut corners, &params.subpix);
    for (marker, refined) in markers.iter_mut().zip(corners.chunks_exact(4)) {
        marker.corners.copy_from_slice(refined);
    }
}

/// Detect markers with default parameters and the given attempt budget.
///
/// `max_attempts_per_candidate == 0` behaves like `1`.
pub fn detect(image: &GrayImageView<'_>, max_attempts_per_candidate: u32) -> Vec<Marker> {
    MarkerDetector::new(DetectorParams::with_max_attempts(max_attempts_per_candidate)).detect(image)
}
