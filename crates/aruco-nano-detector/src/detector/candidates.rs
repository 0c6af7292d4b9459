//! Candidate quads from the binarized image.

use super::quad::is_convex;
use aruco_nano_core::GrayImage;
use imageproc::contours::find_contours;
use imageproc::geometry::approximate_polygon_dp;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Trace every border of `binary` (non-zero = foreground) and keep the
/// contours that simplify to a convex quadrilateral.
///
/// Contours shorter than `min_points` are skipped. The polygon tolerance is
/// `epsilon_rel * contour.len()`. Corner order is the contour order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(binary), fields(w = binary.width, h = binary.height))
)]
pub(crate) fn find_candidate_quads(
    binary: &GrayImage,
    min_points: usize,
    epsilon_rel: f64,
) -> Vec<[Point2<f32>; 4]> {
    if binary.data.is_empty() {
        return Vec::new();
    }
    let Some(buffer) = image::GrayImage::from_raw(
        binary.width as u32,
        binary.height as u32,
        binary.data.clone(),
    ) else {
        log::warn!(
            "binary buffer does not match {}x{}",
            binary.width,
            binary.height
        );
        return Vec::new();
    };

    let contours = find_contours::<i32>(&buffer);
    let min_points = min_points.max(4);
    let mut quads = Vec::new();

    for contour in contours.iter().filter(|c| c.points.len() >= min_points) {
        let epsilon = (epsilon_rel * contour.points.len() as f64).max(f64::EPSILON);
        let poly = approximate_polygon_dp(&contour.points, epsilon, true);
        if poly.len() != 4 {
            continue;
        }
        let quad: [Point2<f32>; 4] =
            std::array::from_fn(|i| Point2::new(poly[i].x as f32, poly[i].y as f32));
        if is_convex(&quad) {
            quads.push(quad);
        }
    }

    log::debug!(
        "{} contours -> {} convex quad candidates",
        contours.len(),
        quads.len()
    );
    quads
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Filled foreground rectangle, the way the adaptive threshold never
    /// produces it but the contour tracer does not care.
    fn rect_image(w: usize, h: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> GrayImage {
        let mut img = GrayImage::new(w, h);
        for y in y0..y1 {
            for x in x0..x1 {
                img.data[y * w + x] = 255;
            }
        }
        img
    }

    #[test]
    fn solid_rectangle_yields_one_quad() {
        let img = rect_image(80, 60, 10, 12, 50, 42);
        let quads = find_candidate_quads(&img, 50, 0.05);
        assert_eq!(quads.len(), 1);
        let q = quads[0];
        // The tracer starts at the first foreground pixel in raster order.
        assert_eq!(q[0], Point2::new(10.0, 12.0));
        let mut xs: Vec<f32> = q.iter().map(|p| p.x).collect();
        xs.sort_by(f32::total_cmp);
        assert_eq!(xs, vec![10.0, 10.0, 49.0, 49.0]);
    }

    #[test]
    fn short_contours_are_ignored() {
        let img = rect_image(40, 40, 5, 5, 12, 12);
        assert!(find_candidate_quads(&img, 50, 0.05).is_empty());
    }

    #[test]
    fn empty_image_has_no_candidates() {
        let img = GrayImage::new(0, 0);
        assert!(find_candidate_quads(&img, 50, 0.05).is_empty());
    }
}
