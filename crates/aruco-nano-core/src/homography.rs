//! Plane-to-plane homographies for quads.
//!
//! Everything here is built from the closed-form map of the unit square
//! `(0,0),(1,0),(1,1),(0,1)` onto a quad. A general 4-point homography is the
//! composition of two such maps.

use nalgebra::{Matrix3, Point2, Vector3};

/// Projective map `p' ~ H * [x, y, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let q = self.apply_f64(Point2::new(p.x as f64, p.y as f64));
        Point2::new(q.x as f32, q.y as f32)
    }

    #[inline]
    pub fn apply_f64(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v.x / v.z, v.y / v.z)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

fn rescale(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let s = h[(2, 2)];
    if !s.is_finite() || s.abs() < 1e-12 || h.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(h / s)
}

fn square_to_quad_f64(q: &[Point2<f64>; 4]) -> Option<Matrix3<f64>> {
    let sx = q[0].x - q[1].x + q[2].x - q[3].x;
    let sy = q[0].y - q[1].y + q[2].y - q[3].y;
    let (dx1, dy1) = (q[1].x - q[2].x, q[1].y - q[2].y);
    let (dx2, dy2) = (q[3].x - q[2].x, q[3].y - q[2].y);

    let det = dx1 * dy2 - dx2 * dy1;
    if !det.is_finite() || det.abs() < 1e-12 {
        return None;
    }
    // Zero for parallelograms, where the map is affine.
    let g = (sx * dy2 - dx2 * sy) / det;
    let h = (dx1 * sy - sx * dy1) / det;

    Some(Matrix3::new(
        q[1].x - q[0].x + g * q[1].x,
        q[3].x - q[0].x + h * q[3].x,
        q[0].x,
        q[1].y - q[0].y + g * q[1].y,
        q[3].y - q[0].y + h * q[3].y,
        q[0].y,
        g,
        h,
        1.0,
    ))
}

/// Homography taking the unit square onto `quad` (corner `i` of the square
/// to `quad[i]`, starting at the origin and going through `(1, 0)`).
///
/// Returns `None` when corners 1, 2 and 3 are collinear.
pub fn square_to_quad(quad: &[Point2<f32>; 4]) -> Option<Homography> {
    let q = quad.map(|p| Point2::new(p.x as f64, p.y as f64));
    square_to_quad_f64(&q).and_then(rescale).map(Homography::new)
}

/// Homography with `dst[i] ~ H * src[i]` for four correspondences, scaled so
/// `H[(2,2)] == 1`.
///
/// Corner order must be consistent between `src` and `dst`.
pub fn homography_from_4pt_f64(
    src: &[Point2<f64>; 4],
    dst: &[Point2<f64>; 4],
) -> Option<Homography> {
    let from_src = square_to_quad_f64(src)?.try_inverse()?;
    let to_dst = square_to_quad_f64(dst)?;
    rescale(to_dst * from_src).map(Homography::new)
}
