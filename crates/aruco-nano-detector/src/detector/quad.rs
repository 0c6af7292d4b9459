//! Quad geometry helpers: winding, convexity, perimeter.

use nalgebra::Point2;

/// Z component of `(p1 - p0) × (p2 - p0)`.
#[inline]
pub(crate) fn corner_cross(quad: &[Point2<f32>; 4]) -> f32 {
    (quad[1] - quad[0]).perp(&(quad[2] - quad[0]))
}

/// Put the quad into the canonical winding by swapping corners 1 and 3 when
/// the cross product of edges 0→1 and 0→2 is negative. Idempotent.
pub(crate) fn normalize_winding(mut quad: [Point2<f32>; 4]) -> [Point2<f32>; 4] {
    if corner_cross(&quad) < 0.0 {
        quad.swap(1, 3);
    }
    quad
}

/// Strict convexity: every turn has the same non-zero orientation.
pub(crate) fn is_convex(quad: &[Point2<f32>; 4]) -> bool {
    let mut sign = 0.0f32;
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let c = quad[(i + 2) % 4];
        let turn = (b - a).perp(&(c - b));
        if !turn.is_finite() || turn == 0.0 {
            return false;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }
    true
}

/// Sum of the four wrap-around edge lengths.
pub fn quad_perimeter(quad: &[Point2<f32>; 4]) -> f32 {
    (0..4).map(|i| (quad[(i + 1) % 4] - quad[i]).norm()).sum()
}
