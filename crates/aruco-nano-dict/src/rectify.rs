//! Projective rectification of a candidate quad onto the unit square.

use crate::BitGrid;
use aruco_nano_core::{sample_bilinear_interior, square_to_quad, GrayImageView, Homography};
use nalgebra::Point2;

const UNIT_SQUARE: [Point2<f32>; 4] = [
    Point2::new(0.0, 0.0),
    Point2::new(1.0, 0.0),
    Point2::new(1.0, 1.0),
    Point2::new(0.0, 1.0),
];

/// Maps the unit square `(0,0),(1,0),(1,1),(0,1)` onto a quad (TL, TR, BR, BL) and back.
#[derive(Clone, Copy, Debug)]
pub struct Rectifier {
    forward: Homography,
    inverse: Homography,
}

impl Rectifier {
    /// Returns `None` for degenerate quads (three or more collinear corners).
    pub fn new(quad: &[Point2<f32>; 4]) -> Option<Self> {
        if has_collinear_corners(quad) {
            return None;
        }
        let forward = square_to_quad(quad)?;
        let inverse = forward.inverse()?;
        Some(Self { forward, inverse })
    }

    /// Unit-square point to image point.
    #[inline]
    pub fn map(&self, unit: Point2<f32>) -> Point2<f32> {
        self.forward.apply(unit)
    }

    /// Image point to unit-square point.
    #[inline]
    pub fn unmap(&self, image: Point2<f32>) -> Point2<f32> {
        self.inverse.apply(image)
    }

    /// Sample an `n × n` grid of cell centres and binarize it against the sample mean.
    ///
    /// Cell `(row, col)` is read at unit point `((col + 0.5) / n, (row + 0.5) / n)`.
    /// Points that fall outside the interior of the image read as 0.
    pub fn sample_grid(&self, img: &GrayImageView<'_>, n: usize) -> Option<BitGrid> {
        if n == 0 {
            return None;
        }
        let step = 1.0 / n as f32;
        let mut samples = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                let unit = Point2::new((col as f32 + 0.5) * step, (row as f32 + 0.5) * step);
                let p = self.map(unit);
                let v = sample_bilinear_interior(img, p.x, p.y);
                samples.push((v + 0.5).clamp(0.0, 255.0) as u8);
            }
        }
        BitGrid::from_samples(n, &samples)
    }
}

fn has_collinear_corners(quad: &[Point2<f32>; 4]) -> bool {
    (0..4).any(|i| {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let c = quad[(i + 3) % 4];
        let cross = (b - a).perp(&(c - a));
        !cross.is_finite() || cross.abs() < 1e-6
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aruco_nano_core::GrayImage;

    fn quad() -> [Point2<f32>; 4] {
        [
            Point2::new(20.0, 10.0),
            Point2::new(90.0, 18.0),
            Point2::new(84.0, 95.0),
            Point2::new(12.0, 80.0),
        ]
    }

    #[test]
    fn corners_map_to_quad_and_back() {
        let q = quad();
        let r = Rectifier::new(&q).expect("rectifier");
        for (u, p) in UNIT_SQUARE.iter().zip(q.iter()) {
            let m = r.map(*u);
            assert!((m - *p).norm() < 1e-3, "{m:?} vs {p:?}");
            let back = r.unmap(*p);
            assert!((back - *u).norm() < 1e-4, "{back:?} vs {u:?}");
        }
    }

    #[test]
    fn degenerate_quad_is_rejected() {
        let line = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(20.0, 0.0),
            Point2::new(30.0, 0.0),
        ];
        assert!(Rectifier::new(&line).is_none());
    }

    #[test]
    fn samples_checkerboard_cells() {
        // 8×8 checkerboard of 10 px cells, axis aligned at the origin.
        let (w, h) = (100, 100);
        let mut img = GrayImage::new(w, h);
        for y in 0..80 {
            for x in 0..80 {
                if (x / 10 + y / 10) % 2 == 1 {
                    img.data[y * w + x] = 200;
                }
            }
        }
        let q = [
            Point2::new(0.0, 0.0),
            Point2::new(80.0, 0.0),
            Point2::new(80.0, 80.0),
            Point2::new(0.0, 80.0),
        ];
        let grid = Rectifier::new(&q)
            .expect("rectifier")
            .sample_grid(&img.view(), 8)
            .expect("grid");
        for r in 0..8 {
            for c in 0..8 {
                let expected = if (r + c) % 2 == 1 { 255 } else { 0 };
                assert_eq!(grid.get(r, c), expected, "cell ({r}, {c})");
            }
        }
    }
}
