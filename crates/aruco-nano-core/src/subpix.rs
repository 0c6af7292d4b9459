//! Iterative sub-pixel corner refinement.
//!
//! Each corner `q` is moved to the point that minimises
//! `sum_i w_i * (g_i · (p_i - q))^2` over a square window, where `g_i` is the
//! image gradient at window pixel `p_i`. At a true corner every gradient is
//! orthogonal to `p_i - q`, so the normal equations
//! `(sum w g gᵀ) q = sum w g gᵀ p` give the update. The window is re-centred on
//! the new estimate until the step is small or the iteration budget runs out.

use crate::{sample_bilinear_clamped, GrayImageView};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Window and termination settings for [`refine_corners_subpix`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubpixParams {
    /// Half side of the search window; the window is `2 * half_window + 1` pixels wide.
    pub half_window: usize,
    /// Maximum number of re-centring iterations per corner.
    pub max_iters: usize,
    /// Stop once a step is shorter than this (pixels).
    pub epsilon: f32,
}

impl Default for SubpixParams {
    fn default() -> Self {
        Self {
            half_window: 4,
            max_iters: 12,
            epsilon: 0.005,
        }
    }
}

/// Refine `corners` in place against the gradients of `img`.
///
/// Corners that drift further than the half window from their starting
/// position are restored to it.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(img, corners), fields(corners = corners.len()))
)]
pub fn refine_corners_subpix(
    img: &GrayImageView<'_>,
    corners: &mut [Point2<f32>],
    params: &SubpixParams,
) {
    if img.is_empty() || params.half_window == 0 {
        return;
    }

    let win = params.half_window as i32;
    let side = (2 * win + 1) as usize;
    let mask = gaussian_window(win);
    let eps2 = (params.epsilon as f64) * (params.epsilon as f64);
    let max_iters = params.max_iters.max(1);

    // (2 win + 3)^2 patch: the window plus a one pixel ring for central differences.
    let patch_side = side + 2;
    let mut patch = vec![0f32; patch_side * patch_side];

    for corner in corners.iter_mut() {
        let start = *corner;
        let mut cur = start;

        for _ in 0..max_iters {
            fill_patch(img, cur, win + 1, patch_side, &mut patch);

            let (mut a, mut b, mut c, mut bb1, mut bb2) = (0f64, 0f64, 0f64, 0f64, 0f64);
            for i in 0..side {
                let py = i as f64 - win as f64;
                for j in 0..side {
                    let m = mask[i * side + j];
                    let pi = (i + 1) * patch_side + (j + 1);
                    let gx = (patch[pi + 1] - patch[pi - 1]) as f64;
                    let gy = (patch[pi + patch_side] - patch[pi - patch_side]) as f64;
                    let gxx = gx * gx * m;
                    let gxy = gx * gy * m;
                    let gyy = gy * gy * m;
                    let px = j as f64 - win as f64;
                    a += gxx;
                    b += gxy;
                    c += gyy;
                    bb1 += gxx * px + gxy * py;
                    bb2 += gxy * px + gyy * py;
                }
            }

            let det = a * c - b * b;
            if det.abs() <= f64::EPSILON * f64::EPSILON {
                break;
            }
            let scale = 1.0 / det;
            let next = Point2::new(
                (cur.x as f64 + c * scale * bb1 - b * scale * bb2) as f32,
                (cur.y as f64 - b * scale * bb1 + a * scale * bb2) as f32,
            );
            let dx = (next.x - cur.x) as f64;
            let dy = (next.y - cur.y) as f64;
            cur = next;

            let inside = cur.x >= 0.0
                && cur.y >= 0.0
                && cur.x < img.width as f32
                && cur.y < img.height as f32;
            if !inside || dx * dx + dy * dy <= eps2 {
                break;
            }
        }

        let drifted = (cur.x - start.x).abs() > win as f32 || (cur.y - start.y).abs() > win as f32;
        *corner = if drifted || !cur.x.is_finite() || !cur.y.is_finite() {
            start
        } else {
            cur
        };
    }
}

/// Separable Gaussian weights `exp(-(dx/win)^2 - (dy/win)^2)`, row-major.
fn gaussian_window(win: i32) -> Vec<f64> {
    let side = (2 * win + 1) as usize;
    let axis: Vec<f64> = (-win..=win)
        .map(|d| {
            let t = d as f64 / win as f64;
            (-t * t).exp()
        })
        .collect();
    let mut mask = Vec::with_capacity(side * side);
    for wy in &axis {
        for wx in &axis {
            mask.push(wy * wx);
        }
    }
    mask
}

/// Bilinear patch centred on `center`: `patch[i][j] = I(center + (j - half, i - half))`.
fn fill_patch(
    img: &GrayImageView<'_>,
    center: Point2<f32>,
    half: i32,
    patch_side: usize,
    patch: &mut [f32],
) {
    for i in 0..patch_side {
        let y = center.y + (i as i32 - half) as f32;
        for j in 0..patch_side {
            let x = center.x + (j as i32 - half) as f32;
            patch[i * patch_side + j] = sample_bilinear_clamped(img, x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GrayImage;

    /// Dark square on white whose top-left corner sits at pixel boundary (30, 20).
    fn corner_image() -> GrayImage {
        let (w, h) = (64, 48);
        let mut img = GrayImage::filled(w, h, 230);
        for y in 20..h {
            for x in 30..w {
                img.data[y * w + x] = 20;
            }
        }
        img
    }

    #[test]
    fn converges_to_step_corner() {
        let img = corner_image();
        let mut corners = [Point2::new(31.6_f32, 21.4)];
        refine_corners_subpix(&img.view(), &mut corners, &SubpixParams::default());

        // Pixel centres are integer, so the intensity step lies half way between 29 and 30.
        let c = corners[0];
        assert!((c.x - 29.5).abs() < 0.35, "x = {}", c.x);
        assert!((c.y - 19.5).abs() < 0.35, "y = {}", c.y);
    }

    #[test]
    fn flat_region_leaves_corner_untouched() {
        let img = GrayImage::filled(32, 32, 128);
        let mut corners = [Point2::new(10.25_f32, 12.75)];
        refine_corners_subpix(&img.view(), &mut corners, &SubpixParams::default());
        assert_eq!(corners[0], Point2::new(10.25, 12.75));
    }

    #[test]
    fn batch_order_is_preserved() {
        let img = corner_image();
        let mut corners = [Point2::new(31.0_f32, 21.0), Point2::new(5.0, 5.0)];
        refine_corners_subpix(&img.view(), &mut corners, &SubpixParams::default());
        assert!((corners[0].x - 29.5).abs() < 0.5);
        assert_eq!(corners[1], Point2::new(5.0, 5.0));
    }
}
