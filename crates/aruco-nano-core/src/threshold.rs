//! Adaptive local thresholding.

use crate::{GrayImage, GrayImageView};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Parameters of the adaptive mean threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveThresholdParams {
    /// Side of the square averaging window. Forced odd and at least 3.
    pub block_size: usize,
    /// Offset subtracted from the local mean.
    pub offset: f32,
}

impl Default for AdaptiveThresholdParams {
    fn default() -> Self {
        Self {
            block_size: 7,
            offset: 7.0,
        }
    }
}

/// Inverse-binary adaptive mean threshold.
///
/// A pixel becomes foreground (255) when it is at least `offset` darker than
/// the rounded mean of its `block_size × block_size` neighbourhood (borders
/// replicated); everything else is 0. Dark ink on a bright background thus
/// ends up nonzero.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src), fields(w = src.width, h = src.height))
)]
pub fn adaptive_threshold_mean_inv(
    src: &GrayImageView<'_>,
    params: &AdaptiveThresholdParams,
) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let mut out = GrayImage::new(w, h);
    if src.is_empty() {
        return out;
    }

    let block = params.block_size.max(3) | 1;
    let r = (block / 2) as isize;
    let area = (block * block) as u32;
    let delta = params.offset.floor() as i32;

    // Horizontal box sums with replicated borders.
    let mut row_sums = vec![0u32; w * h];
    for y in 0..h {
        let row = &src.data[y * w..(y + 1) * w];
        let at = |x: isize| row[x.clamp(0, w as isize - 1) as usize] as u32;
        let mut acc: u32 = (-r..=r).map(at).sum();
        for x in 0..w {
            row_sums[y * w + x] = acc;
            let xi = x as isize;
            acc = acc + at(xi + r + 1) - at(xi - r);
        }
    }

    // Vertical pass over the row sums, then compare.
    for x in 0..w {
        let at = |y: isize| row_sums[y.clamp(0, h as isize - 1) as usize * w + x];
        let mut acc: u32 = (-r..=r).map(at).sum();
        for y in 0..h {
            let mean = ((acc + area / 2) / area) as i32;
            let v = src.data[y * w + x] as i32;
            if v - mean <= -delta {
                out.data[y * w + x] = 255;
            }
            let yi = y as isize;
            acc = acc + at(yi + r + 1) - at(yi - r);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_image_has_no_foreground() {
        let img = GrayImage::filled(20, 15, 90);
        let bin = adaptive_threshold_mean_inv(&img.view(), &AdaptiveThresholdParams::default());
        assert!(bin.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn dark_pixels_next_to_bright_edge_become_foreground() {
        // Left half black, right half white.
        let (w, h) = (20, 10);
        let mut img = GrayImage::filled(w, h, 255);
        for y in 0..h {
            for x in 0..10 {
                img.data[y * w + x] = 0;
            }
        }
        let bin = adaptive_threshold_mean_inv(&img.view(), &AdaptiveThresholdParams::default());
        let row = &bin.data[5 * w..6 * w];
        // Dark side within the window radius of the edge is ink.
        assert_eq!(&row[7..10], &[255, 255, 255]);
        // Far inside the dark region the local mean equals the pixel value.
        assert_eq!(row[2], 0);
        // The bright side is never foreground.
        assert!(row[10..].iter().all(|&v| v == 0));
    }

    #[test]
    fn empty_image_is_passed_through() {
        let img = GrayImage::new(0, 0);
        let bin = adaptive_threshold_mean_inv(&img.view(), &AdaptiveThresholdParams::default());
        assert!(bin.data.is_empty());
    }
}
