//! Rotation-invariant decoding of sampled marker grids.

use crate::{BitGrid, Dictionary, Rectifier};
use aruco_nano_core::GrayImageView;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A successful dictionary hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// Marker id in the dictionary.
    pub id: u32,
    /// Clockwise quarter turns applied to the observed grid before it matched.
    pub rotation: u8,
}

/// Decode a full grid (border included).
///
/// The border must be entirely black. The inner grid is then tried as
/// sampled and after one, two and three clockwise quarter turns; the first
/// code found in `dict` wins.
pub fn decode_grid(grid: &BitGrid, dict: &Dictionary) -> Option<Decoded> {
    if grid.size() != dict.marker_size + 2 || !grid.has_black_border() {
        return None;
    }
    let mut inner = grid.inner();
    for rotation in 0..4u8 {
        if let Some(id) = dict.find(inner.inner_code()) {
            return Some(Decoded { id, rotation });
        }
        inner = inner.rotate();
    }
    None
}

/// Sample `quad` (TL, TR, BR, BL in image order) and decode it.
#[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all))]
pub fn decode_quad(
    img: &GrayImageView<'_>,
    quad: &[Point2<f32>; 4],
    dict: &Dictionary,
) -> Option<Decoded> {
    let rectifier = Rectifier::new(quad)?;
    let grid = rectifier.sample_grid(img, dict.marker_size + 2)?;
    decode_grid(&grid, dict)
}

/// Reorder `corners` so index 0 is the marker's canonical top-left.
///
/// `new[i] = old[(i + 4 - rotation) % 4]`.
pub fn rotate_corners<T: Copy>(corners: &[T; 4], rotation: u8) -> [T; 4] {
    let rot = (rotation & 3) as usize;
    std::array::from_fn(|i| corners[(i + 4 - rot) % 4])
}
