#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl GrayImageView<'_> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at `(x, y)`; the caller guarantees the coordinate is in bounds.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Image filled with a constant intensity.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Channel order of an interleaved 3-channel image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorOrder {
    #[default]
    Rgb,
    Bgr,
}

/// Interleaved 8-bit, 3-channel image.
#[derive(Clone, Copy, Debug)]
pub struct ColorImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub order: ColorOrder,
    pub data: &'a [u8], // row-major, len = w*h*3
}

/// Convert a color image into 8-bit luminance.
///
/// Uses the fixed-point BT.601 weights `0.299 R + 0.587 G + 0.114 B`
/// with 14 fractional bits and round-half-up.
pub fn luminance_from_color(src: &ColorImageView<'_>) -> GrayImage {
    const R_W: u32 = 4899;
    const G_W: u32 = 9617;
    const B_W: u32 = 1868;
    const SHIFT: u32 = 14;

    let n = src.width * src.height;
    let mut data = Vec::with_capacity(n);
    for px in src.data.chunks_exact(3).take(n) {
        let (r, g, b) = match src.order {
            ColorOrder::Rgb => (px[0], px[1], px[2]),
            ColorOrder::Bgr => (px[2], px[1], px[0]),
        };
        let y = (r as u32 * R_W + g as u32 * G_W + b as u32 * B_W + (1 << (SHIFT - 1))) >> SHIFT;
        data.push(y.min(255) as u8);
    }
    // Short buffers are padded with black instead of panicking.
    data.resize(n, 0);

    GrayImage {
        width: src.width,
        height: src.height,
        data,
    }
}

/// Bilinear sample with replicated borders.
///
/// Returns 0 for an empty image.
#[inline]
pub fn sample_bilinear_clamped(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    if src.is_empty() {
        return 0.0;
    }
    let max_x = (src.width - 1) as f32;
    let max_y = (src.height - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let (ix, iy) = (x.floor() as usize, y.floor() as usize);
    let (jx, jy) = ((ix + 1).min(src.width - 1), (iy + 1).min(src.height - 1));
    let (fx, fy) = (x - ix as f32, y - iy as f32);

    let top = src.at(ix, iy) as f32 * (1.0 - fx) + src.at(jx, iy) as f32 * fx;
    let bottom = src.at(ix, jy) as f32 * (1.0 - fx) + src.at(jx, jy) as f32 * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Bilinear sample that only reads fully interior 2×2 neighbourhoods.
///
/// Returns 0 when the coordinate is negative, not finite, or when
/// `x >= width - 1` / `y >= height - 1`, i.e. whenever the right or bottom
/// neighbour would fall outside the image.
#[inline]
pub fn sample_bilinear_interior(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    if !(x >= 0.0 && y >= 0.0) {
        return 0.0;
    }
    let x0 = x.floor();
    let y0 = y.floor();
    if x0 + 1.0 >= src.width as f32 || y0 + 1.0 >= src.height as f32 {
        return 0.0;
    }
    let (ix, iy) = (x0 as usize, y0 as usize);

    let p00 = src.at(ix, iy) as f32;
    let p10 = src.at(ix + 1, iy) as f32;
    let p01 = src.at(ix, iy + 1) as f32;
    let p11 = src.at(ix + 1, iy + 1) as f32;

    let top = (x0 + 1.0 - x) * p00 + (x - x0) * p10;
    let bottom = (x0 + 1.0 - x) * p01 + (x - x0) * p11;
    (y0 + 1.0 - y) * top + (y - y0) * bottom
}
