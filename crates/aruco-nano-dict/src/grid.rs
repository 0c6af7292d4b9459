//! Square binary cell grid sampled from a marker candidate.

/// `n × n` binary matrix, row-major. Cells are `0` (black) or `255` (white).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitGrid {
    n: usize,
    cells: Vec<u8>,
}

impl BitGrid {
    /// All-black grid.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![0; n * n],
        }
    }

    /// Binarize raw samples against their mean: `v >= mean` becomes white.
    ///
    /// Returns `None` if `samples.len()` is not a square of `n`.
    pub fn from_samples(n: usize, samples: &[u8]) -> Option<Self> {
        if n == 0 || samples.len() != n * n {
            return None;
        }
        let sum: u32 = samples.iter().map(|&v| v as u32).sum();
        let mean = sum as f32 / samples.len() as f32;
        let cells = samples
            .iter()
            .map(|&v| if v as f32 >= mean { 255 } else { 0 })
            .collect();
        Some(Self { n, cells })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.n + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.cells[row * self.n + col] = value;
    }

    /// `true` when every cell of the outer ring is black.
    pub fn has_black_border(&self) -> bool {
        let n = self.n;
        if n == 0 {
            return false;
        }
        (0..n).all(|i| {
            self.get(0, i) == 0
                && self.get(n - 1, i) == 0
                && self.get(i, 0) == 0
                && self.get(i, n - 1) == 0
        })
    }

    /// The grid without its outer ring.
    pub fn inner(&self) -> BitGrid {
        let m = self.n.saturating_sub(2);
        let mut out = BitGrid::new(m);
        for r in 0..m {
            for c in 0..m {
                out.set(r, c, self.get(r + 1, c + 1));
            }
        }
        out
    }

    /// Pack into a `u64`.
    ///
    /// Bit 0 is the bottom-right cell; the bit index grows right-to-left along
    /// a row and rows are visited bottom-to-top. Non-zero cells set their bit.
    /// Grids with more than 64 cells are truncated to the first 64 bits.
    pub fn inner_code(&self) -> u64 {
        let mut code = 0u64;
        let mut bit = 0u32;
        for r in (0..self.n).rev() {
            for c in (0..self.n).rev() {
                if bit < 64 && self.get(r, c) != 0 {
                    code |= 1u64 << bit;
                }
                bit += 1;
            }
        }
        code
    }

    /// One clockwise quarter turn: `new(r, c) = old(n - 1 - c, r)`.
    pub fn rotate(&self) -> BitGrid {
        let n = self.n;
        let mut out = BitGrid::new(n);
        for r in 0..n {
            for c in 0..n {
                out.set(r, c, self.get(n - 1 - c, r));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotate_code;

    fn grid_from_code(code: u64, n: usize) -> BitGrid {
        let mut g = BitGrid::new(n);
        let top = n * n - 1;
        for r in 0..n {
            for c in 0..n {
                if (code >> (top - (r * n + c))) & 1 == 1 {
                    g.set(r, c, 255);
                }
            }
        }
        g
    }

    #[test]
    fn mean_threshold_is_inclusive() {
        let g = BitGrid::from_samples(2, &[10, 20, 30, 40]).expect("square");
        // mean = 25
        assert_eq!(g.get(0, 0), 0);
        assert_eq!(g.get(0, 1), 0);
        assert_eq!(g.get(1, 0), 255);
        assert_eq!(g.get(1, 1), 255);

        let flat = BitGrid::from_samples(2, &[7; 4]).expect("square");
        assert!((0..2).all(|r| (0..2).all(|c| flat.get(r, c) == 255)));
        assert!(BitGrid::from_samples(3, &[0; 8]).is_none());
    }

    #[test]
    fn bit_order_starts_bottom_right() {
        let mut g = BitGrid::new(6);
        g.set(5, 5, 255);
        assert_eq!(g.inner_code(), 1);
        g.set(5, 4, 255);
        assert_eq!(g.inner_code(), 0b11);
        let mut g = BitGrid::new(6);
        g.set(4, 5, 255);
        assert_eq!(g.inner_code(), 1 << 6);
        let mut g = BitGrid::new(6);
        g.set(0, 0, 255);
        assert_eq!(g.inner_code(), 1 << 35);
    }

    #[test]
    fn border_check_and_inner_extraction() {
        let mut g = BitGrid::new(8);
        g.set(3, 4, 255);
        assert!(g.has_black_border());
        let inner = g.inner();
        assert_eq!(inner.size(), 6);
        assert_eq!(inner.get(2, 3), 255);

        g.set(7, 2, 255);
        assert!(!g.has_black_border());
    }

    #[test]
    fn grid_rotation_matches_code_rotation() {
        let code = 0xd2b63a09d_u64;
        let g = grid_from_code(code, 6);
        assert_eq!(g.inner_code(), code);
        let mut rotated = g.clone();
        for rot in 1..4u8 {
            rotated = rotated.rotate();
            assert_eq!(rotated.inner_code(), rotate_code(code, 6, rot));
        }
        assert_eq!(rotated.rotate(), g);
    }
}
