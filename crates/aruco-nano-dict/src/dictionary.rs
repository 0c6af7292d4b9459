//! Dictionary metadata and packed marker codes.

use std::collections::HashMap;
use std::sync::OnceLock;

/// A fixed square-marker dictionary.
#[derive(Debug)]
pub struct Dictionary {
    /// Human-readable name (for debugging/logging).
    pub name: &'static str,
    /// Marker side length (number of inner bits per side).
    pub marker_size: usize,
    /// One `u64` per marker id, encoding the inner `marker_size × marker_size` bits.
    pub codes: &'static [u64],
    index: OnceLock<HashMap<u64, u32>>,
}

impl Dictionary {
    pub const fn new(name: &'static str, marker_size: usize, codes: &'static [u64]) -> Self {
        Self {
            name,
            marker_size,
            codes,
            index: OnceLock::new(),
        }
    }

    /// Number of marker ids.
    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Packed code of marker `id`.
    pub fn code(&self, id: u32) -> Option<u64> {
        self.codes.get(id as usize).copied()
    }

    /// Exact lookup of an observed code.
    ///
    /// If the table contained the same code twice, the lower id is returned.
    pub fn find(&self, code: u64) -> Option<u32> {
        self.index().get(&code).copied()
    }

    fn index(&self) -> &HashMap<u64, u32> {
        self.index.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.codes.len());
            for (id, &code) in self.codes.iter().enumerate() {
                map.entry(code).or_insert(id as u32);
            }
            log::debug!("built code index for {} ({} ids)", self.name, map.len());
            map
        })
    }
}

/// Rotate a packed `n × n` code by `rot` quarter turns, matching [`crate::BitGrid::rotate`].
///
/// Codes use the protocol layout where cell `(r, c)` lives at bit
/// `n*n - 1 - (r*n + c)`.
pub fn rotate_code(code: u64, n: usize, rot: u8) -> u64 {
    let rot = rot & 3;
    if rot == 0 {
        return code;
    }

    let top = n * n - 1;
    let get = |r: usize, c: usize| (code >> (top - (r * n + c))) & 1;

    let mut out = 0u64;
    for r in 0..n {
        for c in 0..n {
            let (sr, sc) = match rot {
                1 => (n - 1 - c, r),
                2 => (n - 1 - r, n - 1 - c),
                _ => (c, n - 1 - r),
            };
            out |= get(sr, sc) << (top - (r * n + c));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    static DUPES: Dictionary = Dictionary::new("dupes", 2, &[0b1010, 0b0110, 0b1010]);

    #[test]
    fn first_id_wins_on_duplicate_codes() {
        assert_eq!(DUPES.find(0b1010), Some(0));
        assert_eq!(DUPES.find(0b0110), Some(1));
        assert_eq!(DUPES.find(0b1111), None);
    }

    #[test]
    fn rotate_four_times_is_identity() {
        let code = 0x9_1234_5678_u64;
        let mut r = code;
        for _ in 0..4 {
            r = rotate_code(r, 6, 1);
        }
        assert_eq!(r, code);
        assert_eq!(rotate_code(rotate_code(code, 6, 1), 6, 3), code);
        assert_eq!(rotate_code(rotate_code(code, 6, 1), 6, 1), rotate_code(code, 6, 2));
    }

    #[test]
    fn single_bit_moves_clockwise() {
        // Cell (0, 0) of a 2×2 code is bit 3; a quarter turn brings it to (0, 1), bit 2.
        assert_eq!(rotate_code(0b1000, 2, 1), 0b0100);
    }
}
