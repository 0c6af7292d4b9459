//! Square marker dictionaries and grid decoding.
//!
//! This crate focuses on:
//! - the embedded `ARUCO_MIP_36h12` dictionary (compiled into the binary),
//! - exact code lookup through a lazily built hash index,
//! - sampling a candidate quad into a binary cell grid,
//! - rotation-invariant decoding of that grid.
//!
//! It does **not** find candidate quads; see `aruco-nano-detector`.

pub mod builtins;
mod decode;
mod dictionary;
mod grid;
mod rectify;

pub use decode::{decode_grid, decode_quad, rotate_corners, Decoded};
pub use dictionary::{rotate_code, Dictionary};
pub use grid::BitGrid;
pub use rectify::Rectifier;
