//! Camera intrinsics and radial-tangential distortion model.
//!
//! Only the pieces needed for marker pose estimation live here: conversion
//! between pixels and normalized pinhole coordinates, forward distortion, and
//! the iterative inverse.

use nalgebra::{Matrix3, Point2};
use serde::{Deserialize, Serialize};

/// Pinhole camera intrinsics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraIntrinsics {
    /// Focal length in x (pixels).
    pub fx: f64,
    /// Focal length in y (pixels).
    pub fy: f64,
    /// Principal point x (pixels).
    pub cx: f64,
    /// Principal point y (pixels).
    pub cy: f64,
}

impl CameraIntrinsics {
    /// Returns `true` when all entries are finite and the focal lengths are non-zero.
    pub fn is_valid(self) -> bool {
        self.fx.is_finite()
            && self.fy.is_finite()
            && self.cx.is_finite()
            && self.cy.is_finite()
            && self.fx.abs() > 1e-12
            && self.fy.abs() > 1e-12
    }

    /// Convert pixel coordinates to normalized pinhole coordinates.
    pub fn pixel_to_normalized(self, pixel: Point2<f64>) -> Option<Point2<f64>> {
        if !self.is_valid() {
            return None;
        }
        let x = (pixel.x - self.cx) / self.fx;
        let y = (pixel.y - self.cy) / self.fy;
        (x.is_finite() && y.is_finite()).then(|| Point2::new(x, y))
    }

    /// Convert normalized pinhole coordinates to pixel coordinates.
    pub fn normalized_to_pixel(self, normalized: Point2<f64>) -> Point2<f64> {
        Point2::new(
            self.fx * normalized.x + self.cx,
            self.fy * normalized.y + self.cy,
        )
    }

    /// The `K` matrix (skew ignored).
    pub fn matrix(self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }
}

/// Brown-Conrady radial-tangential distortion coefficients.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RadialTangentialDistortion {
    /// Radial coefficient k1.
    pub k1: f64,
    /// Radial coefficient k2.
    pub k2: f64,
    /// Tangential coefficient p1.
    pub p1: f64,
    /// Tangential coefficient p2.
    pub p2: f64,
    /// Radial coefficient k3.
    pub k3: f64,
}

impl RadialTangentialDistortion {
    /// Build from an OpenCV style `[k1, k2, p1, p2, k3, ...]` slice.
    ///
    /// Missing trailing coefficients are zero; coefficients past `k3` are ignored.
    pub fn from_slice(coeffs: &[f64]) -> Self {
        let at = |i: usize| coeffs.get(i).copied().unwrap_or(0.0);
        Self {
            k1: at(0),
            k2: at(1),
            p1: at(2),
            p2: at(3),
            k3: at(4),
        }
    }

    pub fn is_zero(self) -> bool {
        self == Self::default()
    }

    /// Apply distortion to normalized coordinates.
    pub fn distort_normalized(self, p: Point2<f64>) -> Point2<f64> {
        let (x, y) = (p.x, p.y);
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;
        let radial = 1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6;
        let x_tan = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let y_tan = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
        Point2::new(x * radial + x_tan, y * radial + y_tan)
    }
}

/// Distortion inversion settings used by iterative undistortion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UndistortConfig {
    /// Maximum fixed-point iterations.
    pub max_iters: usize,
    /// Stop when coordinate update norm is below this threshold.
    pub eps: f64,
}

impl Default for UndistortConfig {
    fn default() -> Self {
        Self {
            max_iters: 20,
            eps: 1e-12,
        }
    }
}

/// Complete camera model (intrinsics + radial-tangential distortion).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraModel {
    pub intrinsics: CameraIntrinsics,
    #[serde(default)]
    pub distortion: RadialTangentialDistortion,
}

impl CameraModel {
    /// Pinhole camera without distortion.
    pub fn pinhole(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self {
            intrinsics: CameraIntrinsics { fx, fy, cx, cy },
            distortion: RadialTangentialDistortion::default(),
        }
    }

    /// Build from an OpenCV camera matrix and distortion vector.
    pub fn from_opencv(camera_matrix: &Matrix3<f64>, dist_coeffs: &[f64]) -> Self {
        Self {
            intrinsics: CameraIntrinsics {
                fx: camera_matrix[(0, 0)],
                fy: camera_matrix[(1, 1)],
                cx: camera_matrix[(0, 2)],
                cy: camera_matrix[(1, 2)],
            },
            distortion: RadialTangentialDistortion::from_slice(dist_coeffs),
        }
    }

    /// Project a normalized point through distortion and intrinsics.
    pub fn project_normalized(self, normalized: Point2<f64>) -> Point2<f64> {
        let d = self.distortion.distort_normalized(normalized);
        self.intrinsics.normalized_to_pixel(d)
    }

    /// Undistorted normalized coordinates of an image pixel.
    pub fn undistort_to_normalized(self, pixel: Point2<f64>) -> Option<Point2<f64>> {
        self.undistort_to_normalized_with(pixel, UndistortConfig::default())
    }

    /// Like [`Self::undistort_to_normalized`] with custom iteration settings.
    pub fn undistort_to_normalized_with(
        self,
        pixel: Point2<f64>,
        cfg: UndistortConfig,
    ) -> Option<Point2<f64>> {
        let xd = self.intrinsics.pixel_to_normalized(pixel)?;
        if self.distortion.is_zero() {
            return Some(xd);
        }
        let dist = self.distortion;
        let (mut x, mut y) = (xd.x, xd.y);

        for _ in 0..cfg.max_iters.max(1) {
            let r2 = x * x + y * y;
            let r4 = r2 * r2;
            let r6 = r4 * r2;
            let radial = 1.0 + dist.k1 * r2 + dist.k2 * r4 + dist.k3 * r6;
            if !radial.is_finite() || radial.abs() < 1e-12 {
                return None;
            }

            let dx_tan = 2.0 * dist.p1 * x * y + dist.p2 * (r2 + 2.0 * x * x);
            let dy_tan = dist.p1 * (r2 + 2.0 * y * y) + 2.0 * dist.p2 * x * y;
            let x_next = (xd.x - dx_tan) / radial;
            let y_next = (xd.y - dy_tan) / radial;

            if !x_next.is_finite() || !y_next.is_finite() {
                return None;
            }

            let dx = x_next - x;
            let dy = y_next - y;
            x = x_next;
            y = y_next;

            if (dx * dx + dy * dy).sqrt() <= cfg.eps.max(0.0) {
                break;
            }
        }

        Some(Point2::new(x, y))
    }
}
