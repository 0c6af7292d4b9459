//! Planar square pose via IPPE (infinitesimal plane-based pose estimation).
//!
//! The marker lies in its own `z = 0` plane with corners at
//! `(-s/2, s/2)`, `(s/2, s/2)`, `(s/2, -s/2)`, `(-s/2, -s/2)`. The homography
//! from that plane to undistorted normalized image coordinates is linearised
//! at the marker centre; its Jacobian admits exactly two rotations, each gets a
//! least-squares translation and the one with the lower reprojection error wins.

use crate::Marker;
use aruco_nano_core::{homography_from_4pt_f64, CameraModel};
use nalgebra::{Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

/// Errors returned by [`Marker::estimate_pose`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    #[error("marker size must be positive and finite, got {0}")]
    InvalidMarkerSize(f64),
    #[error("camera intrinsics are not usable")]
    InvalidIntrinsics,
    #[error("corner {0} could not be undistorted")]
    Undistortion(usize),
    #[error("degenerate corner geometry")]
    DegenerateHomography,
    #[error("rotation recovery failed")]
    DegenerateRotation,
    #[error("translation is not observable")]
    DegenerateTranslation,
}

/// Marker pose in the camera frame: `X_cam = R * X_marker + t`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerPose {
    /// Rotation vector (axis * angle, radians).
    pub rvec: Vector3<f64>,
    /// Translation, in the unit of the marker size.
    pub tvec: Vector3<f64>,
    /// Rotation matrix of `rvec`.
    pub rotation: Matrix3<f64>,
    /// RMS corner reprojection error (pixels) of the chosen solution.
    pub reproj_rms: f64,
}

/// Marker-frame corner coordinates for side length `size`.
pub fn marker_object_points(size: f64) -> [Vector3<f64>; 4] {
    let h = 0.5 * size;
    [
        Vector3::new(-h, h, 0.0),
        Vector3::new(h, h, 0.0),
        Vector3::new(h, -h, 0.0),
        Vector3::new(-h, -h, 0.0),
    ]
}

impl Marker {
    /// Pose of a marker of side `marker_size`.
    pub fn estimate_pose(
        &self,
        camera: &CameraModel,
        marker_size: f64,
    ) -> Result<MarkerPose, PoseError> {
        let pixels = self
            .corners
            .map(|p| Point2::new(p.x as f64, p.y as f64));
        estimate_square_pose(camera, &pixels, marker_size)
    }

    /// Pose of a unit-size marker.
    pub fn estimate_pose_default(&self, camera: &CameraModel) -> Result<MarkerPose, PoseError> {
        self.estimate_pose(camera, 1.0)
    }
}

/// IPPE for four pixel corners ordered like [`marker_object_points`].
pub fn estimate_square_pose(
    camera: &CameraModel,
    pixels: &[Point2<f64>; 4],
    marker_size: f64,
) -> Result<MarkerPose, PoseError> {
    if !(marker_size.is_finite() && marker_size > 0.0) {
        return Err(PoseError::InvalidMarkerSize(marker_size));
    }
    if !camera.intrinsics.is_valid() {
        return Err(PoseError::InvalidIntrinsics);
    }

    let mut normalized = [Point2::origin(); 4];
    for (i, px) in pixels.iter().enumerate() {
        normalized[i] = camera
            .undistort_to_normalized(*px)
            .ok_or(PoseError::Undistortion(i))?;
    }

    let object = marker_object_points(marker_size);
    let object_xy = object.map(|p| Point2::new(p.x, p.y));
    let h = homography_from_4pt_f64(&object_xy, &normalized)
        .ok_or(PoseError::DegenerateHomography)?
        .h;

    // Jacobian of the homography at the plane origin (H normalised to h22 = 1).
    let (p, q) = (h[(0, 2)], h[(1, 2)]);
    let j = [
        [h[(0, 0)] - h[(2, 0)] * p, h[(0, 1)] - h[(2, 1)] * p],
        [h[(1, 0)] - h[(2, 0)] * q, h[(1, 1)] - h[(2, 1)] * q],
    ];

    let [r1, r2] = ippe_rotations(j, p, q).ok_or(PoseError::DegenerateRotation)?;

    let mut best: Option<(Matrix3<f64>, Vector3<f64>, f64)> = None;
    for r in [r1, r2] {
        let Some(t) = least_squares_translation(&r, &object, &normalized) else {
            continue;
        };
        let rms = reprojection_rms(camera, &r, &t, &object, pixels);
        if best.as_ref().map_or(true, |(_, _, e)| rms < *e) {
            best = Some((r, t, rms));
        }
    }
    let (r, t, rms) = best.ok_or(PoseError::DegenerateTranslation)?;

    Ok(MarkerPose {
        rvec: rotation_vector(&r),
        tvec: t,
        rotation: r,
        reproj_rms: rms,
    })
}

/// Axis-angle vector of a rotation matrix, including the half-turn case.
pub fn rotation_vector(r: &Matrix3<f64>) -> Vector3<f64> {
    let skew = Vector3::new(
        r[(2, 1)] - r[(1, 2)],
        r[(0, 2)] - r[(2, 0)],
        r[(1, 0)] - r[(0, 1)],
    );
    let s = 0.5 * skew.norm();
    let c = (0.5 * (r.trace() - 1.0)).clamp(-1.0, 1.0);
    if s > 1e-5 {
        return skew * (s.atan2(c) / (2.0 * s));
    }
    if c > 0.0 {
        return Vector3::zeros();
    }

    // Half turn: R = 2 a aᵀ - I.
    let d = Vector3::new(
        (0.5 * (r[(0, 0)] + 1.0)).max(0.0).sqrt(),
        (0.5 * (r[(1, 1)] + 1.0)).max(0.0).sqrt(),
        (0.5 * (r[(2, 2)] + 1.0)).max(0.0).sqrt(),
    );
    let mut axis = d;
    match d.imax() {
        0 => {
            axis.y = d.y.copysign(r[(0, 1)]);
            axis.z = d.z.copysign(r[(0, 2)]);
        }
        1 => {
            axis.x = d.x.copysign(r[(0, 1)]);
            axis.z = d.z.copysign(r[(1, 2)]);
        }
        _ => {
            axis.x = d.x.copysign(r[(0, 2)]);
            axis.y = d.y.copysign(r[(1, 2)]);
        }
    }
    axis * std::f64::consts::PI
}

/// Rotation taking `(x, y, z)` (normalised) onto the optical axis.
fn rotate_to_z_axis(x: f64, y: f64, z: f64) -> Matrix3<f64> {
    let n = (x * x + y * y + z * z).sqrt();
    let (ax, ay, az) = (x / n, y / n, z / n);
    if (1.0 + az).abs() < f32::EPSILON as f64 {
        return Matrix3::new(
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, -1.0,
        );
    }
    let d = 1.0 / (1.0 + az);
    Matrix3::new(
        1.0 - ax * ax * d,
        -ax * ay * d,
        -ax,
        -ax * ay * d,
        1.0 - ay * ay * d,
        -ay,
        ax,
        ay,
        1.0 - (ax * ax + ay * ay) * d,
    )
}

/// The two rotations consistent with Jacobian `j` at normalized image point `(p, q)`.
fn ippe_rotations(j: [[f64; 2]; 2], p: f64, q: f64) -> Option<[Matrix3<f64>; 2]> {
    let rv = rotate_to_z_axis(p, q, 1.0).transpose();

    let b00 = rv[(0, 0)] - p * rv[(2, 0)];
    let b01 = rv[(0, 1)] - p * rv[(2, 1)];
    let b10 = rv[(1, 0)] - q * rv[(2, 0)];
    let b11 = rv[(1, 1)] - q * rv[(2, 1)];
    let det = b00 * b11 - b01 * b10;
    if !det.is_finite() || det.abs() < 1e-12 {
        return None;
    }
    let inv = 1.0 / det;
    let (bi00, bi01, bi10, bi11) = (inv * b11, -inv * b01, -inv * b10, inv * b00);

    let a00 = bi00 * j[0][0] + bi01 * j[1][0];
    let a01 = bi00 * j[0][1] + bi01 * j[1][1];
    let a10 = bi10 * j[0][0] + bi11 * j[1][0];
    let a11 = bi10 * j[0][1] + bi11 * j[1][1];

    // Largest singular value of A.
    let ata00 = a00 * a00 + a01 * a01;
    let ata01 = a00 * a10 + a01 * a11;
    let ata11 = a10 * a10 + a11 * a11;
    let gamma2 = 0.5
        * (ata00 + ata11 + ((ata00 - ata11) * (ata00 - ata11) + 4.0 * ata01 * ata01).sqrt());
    if !gamma2.is_finite() || gamma2 < 1e-12 {
        return None;
    }
    let gamma = gamma2.sqrt();

    let (r00, r01, r10, r11) = (a00 / gamma, a01 / gamma, a10 / gamma, a11 / gamma);
    let b0 = (1.0 - r00 * r00 - r10 * r10).max(0.0).sqrt();
    let mut b1 = (1.0 - r01 * r01 - r11 * r11).max(0.0).sqrt();
    if -r00 * r01 - r10 * r11 < 0.0 {
        b1 = -b1;
    }
    let det2 = r00 * r11 - r01 * r10;

    let m1 = Matrix3::new(
        r00,
        r01,
        b1 * r10 - b0 * r11,
        r10,
        r11,
        b0 * r01 - b1 * r00,
        b0,
        b1,
        det2,
    );
    let m2 = Matrix3::new(
        r00,
        r01,
        b0 * r11 - b1 * r10,
        r10,
        r11,
        b1 * r00 - b0 * r01,
        -b0,
        -b1,
        det2,
    );
    Some([rv * m1, rv * m2])
}

/// Solve `u * (R X + t).z = (R X + t).x` (and the `v` analogue) for `t`.
fn least_squares_translation(
    r: &Matrix3<f64>,
    object: &[Vector3<f64>; 4],
    normalized: &[Point2<f64>; 4],
) -> Option<Vector3<f64>> {
    let mut ata = Matrix3::<f64>::zeros();
    let mut atb = Vector3::<f64>::zeros();
    for (x, uv) in object.iter().zip(normalized) {
        let rx = r * x;
        for (row, rhs) in [
            (Vector3::new(1.0, 0.0, -uv.x), uv.x * rx.z - rx.x),
            (Vector3::new(0.0, 1.0, -uv.y), uv.y * rx.z - rx.y),
        ] {
            ata += row * row.transpose();
            atb += row * rhs;
        }
    }
    let t = ata.try_inverse()? * atb;
    t.iter().all(|v| v.is_finite()).then_some(t)
}

fn reprojection_rms(
    camera: &CameraModel,
    r: &Matrix3<f64>,
    t: &Vector3<f64>,
    object: &[Vector3<f64>; 4],
    pixels: &[Point2<f64>; 4],
) -> f64 {
    let mut sum = 0.0;
    for (x, px) in object.iter().zip(pixels) {
        let c = r * x + t;
        if c.z <= 0.0 {
            return f64::INFINITY;
        }
        let proj = camera.project_normalized(Point2::new(c.x / c.z, c.y / c.z));
        sum += (proj - px).norm_squared();
    }
    (sum / 4.0).sqrt()
}
