//! Per-invocation projection parameters.

use serde::{Deserialize, Serialize};

use crate::core::math::{cos_approx, sin_approx};
use crate::core::{Mat3f, Vec3f};

/// View (camera) to vehicle transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// View origin in vehicle coordinates (mm)
    pub position_mm: Vec3f,
    /// View to vehicle rotation
    pub rotation: Mat3f,
}

impl ViewTransform {
    /// Create a transform.
    pub fn new(position_mm: Vec3f, rotation: Mat3f) -> Self {
        Self {
            position_mm,
            rotation,
        }
    }

    /// Rotate and translate a view-space point into the vehicle frame.
    ///
    /// Also returns the positional uncertainty induced by an angular error
    /// of `odometry_uncertainty_rad` on every rotation coefficient,
    /// `e * (|x| + |y| + |z|)` of the view-space point. Roll about the
    /// baseline is not modelled.
    #[inline]
    pub fn apply(&self, p: Vec3f, odometry_uncertainty_rad: f32) -> (Vec3f, f32) {
        let r = self.rotation.mul_vec(p);
        let uncertainty_mm = odometry_uncertainty_rad * p.l1_norm();
        let t = self.position_mm;
        (Vec3f::new(r.x + t.x, r.y + t.y, r.z + t.z), uncertainty_mm)
    }
}

/// Cone scale factors for the conical camera model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConeGeometry {
    /// Scale for the coordinate along the cone axis
    pub scale_n: f32,
    /// Scale for the radius
    pub scale_r: f32,
}

impl ConeGeometry {
    /// Create from precomputed scales.
    pub fn new(scale_n: f32, scale_r: f32) -> Self {
        Self { scale_n, scale_r }
    }

    /// Derive the scales from the cone half-aperture angle.
    ///
    /// `pixel_scale` converts the unit-height cone coordinates into the
    /// pixel units used for `n_px`.
    pub fn from_aperture(half_angle_rad: f32, pixel_scale: f32) -> Self {
        Self {
            scale_n: cos_approx(half_angle_rad) * pixel_scale,
            scale_r: sin_approx(half_angle_rad) * pixel_scale,
        }
    }
}

/// Parameters shared by every cell of one invocation.
///
/// Cell position, size and start azimuth are not part of this struct; they
/// come with each [`CellWindow`](crate::driver::CellWindow).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellProjectionParams {
    /// LUT downsampling in X (right shift)
    pub lut_shift_x: u32,
    /// LUT downsampling in Y (right shift)
    pub lut_shift_y: u32,
    /// LUT row stride
    pub lut_width: usize,
    /// Disparity image row stride
    pub img_width: usize,
    /// Smallest accepted raw disparity
    pub min_disp: i32,
    /// Largest accepted raw disparity
    pub max_disp: i32,
    /// Inverse of the sub-pixel disparity scale
    pub disp_scale_inv: f32,
    /// Sub-pixel disparity scale (the baseline is pre-multiplied by it)
    pub disp_scale: i32,
    /// Baseline length (mm)
    pub baseline_mm: f32,
    /// Pixel coordinate along the viewport axis at image column 0
    pub start_n_px: f32,
    /// Azimuth increment per image row (rad)
    pub azim_delta_rad: f32,
    /// Stereo offset along the viewport axis (mm)
    pub offset_mm: f32,
    /// Focal length (px)
    pub focal_px: f32,
    /// Conical model scales
    pub cone: ConeGeometry,
    /// Assumed baseline error (mm)
    pub baseline_error_mm: f32,
    /// View to vehicle transform
    pub view: ViewTransform,
}

impl Default for CellProjectionParams {
    fn default() -> Self {
        Self {
            lut_shift_x: 0,
            lut_shift_y: 0,
            lut_width: 0,
            img_width: 0,
            min_disp: 1,
            max_disp: i32::from(u16::MAX),
            disp_scale_inv: 1.0,
            disp_scale: 1,
            baseline_mm: 0.0,
            start_n_px: 0.0,
            azim_delta_rad: 0.0,
            offset_mm: 0.0,
            focal_px: 0.0,
            cone: ConeGeometry::default(),
            baseline_error_mm: 0.0,
            view: ViewTransform::default(),
        }
    }
}

impl CellProjectionParams {
    /// Whether a raw disparity lies in `[min_disp, max_disp]`.
    #[inline]
    pub fn accepts_disparity(&self, disp: u16) -> bool {
        let d = i32::from(disp);
        d >= self.min_disp && d <= self.max_disp
    }
}
