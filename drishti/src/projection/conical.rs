//! Conical viewport projection.
//!
//! Both stereo rays are treated as points on cones of unit height whose
//! apexes are one baseline apart. With `x` and `x'` the distances from the
//! left and right apex and `phi` the half aperture, similar triangles give
//!
//! ```text
//! r = sin(phi) * x*x' * b / (x - x')
//! n = (x' - cos(phi) * x*x') * b / (x - x')
//! ```
//!
//! `scale_r` and `scale_n` carry the `sin(phi)` / `cos(phi)` factors.

use super::{CameraProjector, CellProjectionParams, ProjectedPoint, UncertaintyModel};
use crate::core::Vec3f;

/// Conical camera model.
#[derive(Clone, Copy, Debug)]
pub struct ConicalProjector {
    disp_scale_inv: f32,
    baseline_mm: f32,
    offset_mm: f32,
    scale_n: f32,
    scale_r: f32,
    pixel_factor: f32,
    baseline_error_mm: f32,
}

impl ConicalProjector {
    /// Precompute the per-invocation constants.
    pub fn new(params: &CellProjectionParams, model: &UncertaintyModel) -> Self {
        Self {
            disp_scale_inv: params.disp_scale_inv,
            baseline_mm: params.baseline_mm,
            offset_mm: params.offset_mm,
            scale_n: params.cone.scale_n,
            scale_r: params.cone.scale_r,
            // Disparities are converted to pixels here, so is the pixel error
            pixel_factor: model.pixel_factor() * params.disp_scale_inv,
            baseline_error_mm: params.baseline_error_mm,
        }
    }
}

impl CameraProjector for ConicalProjector {
    #[inline]
    fn project(&self, disp: u16, n_px: f32, sin_az: f32, cos_az: f32, scaling: u8) -> ProjectedPoint {
        let dispf = f32::from(disp) * self.disp_scale_inv;
        let inv = 1.0 / dispf;
        let ratio = self.baseline_mm * inv;

        let n_right = n_px - dispf;
        let n_cross = n_right * n_px;
        let z_tmp = n_right - (n_cross * self.scale_n);
        let r_tmp = n_cross * self.scale_r;
        let z = (z_tmp * ratio) + self.offset_mm;
        let r = r_tmp * ratio;
        let y = sin_az * r;
        let x = cos_az * r;

        let pixel_unc = self.pixel_factor * f32::from(scaling);
        let ratio_der_n = (n_px * (ratio * inv)).abs();
        let max_factor = (self.scale_r * n_px)
            .abs()
            .max((1.0 - (self.scale_n * n_px)).abs());
        let uncertainty_mm = (pixel_unc * ratio_der_n * max_factor)
            + (r_tmp.abs().max(z_tmp.abs()) * inv * self.baseline_error_mm);

        ProjectedPoint {
            position: Vec3f::new(x, y, z),
            uncertainty_mm,
        }
    }

    fn name(&self) -> &str {
        "conical"
    }
}
