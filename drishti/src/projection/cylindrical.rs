//! Cylindrical viewport projection.
//!
//! The stereo equations give the distance along the cylinder axis and the
//! radius from it; the row azimuth splits the radius into X and Y. Axes
//! follow the epipolar viewport convention (n backwards, v up, u right).

use super::{CameraProjector, CellProjectionParams, ProjectedPoint, UncertaintyModel};
use crate::core::Vec3f;

/// Cylindrical camera model.
#[derive(Clone, Copy, Debug)]
pub struct CylindricalProjector {
    baseline_mm: f32,
    offset_mm: f32,
    focal_px: f32,
    pixel_factor: f32,
    odometry_mm: f32,
}

impl CylindricalProjector {
    /// Precompute the per-invocation constants.
    pub fn new(params: &CellProjectionParams, model: &UncertaintyModel) -> Self {
        Self {
            baseline_mm: params.baseline_mm,
            offset_mm: params.offset_mm,
            focal_px: params.focal_px,
            pixel_factor: model.pixel_factor(),
            // The baseline is pre-scaled by the disparity scale, so is its error
            odometry_mm: params.baseline_error_mm * params.disp_scale as f32,
        }
    }
}

impl CameraProjector for CylindricalProjector {
    #[inline]
    fn project(&self, disp: u16, n_px: f32, sin_az: f32, cos_az: f32, scaling: u8) -> ProjectedPoint {
        let inv = 1.0 / f32::from(disp);
        let ratio = self.baseline_mm * inv;
        let z = (n_px * ratio) + self.offset_mm;
        let r = self.focal_px * ratio;
        let y = sin_az * r;
        let x = cos_az * r;

        // Derivatives of z(disp) and r(disp); the larger factor is used
        let pixel_unc = self.pixel_factor * f32::from(scaling);
        let ratio_der = (ratio * inv).abs();
        let max_factor = self.focal_px.abs().max(n_px.abs());
        let uncertainty_mm = max_factor * ((pixel_unc * ratio_der) + (self.odometry_mm * inv));

        ProjectedPoint {
            position: Vec3f::new(x, y, z),
            uncertainty_mm,
        }
    }

    fn name(&self) -> &str {
        "cylindrical"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> CellProjectionParams {
        CellProjectionParams {
            baseline_mm: 100.0,
            focal_px: 50.0,
            offset_mm: 0.0,
            baseline_error_mm: 0.5,
            disp_scale: 16,
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_geometry() {
        let p = CylindricalProjector::new(&params(), &UncertaintyModel::default());
        let out = p.project(10, 100.0, 0.0, 1.0, 64);
        assert_eq!(out.position, Vec3f::new(500.0, 0.0, 1000.0));
    }

    #[test]
    fn test_azimuth_splits_radius() {
        let p = CylindricalProjector::new(&params(), &UncertaintyModel::default());
        let (s, c) = 0.5f32.sin_cos();
        let out = p.project(20, 0.0, s, c, 64);
        // r = 50 * 100 / 20
        assert_relative_eq!(out.position.x, 250.0 * c, epsilon = 1e-3);
        assert_relative_eq!(out.position.y, 250.0 * s, epsilon = 1e-3);
        assert_relative_eq!(out.position.z, 0.0);
    }

    #[test]
    fn test_uncertainty_formula() {
        let p = CylindricalProjector::new(&params(), &UncertaintyModel::default());
        let out = p.project(10, 100.0, 0.0, 1.0, 64);
        // pixel 4.0 * |10 / 10| + odometry 8.0 / 10, scaled by max(50, 100)
        assert_relative_eq!(out.uncertainty_mm, 100.0 * (4.0 + 0.8), epsilon = 1e-3);
    }

    #[test]
    fn test_uncertainty_grows_with_distance() {
        let p = CylindricalProjector::new(&params(), &UncertaintyModel::default());
        let near = p.project(40, 10.0, 0.0, 1.0, 64).uncertainty_mm;
        let far = p.project(5, 10.0, 0.0, 1.0, 64).uncertainty_mm;
        assert!(far > near);
    }

    #[test]
    fn test_lut_scaling_weights_pixel_term() {
        let model = UncertaintyModel::default();
        let p = CylindricalProjector::new(
            &CellProjectionParams {
                baseline_error_mm: 0.0,
                ..params()
            },
            &model,
        );
        let unit = p.project(10, 100.0, 0.0, 1.0, 64).uncertainty_mm;
        let double = p.project(10, 100.0, 0.0, 1.0, 128).uncertainty_mm;
        assert_relative_eq!(double, 2.0 * unit, epsilon = 1e-3);
    }
}
