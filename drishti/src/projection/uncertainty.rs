//! Error model constants for the projectors.

use serde::{Deserialize, Serialize};

/// Assumed disparity error in sub-pixel units at unit LUT scaling.
pub const STEREO_PIXEL_UNCERTAINTY: f32 = 4.0;

/// Converts the LUT `scaling` byte (64 = 1.0) into a factor.
pub const SCALING_RATIO: f32 = 1.0 / 64.0;

/// Assumed angular error of the view rotation.
pub const ODOMETRY_UNCERTAINTY_RAD: f32 = 0.02;

/// Error sources combined into each point's uncertainty.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UncertaintyModel {
    /// Disparity error in sub-pixel units
    pub stereo_pixel_uncertainty: f32,
    /// LUT scaling byte to factor
    pub scaling_ratio: f32,
    /// View rotation error (rad)
    pub odometry_uncertainty_rad: f32,
}

impl Default for UncertaintyModel {
    fn default() -> Self {
        Self {
            stereo_pixel_uncertainty: STEREO_PIXEL_UNCERTAINTY,
            scaling_ratio: SCALING_RATIO,
            odometry_uncertainty_rad: ODOMETRY_UNCERTAINTY_RAD,
        }
    }
}

impl UncertaintyModel {
    /// Pixel error per unit of LUT scaling.
    #[inline]
    pub fn pixel_factor(&self) -> f32 {
        self.scaling_ratio * self.stereo_pixel_uncertainty
    }
}
