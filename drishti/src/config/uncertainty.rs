//! Uncertainty model configuration section.

use serde::{Deserialize, Serialize};

use crate::projection::{
    ODOMETRY_UNCERTAINTY_RAD, SCALING_RATIO, STEREO_PIXEL_UNCERTAINTY, UncertaintyModel,
};

use super::defaults;

/// Uncertainty settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UncertaintySection {
    /// Disparity error (sub-pixel units) at unit LUT scaling
    #[serde(default = "defaults::stereo_pixel_uncertainty")]
    pub stereo_pixel_uncertainty: f32,

    /// LUT scaling byte to factor (1/64)
    #[serde(default = "defaults::scaling_ratio")]
    pub scaling_ratio: f32,

    /// View rotation error (rad)
    #[serde(default = "defaults::odometry_uncertainty_rad")]
    pub odometry_uncertainty_rad: f32,
}

impl Default for UncertaintySection {
    fn default() -> Self {
        Self {
            stereo_pixel_uncertainty: STEREO_PIXEL_UNCERTAINTY,
            scaling_ratio: SCALING_RATIO,
            odometry_uncertainty_rad: ODOMETRY_UNCERTAINTY_RAD,
        }
    }
}

impl UncertaintySection {
    /// Convert to UncertaintyModel
    pub fn to_model(&self) -> UncertaintyModel {
        UncertaintyModel {
            stereo_pixel_uncertainty: self.stereo_pixel_uncertainty,
            scaling_ratio: self.scaling_ratio,
            odometry_uncertainty_rad: self.odometry_uncertainty_rad,
        }
    }
}
