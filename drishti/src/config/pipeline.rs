//! Pipeline configuration section.

use serde::{Deserialize, Serialize};

use crate::core::TrigMode;
use crate::projection::CameraModel;

use super::defaults;

/// Pipeline settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineSection {
    /// Camera model: "cylindrical" or "conical"
    #[serde(default)]
    pub camera_model: CameraModel,

    /// Trigonometry: "polynomial" or "exact"
    #[serde(default)]
    pub trig: TrigMode,

    /// Process cells on the rayon pool
    #[serde(default = "defaults::enabled")]
    pub parallel: bool,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            camera_model: CameraModel::Cylindrical,
            trig: TrigMode::Polynomial,
            parallel: true,
        }
    }
}
