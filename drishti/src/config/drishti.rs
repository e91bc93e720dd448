//! Main DrishtiConfig and conversion methods.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::driver::VoxelizeOptions;
use crate::projection::UncertaintyModel;

use super::error::ConfigLoadError;
use super::output::{BufferSection, OutputSection};
use super::pipeline::PipelineSection;
use super::uncertainty::UncertaintySection;

/// Full Drishti configuration loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DrishtiConfig {
    /// Pipeline settings
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// Uncertainty model settings
    #[serde(default)]
    pub uncertainty: UncertaintySection,

    /// Output buffer settings
    #[serde(default)]
    pub buffer: BufferSection,

    /// Output settings
    #[serde(default)]
    pub output: OutputSection,
}

impl DrishtiConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/drishti.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/drishti.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let u = &self.uncertainty;
        for (name, value) in [
            ("stereo_pixel_uncertainty", u.stereo_pixel_uncertainty),
            ("scaling_ratio", u.scaling_ratio),
            ("odometry_uncertainty_rad", u.odometry_uncertainty_rad),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigLoadError::Invalid(format!(
                    "uncertainty.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.buffer.capacity == 0 {
            return Err(ConfigLoadError::Invalid(
                "buffer.capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the uncertainty model
    pub fn uncertainty_model(&self) -> UncertaintyModel {
        self.uncertainty.to_model()
    }

    /// Get the output buffer capacity
    pub fn buffer_capacity(&self) -> usize {
        self.buffer.capacity
    }

    /// Convert to VoxelizeOptions
    pub fn to_voxelize_options(&self) -> VoxelizeOptions {
        VoxelizeOptions {
            camera_model: self.pipeline.camera_model,
            trig: self.pipeline.trig,
            uncertainty: self.uncertainty_model(),
            buffer_capacity: self.buffer_capacity(),
            parallel: self.pipeline.parallel,
        }
    }
}
