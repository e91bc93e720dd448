//! Disparity to 3D projection.
//!
//! Two camera models share one per-cell pixel loop:
//!
//! | Model | Depth along axis | Radius |
//! |-------|------------------|--------|
//! | [`CylindricalProjector`] | `n * b / d + offset` | `f * b / d` |
//! | [`ConicalProjector`] | `(x' - cos(phi) x x') * b / d + offset` | `sin(phi) x x' * b / d` |
//!
//! The radius is split into X/Y with the row azimuth, then the point is moved
//! into the vehicle frame with the view transform. Every point carries an
//! uncertainty (mm) built from the pixel quantisation error, the baseline
//! error and the view rotation error.

mod cell;
mod conical;
mod cylindrical;
mod params;
mod uncertainty;

use serde::{Deserialize, Serialize};

use crate::core::Vec3f;

pub use cell::{CellContext, CellStats};
pub use conical::ConicalProjector;
pub use cylindrical::CylindricalProjector;
pub use params::{CellProjectionParams, ConeGeometry, ViewTransform};
pub use uncertainty::{
    ODOMETRY_UNCERTAINTY_RAD, SCALING_RATIO, STEREO_PIXEL_UNCERTAINTY, UncertaintyModel,
};

/// View-space point produced by a projector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedPoint {
    /// Position in view coordinates (mm)
    pub position: Vec3f,
    /// Uncertainty from disparity and baseline errors (mm)
    pub uncertainty_mm: f32,
}

/// Per-pixel projection for one camera model.
///
/// Implementations hold their per-invocation constants; the caller supplies
/// the raw disparity, the running viewport coordinate `n_px`, the row's
/// azimuth sine/cosine and the LUT scaling byte.
pub trait CameraProjector: Send + Sync {
    /// Project one accepted pixel into view space.
    fn project(&self, disp: u16, n_px: f32, sin_az: f32, cos_az: f32, scaling: u8) -> ProjectedPoint;

    /// Model name for logging.
    fn name(&self) -> &str;
}

/// Camera model selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraModel {
    /// Cylindrical viewport
    #[default]
    Cylindrical,
    /// Conical viewport
    Conical,
}

impl std::fmt::Display for CameraModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraModel::Cylindrical => write!(f, "cylindrical"),
            CameraModel::Conical => write!(f, "conical"),
        }
    }
}

impl std::str::FromStr for CameraModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cylindrical" => Ok(CameraModel::Cylindrical),
            "conical" => Ok(CameraModel::Conical),
            other => Err(format!("unknown camera model '{}'", other)),
        }
    }
}
