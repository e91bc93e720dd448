//! Core foundation layer.
//!
//! Bottom layer of the pipeline with no internal dependencies.
//!
//! # Contents
//!
//! - [`math`]: Fast trigonometry and the [`Trig`](math::Trig) abstraction
//! - [`types`]: Vectors, rotation matrix, LUT entries, voxel points and keys
//! - [`frame`]: Stereo frame input and index validation errors

pub mod frame;
pub mod math;
pub mod types;

pub use frame::{FrameError, FrameView, StereoFrame};
pub use math::{ExactTrig, PolynomialTrig, Trig, TrigMode, cos_approx, sin_approx};
pub use types::{LutMeta, Mat3f, Vec3f, VoxelCoord, VoxelKey, VoxelPoint};
