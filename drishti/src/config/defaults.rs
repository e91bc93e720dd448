//! Default value functions for serde deserialization.

use crate::projection::{ODOMETRY_UNCERTAINTY_RAD, SCALING_RATIO, STEREO_PIXEL_UNCERTAINTY};
use crate::voxel::DEFAULT_BUFFER_CAPACITY;

pub fn enabled() -> bool {
    true
}

pub fn stereo_pixel_uncertainty() -> f32 {
    STEREO_PIXEL_UNCERTAINTY
}

pub fn scaling_ratio() -> f32 {
    SCALING_RATIO
}

pub fn odometry_uncertainty_rad() -> f32 {
    ODOMETRY_UNCERTAINTY_RAD
}

pub fn buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

pub fn points_path() -> String {
    "points.txt".to_string()
}
