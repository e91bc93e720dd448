//! Physical extent of the voxel grid and point-to-voxel mapping.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Vec3f, VoxelCoord, VoxelPoint};

/// Invalid envelope parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvelopeError {
    /// Voxel edge length must be positive.
    #[error("mm_per_voxel must be positive, got {0}")]
    InvalidResolution(i32),

    /// An axis has `min >= max`.
    #[error("empty {axis} extent [{min}, {max}]")]
    EmptyExtent {
        /// Axis name
        axis: char,
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },

    /// An extent is NaN, infinite or too large for the integer offset math.
    #[error("{axis} extent {value} outside +/-{} mm", MAX_EXTENT_MM)]
    ExtentOutOfRange {
        /// Axis name
        axis: char,
        /// Offending bound
        value: f32,
    },

    /// The stored inverse does not match `1 / mm_per_voxel`.
    #[error("mm_per_voxel_inv {found} does not match 1/{mm_per_voxel}")]
    InverseMismatch {
        /// Voxel edge length
        mm_per_voxel: i32,
        /// Stored inverse
        found: f32,
    },
}

/// Largest absolute extent (mm) accepted on any axis.
///
/// Keeps every difference of two in-envelope coordinates inside `i32`.
pub const MAX_EXTENT_MM: f32 = 1.0e9;

/// Bounding box (mm, vehicle frame) and resolution of the voxel grid.
///
/// Voxel X/Y indices grow from the maximum X/Y corner towards the minimum;
/// Z indices grow from the minimum Z upwards. The envelope is constant for
/// one invocation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridEnvelope {
    /// Voxel edge length in mm
    pub mm_per_voxel: i32,
    /// `1 / mm_per_voxel`
    pub mm_per_voxel_inv: f32,
    /// Voxel count along X
    pub length_vx: i32,
    /// Voxel count along Y
    pub width_vx: i32,
    /// Voxel count along Z
    pub height_vx: i32,
    /// Total voxel count
    pub num_voxels: i32,
    /// Lowest covered height (mm)
    pub z_min_mm: f32,
    /// Highest covered height (mm)
    pub z_max_mm: f32,
    /// Largest covered X (mm)
    pub x_max_mm: f32,
    /// Smallest covered X (mm)
    pub x_min_mm: f32,
    /// Largest covered Y (mm)
    pub y_max_mm: f32,
    /// Smallest covered Y (mm)
    pub y_min_mm: f32,
}

/// A point that landed inside the envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelSample {
    /// Discrete voxel coordinate
    pub coord: VoxelCoord,
    /// Sub-voxel offsets, uncertainty and existence for this single sample
    pub point: VoxelPoint,
}

impl GridEnvelope {
    /// Build an envelope from extents (mm) and voxel size.
    ///
    /// Voxel counts are rounded up so every interior point gets an index
    /// below the count.
    pub fn from_extents(
        x_mm: (f32, f32),
        y_mm: (f32, f32),
        z_mm: (f32, f32),
        mm_per_voxel: i32,
    ) -> Result<Self, EnvelopeError> {
        check_resolution(mm_per_voxel)?;
        check_extents(x_mm, y_mm, z_mm)?;

        let mm = mm_per_voxel as f32;
        let length_vx = ((x_mm.1 - x_mm.0) / mm).ceil() as i32;
        let width_vx = ((y_mm.1 - y_mm.0) / mm).ceil() as i32;
        let height_vx = ((z_mm.1 - z_mm.0) / mm).ceil() as i32;

        Ok(Self {
            mm_per_voxel,
            mm_per_voxel_inv: 1.0 / mm,
            length_vx,
            width_vx,
            height_vx,
            num_voxels: length_vx.saturating_mul(width_vx).saturating_mul(height_vx),
            z_min_mm: z_mm.0,
            z_max_mm: z_mm.1,
            x_max_mm: x_mm.1,
            x_min_mm: x_mm.0,
            y_max_mm: y_mm.1,
            y_min_mm: y_mm.0,
        })
    }

    /// Check an envelope that was not built with [`from_extents`](Self::from_extents).
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        check_resolution(self.mm_per_voxel)?;
        check_extents(
            (self.x_min_mm, self.x_max_mm),
            (self.y_min_mm, self.y_max_mm),
            (self.z_min_mm, self.z_max_mm),
        )?;

        let expected = 1.0 / self.mm_per_voxel as f32;
        let inv = self.mm_per_voxel_inv;
        if !inv.is_finite() || (inv - expected).abs() > expected * 1e-6 {
            return Err(EnvelopeError::InverseMismatch {
                mm_per_voxel: self.mm_per_voxel,
                found: self.mm_per_voxel_inv,
            });
        }
        Ok(())
    }

    /// Strict containment test; points exactly on a face are outside.
    #[inline]
    pub fn contains(&self, p: Vec3f) -> bool {
        (p.x > self.x_min_mm)
            && (p.x < self.x_max_mm)
            && (p.y > self.y_min_mm)
            && (p.y < self.y_max_mm)
            && (p.z > self.z_min_mm)
            && (p.z < self.z_max_mm)
    }

    /// Map a vehicle-frame point to its voxel.
    ///
    /// Offsets are integer millimetres from the voxel's grid corner, narrowed
    /// through `u8` before being stored as `i16`, so residuals outside
    /// `0..=255` wrap. Uncertainty is converted to cm and clamped to 255.
    /// Returns `None` for points outside the envelope.
    #[inline]
    pub fn locate(&self, p: Vec3f, uncertainty_mm: f32, confidence: u8) -> Option<VoxelSample> {
        if !self.contains(p) {
            return None;
        }

        let inv = self.mm_per_voxel_inv;
        let mm = self.mm_per_voxel;
        let xg = ((self.x_max_mm - p.x) * inv) as i32;
        let yg = ((self.y_max_mm - p.y) * inv) as i32;
        let zg = ((p.z - self.z_min_mm) * inv) as i32;

        // Two's complement arithmetic, truncated to 8 bits
        let ox = (self.x_max_mm as i32)
            .wrapping_sub(xg.wrapping_mul(mm))
            .wrapping_sub(p.x as i32) as u8;
        let oy = (self.y_max_mm as i32)
            .wrapping_sub(yg.wrapping_mul(mm))
            .wrapping_sub(p.y as i32) as u8;
        let oz = (p.z as i32)
            .wrapping_sub((self.z_min_mm as i32).wrapping_add(zg.wrapping_mul(mm))) as u8;

        let uncertainty_cm = (uncertainty_mm * 0.1).min(255.0) as u8;

        Some(VoxelSample {
            coord: VoxelCoord::new(xg, yg, zg),
            point: VoxelPoint {
                x_mm: ox as i16,
                y_mm: oy as i16,
                z_mm: oz as i16,
                uncertainty_cm,
                existence: confidence,
            },
        })
    }

    /// Grid corner of a voxel in vehicle mm (offset origin used by [`locate`](Self::locate)).
    pub fn voxel_corner_mm(&self, coord: VoxelCoord) -> Vec3f {
        let mm = self.mm_per_voxel;
        Vec3f::new(
            ((self.x_max_mm as i32) - (coord.x * mm)) as f32,
            ((self.y_max_mm as i32) - (coord.y * mm)) as f32,
            ((self.z_min_mm as i32) + (coord.z * mm)) as f32,
        )
    }

    /// Whether a coordinate lies inside `[0, length) x [0, width) x [0, height)`.
    pub fn is_valid_coord(&self, coord: VoxelCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.z >= 0
            && coord.x < self.length_vx
            && coord.y < self.width_vx
            && coord.z < self.height_vx
    }
}

fn check_resolution(mm_per_voxel: i32) -> Result<(), EnvelopeError> {
    if mm_per_voxel <= 0 {
        return Err(EnvelopeError::InvalidResolution(mm_per_voxel));
    }
    Ok(())
}

fn check_extents(
    x_mm: (f32, f32),
    y_mm: (f32, f32),
    z_mm: (f32, f32),
) -> Result<(), EnvelopeError> {
    for (axis, (min, max)) in [('x', x_mm), ('y', y_mm), ('z', z_mm)] {
        for value in [min, max] {
            if !value.is_finite() || value.abs() > MAX_EXTENT_MM {
                return Err(EnvelopeError::ExtentOutOfRange { axis, value });
            }
        }
        if min >= max {
            return Err(EnvelopeError::EmptyExtent { axis, min, max });
        }
    }
    Ok(())
}
