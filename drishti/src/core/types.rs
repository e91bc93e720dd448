//! Plain value types shared by the projection, grid and voxel modules.

use serde::{Deserialize, Serialize};

/// 3D vector in millimetres (view or vehicle frame).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3f {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vec3f {
    /// Zero vector.
    pub const ZERO: Vec3f = Vec3f {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// L1 norm `|x| + |y| + |z|`.
    #[inline]
    pub fn l1_norm(&self) -> f32 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }
}

/// 3x3 rotation matrix, stored row by row (`xx xy xz / yx yy yz / zx zy zz`).
///
/// Row `x` holds the X'-axis expressed in the source frame, so
/// `x' = xx*x + xy*y + xz*z`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mat3f {
    #[allow(missing_docs)]
    pub xx: f32,
    #[allow(missing_docs)]
    pub xy: f32,
    #[allow(missing_docs)]
    pub xz: f32,
    #[allow(missing_docs)]
    pub yx: f32,
    #[allow(missing_docs)]
    pub yy: f32,
    #[allow(missing_docs)]
    pub yz: f32,
    #[allow(missing_docs)]
    pub zx: f32,
    #[allow(missing_docs)]
    pub zy: f32,
    #[allow(missing_docs)]
    pub zz: f32,
}

impl Mat3f {
    /// Identity rotation.
    pub const IDENTITY: Mat3f = Mat3f {
        xx: 1.0,
        xy: 0.0,
        xz: 0.0,
        yx: 0.0,
        yy: 1.0,
        yz: 0.0,
        zx: 0.0,
        zy: 0.0,
        zz: 1.0,
    };

    /// Build from nine row-major values.
    pub const fn from_rows(rows: [f32; 9]) -> Self {
        Self {
            xx: rows[0],
            xy: rows[1],
            xz: rows[2],
            yx: rows[3],
            yy: rows[4],
            yz: rows[5],
            zx: rows[6],
            zy: rows[7],
            zz: rows[8],
        }
    }

    /// Rotation by `angle` radians about the vehicle Z axis.
    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0])
    }

    /// Multiply a vector.
    #[inline]
    pub fn mul_vec(&self, v: Vec3f) -> Vec3f {
        Vec3f {
            x: (self.xx * v.x) + (self.xy * v.y) + (self.xz * v.z),
            y: (self.yx * v.x) + (self.yy * v.y) + (self.yz * v.z),
            z: (self.zx * v.x) + (self.zy * v.y) + (self.zz * v.z),
        }
    }
}

impl Default for Mat3f {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-region metadata from the lookup table.
///
/// The table is stored at a lower resolution than the disparity image and is
/// indexed with shifted pixel coordinates.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LutMeta {
    /// Structure score; zero marks a feature-poor region whose disparities
    /// are not trusted.
    pub structure: u8,
    /// Local depth scaling, 64 means 1.0.
    pub scaling: u8,
}

impl LutMeta {
    /// Nominal scaling value (1.0).
    pub const UNIT_SCALING: u8 = 64;

    /// Create a new entry.
    pub const fn new(structure: u8, scaling: u8) -> Self {
        Self { structure, scaling }
    }

    /// Whether pixels in this region may be projected.
    #[inline]
    pub fn is_structured(&self) -> bool {
        self.structure != 0
    }
}

/// One accumulator entry of the voxel scratch table or buffer.
///
/// The offsets are relative to the voxel's discrete grid position and are
/// summed (not averaged) when several samples land in the same voxel; the
/// matching sample count lives next to the entry.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelPoint {
    /// X offset sum in mm
    pub x_mm: i16,
    /// Y offset sum in mm
    pub y_mm: i16,
    /// Z offset sum in mm
    pub z_mm: i16,
    /// Smallest spatial uncertainty of the merged samples (cm)
    pub uncertainty_cm: u8,
    /// Highest stereo confidence of the merged samples
    pub existence: u8,
}

/// Discrete voxel coordinate.
///
/// X and Y count from the envelope's maximum corner, Z from its minimum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelCoord {
    /// Index along X (from `x_max`)
    pub x: i32,
    /// Index along Y (from `y_max`)
    pub y: i32,
    /// Index along Z (from `z_min`)
    pub z: i32,
}

impl VoxelCoord {
    /// Create a new coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Pack into a 16:8:8 key.
    #[inline]
    pub fn key(&self) -> VoxelKey {
        VoxelKey::pack(self.x, self.y, self.z)
    }
}

/// Packed voxel coordinate: x in bits 16-31, y in bits 8-15, z in bits 0-7.
///
/// Packing does not mask the inputs: a y above 255 or a z above 255 bleeds
/// into the next field. Callers keep coordinates within the field widths.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoxelKey(pub u32);

impl VoxelKey {
    /// Pack three grid coordinates.
    #[inline]
    pub fn pack(x: i32, y: i32, z: i32) -> Self {
        Self(((x as u32) << 16) | ((y as u32) << 8) | (z as u32))
    }

    /// Raw packed value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Unpack into a coordinate (exact for in-range inputs).
    #[inline]
    pub fn coord(self) -> VoxelCoord {
        VoxelCoord {
            x: (self.0 >> 16) as i32,
            y: ((self.0 >> 8) & 0xFF) as i32,
            z: (self.0 & 0xFF) as i32,
        }
    }
}

impl From<VoxelKey> for u32 {
    fn from(key: VoxelKey) -> Self {
        key.0
    }
}
