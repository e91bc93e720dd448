//! Frame dump directories.
//!
//! A dump holds one voxelizer invocation as four little-endian files:
//!
//! | File | Content |
//! |------|---------|
//! | `disparity.bin` | `u16` disparity samples |
//! | `confidence.bin` | `u8` confidence samples |
//! | `lut_meta.bin` | `(structure: u8, scaling: u8)` pairs |
//! | `params.bin` | 252-byte parameter block |
//!
//! Parameter block layout (all fields 4 bytes):
//! - Cell data: `cell_idx, cell_width, cell_height, start_x, start_y,
//!   lut_shift_x, lut_shift_y, lut_width, img_width, min_disp, max_disp`
//!   (i32), `disp_scale_inv, b_mm, start_n_px, azim_angle_rad,
//!   azim_delta_rad, polar_angle_rad, polar_delta_rad, cen_x_px, cen_y_px,
//!   planar_aspect, offset_mm, f_px, scale_n, scale_r, baseline_error_mm`
//!   (f32), `pos_mm` (3 x f32), `rot` (9 x f32, row-major)
//! - ROI: `min_x, min_y, max_x, max_y, width, height` (i32)
//! - `start_azim_rad` (f32)
//! - Cell grid: `grid_width, grid_height, cell_width, cell_height` (i32)
//! - Envelope: `mm_per_voxel` (i32), `mm_per_voxel_inv` (f32),
//!   `length, width, height, num_voxels` (i32),
//!   `z_min, z_max, x_max, x_min, y_max, y_min` (f32)
//! - `disp_scale, disp_offset` (i32)
//!
//! Per-cell fields are recomputed by the driver and the planar/spherical
//! fields are unused; both are skipped on load and written as zero.

use std::path::Path;

use super::error::DumpError;
use crate::core::{LutMeta, Mat3f, StereoFrame, Vec3f};
use crate::driver::{CellGrid, Roi};
use crate::grid::GridEnvelope;
use crate::projection::{CellProjectionParams, ConeGeometry, ViewTransform};

/// Size of `params.bin` in bytes.
pub const PARAMS_BLOCK_SIZE: usize = 252;

/// Disparity file name
pub const DISPARITY_FILE: &str = "disparity.bin";
/// Confidence file name
pub const CONFIDENCE_FILE: &str = "confidence.bin";
/// LUT file name
pub const LUT_FILE: &str = "lut_meta.bin";
/// Parameter block file name
pub const PARAMS_FILE: &str = "params.bin";

/// Decoded parameter block.
#[derive(Clone, Debug, PartialEq)]
pub struct DumpParams {
    /// Projection parameters shared by all cells
    pub projection: CellProjectionParams,
    /// Cell layout
    pub grid: CellGrid,
    /// Voxel grid envelope
    pub envelope: GridEnvelope,
    /// Image width (px)
    pub image_width: usize,
    /// Image height (px)
    pub image_height: usize,
    /// Start of the region of interest in the disparity/confidence arrays
    pub disp_offset: usize,
}

/// One complete invocation loaded from disk.
#[derive(Clone, Debug)]
pub struct Dump {
    /// Parameters
    pub params: DumpParams,
    /// Frame arrays, `disp_offset` applied from the parameters
    pub frame: StereoFrame,
}

/// Little-endian field cursor over a size-checked block.
struct FieldReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn word(&mut self) -> [u8; 4] {
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[self.pos..self.pos + 4]);
        self.pos += 4;
        word
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.word())
    }

    fn f32(&mut self) -> f32 {
        f32::from_le_bytes(self.word())
    }

    fn skip(&mut self, fields: usize) {
        self.pos += 4 * fields;
    }
}

fn non_negative(name: &str, value: i32) -> Result<usize, DumpError> {
    usize::try_from(value)
        .map_err(|_| DumpError::InvalidParameter(format!("{} is negative ({})", name, value)))
}

fn shift(name: &str, value: i32) -> Result<u32, DumpError> {
    u32::try_from(value)
        .map_err(|_| DumpError::InvalidParameter(format!("{} is negative ({})", name, value)))
}

impl DumpParams {
    /// Decode a `params.bin` block.
    pub fn decode(bytes: &[u8]) -> Result<Self, DumpError> {
        if bytes.len() != PARAMS_BLOCK_SIZE {
            return Err(DumpError::ParamsSize {
                expected: PARAMS_BLOCK_SIZE,
                found: bytes.len(),
            });
        }
        let mut r = FieldReader::new(bytes);

        // cell_idx, cell_width, cell_height, start_x, start_y
        r.skip(5);
        let lut_shift_x = shift("lut_shift_x", r.i32())?;
        let lut_shift_y = shift("lut_shift_y", r.i32())?;
        let lut_width = non_negative("lut_width", r.i32())?;
        let img_width = non_negative("img_width", r.i32())?;
        let min_disp = r.i32();
        let max_disp = r.i32();

        let disp_scale_inv = r.f32();
        let baseline_mm = r.f32();
        let start_n_px = r.f32();
        // azim_angle_rad
        r.skip(1);
        let azim_delta_rad = r.f32();
        // polar_angle_rad, polar_delta_rad, cen_x_px, cen_y_px, planar_aspect
        r.skip(5);
        let offset_mm = r.f32();
        let focal_px = r.f32();
        let scale_n = r.f32();
        let scale_r = r.f32();
        let baseline_error_mm = r.f32();

        let position_mm = Vec3f::new(r.f32(), r.f32(), r.f32());
        let mut rot = [0.0f32; 9];
        for value in rot.iter_mut() {
            *value = r.f32();
        }
        let rotation = Mat3f::from_rows(rot);

        let roi = Roi::new(r.i32(), r.i32(), r.i32(), r.i32());
        let image_width = non_negative("width", r.i32())?;
        let image_height = non_negative("height", r.i32())?;
        let start_azimuth_rad = r.f32();

        let grid = CellGrid {
            roi,
            grid_width: r.i32(),
            grid_height: r.i32(),
            cell_width: r.i32(),
            cell_height: r.i32(),
            start_azimuth_rad,
        };

        let envelope = GridEnvelope {
            mm_per_voxel: r.i32(),
            mm_per_voxel_inv: r.f32(),
            length_vx: r.i32(),
            width_vx: r.i32(),
            height_vx: r.i32(),
            num_voxels: r.i32(),
            z_min_mm: r.f32(),
            z_max_mm: r.f32(),
            x_max_mm: r.f32(),
            x_min_mm: r.f32(),
            y_max_mm: r.f32(),
            y_min_mm: r.f32(),
        };
        envelope.validate()?;

        let disp_scale = r.i32();
        let disp_offset = non_negative("disp_offset", r.i32())?;

        Ok(Self {
            projection: CellProjectionParams {
                lut_shift_x,
                lut_shift_y,
                lut_width,
                img_width,
                min_disp,
                max_disp,
                disp_scale_inv,
                disp_scale,
                baseline_mm,
                start_n_px,
                azim_delta_rad,
                offset_mm,
                focal_px,
                cone: ConeGeometry::new(scale_n, scale_r),
                baseline_error_mm,
                view: ViewTransform::new(position_mm, rotation),
            },
            grid,
            envelope,
            image_width,
            image_height,
            disp_offset,
        })
    }

    /// Encode into a `params.bin` block.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PARAMS_BLOCK_SIZE);
        let i32s = |out: &mut Vec<u8>, values: &[i32]| {
            for v in values {
                out.extend_from_slice(&v.to_le_bytes());
            }
        };
        let f32s = |out: &mut Vec<u8>, values: &[f32]| {
            for v in values {
                out.extend_from_slice(&v.to_le_bytes());
            }
        };

        let p = &self.projection;
        let m = &p.view.rotation;
        let g = &self.grid;
        let e = &self.envelope;

        i32s(&mut out, &[0, 0, 0, 0, 0]);
        i32s(
            &mut out,
            &[
                p.lut_shift_x as i32,
                p.lut_shift_y as i32,
                p.lut_width as i32,
                p.img_width as i32,
                p.min_disp,
                p.max_disp,
            ],
        );
        f32s(
            &mut out,
            &[p.disp_scale_inv, p.baseline_mm, p.start_n_px, 0.0, p.azim_delta_rad],
        );
        f32s(&mut out, &[0.0; 5]);
        f32s(
            &mut out,
            &[
                p.offset_mm,
                p.focal_px,
                p.cone.scale_n,
                p.cone.scale_r,
                p.baseline_error_mm,
            ],
        );
        f32s(
            &mut out,
            &[p.view.position_mm.x, p.view.position_mm.y, p.view.position_mm.z],
        );
        f32s(
            &mut out,
            &[m.xx, m.xy, m.xz, m.yx, m.yy, m.yz, m.zx, m.zy, m.zz],
        );

        i32s(
            &mut out,
            &[
                g.roi.min_x,
                g.roi.min_y,
                g.roi.max_x,
                g.roi.max_y,
                self.image_width as i32,
                self.image_height as i32,
            ],
        );
        f32s(&mut out, &[g.start_azimuth_rad]);
        i32s(
            &mut out,
            &[g.grid_width, g.grid_height, g.cell_width, g.cell_height],
        );

        i32s(&mut out, &[e.mm_per_voxel]);
        f32s(&mut out, &[e.mm_per_voxel_inv]);
        i32s(
            &mut out,
            &[e.length_vx, e.width_vx, e.height_vx, e.num_voxels],
        );
        f32s(
            &mut out,
            &[e.z_min_mm, e.z_max_mm, e.x_max_mm, e.x_min_mm, e.y_max_mm, e.y_min_mm],
        );

        i32s(&mut out, &[p.disp_scale, self.disp_offset as i32]);
        out
    }
}

fn read_file(dir: &Path, name: &str) -> Result<Vec<u8>, DumpError> {
    Ok(std::fs::read(dir.join(name))?)
}

fn check_aligned(file: &'static str, bytes: &[u8], element: usize) -> Result<(), DumpError> {
    if bytes.len() % element != 0 {
        return Err(DumpError::Misaligned {
            file,
            len: bytes.len(),
            element,
        });
    }
    Ok(())
}

/// Load a dump directory.
pub fn load_dump(dir: &Path) -> Result<Dump, DumpError> {
    let params = DumpParams::decode(&read_file(dir, PARAMS_FILE)?)?;

    let disp_bytes = read_file(dir, DISPARITY_FILE)?;
    check_aligned(DISPARITY_FILE, &disp_bytes, 2)?;
    let disparity: Vec<u16> = disp_bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();

    let confidence = read_file(dir, CONFIDENCE_FILE)?;

    let lut_bytes = read_file(dir, LUT_FILE)?;
    check_aligned(LUT_FILE, &lut_bytes, 2)?;
    let lut: Vec<LutMeta> = lut_bytes
        .chunks_exact(2)
        .map(|c| LutMeta::new(c[0], c[1]))
        .collect();

    log::debug!(
        "Loaded dump {}: {} disparities, {} confidences, {} LUT entries",
        dir.display(),
        disparity.len(),
        confidence.len(),
        lut.len()
    );

    let frame = StereoFrame::new(
        params.image_width,
        params.image_height,
        disparity,
        confidence,
        lut,
    )
    .with_disp_offset(params.disp_offset);

    Ok(Dump { params, frame })
}

/// Write a dump directory (the directory must exist).
pub fn save_dump(dir: &Path, dump: &Dump) -> Result<(), DumpError> {
    let disparity: Vec<u8> = dump
        .frame
        .disparity
        .iter()
        .flat_map(|d| d.to_le_bytes())
        .collect();
    let lut: Vec<u8> = dump
        .frame
        .lut
        .iter()
        .flat_map(|m| [m.structure, m.scaling])
        .collect();

    std::fs::write(dir.join(PARAMS_FILE), dump.params.encode())?;
    std::fs::write(dir.join(DISPARITY_FILE), disparity)?;
    std::fs::write(dir.join(CONFIDENCE_FILE), &dump.frame.confidence)?;
    std::fs::write(dir.join(LUT_FILE), lut)?;
    Ok(())
}
