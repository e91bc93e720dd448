//! Test utilities for Drishti integration tests.
//!
//! Builds synthetic dumps: a single-pixel reference scene with a known
//! voxel, and a pseudo-random scene that exercises rejections, collisions
//! and out-of-grid points. Random scenes are seeded for reproducibility.

#![allow(dead_code)]

use rand::prelude::*;

use drishti::core::TrigMode;
use drishti::projection::CameraModel;
use drishti::{
    CellGrid, CellProjectionParams, Dump, DumpParams, GridEnvelope, LutMeta, Mat3f, Roi,
    StereoFrame, Vec3f, ViewTransform, VoxelizeOptions,
};

/// Image size of the random scene.
pub const SCENE_WIDTH: usize = 64;
pub const SCENE_HEIGHT: usize = 32;

/// Envelope used by the reference scene: 100 mm voxels, X/Y [-1000, 1000], Z [0, 2000].
pub fn reference_envelope() -> GridEnvelope {
    GridEnvelope::from_extents((-1000.0, 1000.0), (-1000.0, 1000.0), (0.0, 2000.0), 100)
        .unwrap()
}

/// Projection parameters that put disparity 10 at column 0 on (500, 0, 1000).
pub fn reference_projection(img_width: usize) -> CellProjectionParams {
    CellProjectionParams {
        lut_shift_x: 1,
        lut_shift_y: 1,
        lut_width: img_width.div_ceil(2),
        img_width,
        min_disp: 1,
        max_disp: 1000,
        baseline_mm: 100.0,
        focal_px: 50.0,
        start_n_px: 100.0,
        ..Default::default()
    }
}

/// One-cell grid covering `width x height` pixels from the origin.
pub fn single_cell_grid(width: i32, height: i32) -> CellGrid {
    CellGrid {
        roi: Roi::new(0, 0, width - 1, height - 1),
        grid_width: 1,
        grid_height: 1,
        cell_width: width,
        cell_height: height,
        start_azimuth_rad: 0.0,
    }
}

/// Frame filled with one disparity and confidence, every LUT entry structured.
pub fn uniform_frame(width: usize, height: usize, disparity: u16, confidence: u8) -> StereoFrame {
    let lut_len = width.div_ceil(2) * height.div_ceil(2);
    StereoFrame::new(
        width,
        height,
        vec![disparity; width * height],
        vec![confidence; width * height],
        vec![LutMeta::new(1, LutMeta::UNIT_SCALING); lut_len],
    )
}

/// Single pixel, disparity 10, confidence 200: lands in voxel (5, 10, 10).
pub fn reference_dump() -> Dump {
    Dump {
        params: DumpParams {
            projection: reference_projection(1),
            grid: single_cell_grid(1, 1),
            envelope: reference_envelope(),
            image_width: 1,
            image_height: 1,
            disp_offset: 0,
        },
        frame: uniform_frame(1, 1, 10, 200),
    }
}

/// 64 x 32 scene split into 4 x 2 cells of 16 x 16, with a rotated and
/// translated view and a drifting azimuth.
pub fn scene_dump(seed: u64) -> Dump {
    let mut rng = StdRng::seed_from_u64(seed);
    let pixels = SCENE_WIDTH * SCENE_HEIGHT;

    let disparity: Vec<u16> = (0..pixels)
        .map(|_| {
            if rng.random_bool(0.1) {
                0
            } else {
                rng.random_range(8..60)
            }
        })
        .collect();
    let confidence: Vec<u8> = (0..pixels).map(|_| rng.random()).collect();

    let lut_len = (SCENE_WIDTH / 2) * (SCENE_HEIGHT / 2);
    let lut: Vec<LutMeta> = (0..lut_len)
        .map(|_| {
            let structure = u8::from(!rng.random_bool(0.125));
            LutMeta::new(structure, rng.random_range(32..=128))
        })
        .collect();

    let projection = CellProjectionParams {
        lut_shift_x: 1,
        lut_shift_y: 1,
        lut_width: SCENE_WIDTH / 2,
        img_width: SCENE_WIDTH,
        min_disp: 4,
        max_disp: 56,
        baseline_mm: 120.0,
        focal_px: 300.0,
        start_n_px: -32.0,
        azim_delta_rad: 0.025,
        offset_mm: 1000.0,
        baseline_error_mm: 0.5,
        view: ViewTransform::new(Vec3f::new(50.0, -20.0, 10.0), Mat3f::rotation_z(0.1)),
        ..Default::default()
    };

    let grid = CellGrid {
        roi: Roi::new(0, 0, SCENE_WIDTH as i32 - 1, SCENE_HEIGHT as i32 - 1),
        grid_width: 4,
        grid_height: 2,
        cell_width: 16,
        cell_height: 16,
        start_azimuth_rad: -0.4,
    };

    // Power-of-two voxel size keeps the inverse exact
    let envelope =
        GridEnvelope::from_extents((-2048.0, 2048.0), (-2048.0, 2048.0), (0.0, 2048.0), 128)
            .unwrap();

    Dump {
        params: DumpParams {
            projection,
            grid,
            envelope,
            image_width: SCENE_WIDTH,
            image_height: SCENE_HEIGHT,
            disp_offset: 0,
        },
        frame: StereoFrame::new(SCENE_WIDTH, SCENE_HEIGHT, disparity, confidence, lut),
    }
}

/// Options with an explicit model, trig and parallelism.
pub fn options(camera_model: CameraModel, trig: TrigMode, parallel: bool) -> VoxelizeOptions {
    VoxelizeOptions {
        camera_model,
        trig,
        parallel,
        ..Default::default()
    }
}
