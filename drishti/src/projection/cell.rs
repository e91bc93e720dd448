//! Shared per-cell pixel loop.

use super::{CameraProjector, CellProjectionParams, UncertaintyModel};
use crate::core::{FrameView, Trig};
use crate::driver::CellWindow;
use crate::grid::GridEnvelope;
use crate::voxel::{InsertStatus, VoxelScratch};

/// Counters for one or more processed cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellStats {
    /// Pixels visited
    pub pixels: usize,
    /// Pixels rejected by the disparity range or LUT structure
    pub rejected: usize,
    /// Projected points outside the grid envelope
    pub out_of_grid: usize,
    /// Samples that created a scratch entry
    pub inserted: usize,
    /// Samples merged into an existing entry
    pub merged: usize,
    /// Samples dropped on hash collision
    pub collisions: usize,
}

impl CellStats {
    /// Merge another set of counters into this one
    pub fn merge(&mut self, other: &CellStats) {
        self.pixels += other.pixels;
        self.rejected += other.rejected;
        self.out_of_grid += other.out_of_grid;
        self.inserted += other.inserted;
        self.merged += other.merged;
        self.collisions += other.collisions;
    }
}

/// Everything a cell needs besides its window and scratch table.
///
/// Read-only, so one context can serve cells on several threads.
#[derive(Clone, Copy, Debug)]
pub struct CellContext<'a, P, T> {
    /// Camera model
    pub projector: P,
    /// Row sine/cosine provider
    pub trig: T,
    /// Shared projection parameters
    pub params: &'a CellProjectionParams,
    /// Frame data with the disparity offset applied
    pub frame: FrameView<'a>,
    /// Voxel grid envelope
    pub envelope: &'a GridEnvelope,
    /// View rotation error (rad)
    pub odometry_uncertainty_rad: f32,
}

impl<'a, P: CameraProjector, T: Trig> CellContext<'a, P, T> {
    /// Create a context.
    pub fn new(
        projector: P,
        trig: T,
        params: &'a CellProjectionParams,
        frame: FrameView<'a>,
        envelope: &'a GridEnvelope,
        model: &UncertaintyModel,
    ) -> Self {
        Self {
            projector,
            trig,
            params,
            frame,
            envelope,
            odometry_uncertainty_rad: model.odometry_uncertainty_rad,
        }
    }

    /// Project every pixel of `window` into `scratch`.
    ///
    /// The scratch table is not reset here. The window must have passed
    /// [`CellGrid::validate`](crate::driver::CellGrid::validate) for this
    /// frame, otherwise indexing panics.
    pub fn fill_cell(&self, window: &CellWindow, scratch: &mut VoxelScratch) -> CellStats {
        let params = self.params;
        let frame = &self.frame;
        let mut stats = CellStats::default();

        let width = window.width.max(0) as usize;
        let height = window.height.max(0) as usize;
        let start_x = window.start_x as usize;

        let mut y = window.start_y as usize;
        let mut azimuth = window.azimuth_rad;
        for _ in 0..height {
            let mut n_px = params.start_n_px + window.start_x as f32;
            let lut_row = (y >> params.lut_shift_y) * params.lut_width;
            let disp_row = y * params.img_width;
            let (sin_az, cos_az) = self.trig.sin_cos(azimuth);

            for x in start_x..start_x + width {
                stats.pixels += 1;
                let disp_idx = disp_row + x;
                let disp = frame.disparity[disp_idx];
                let meta = frame.lut[lut_row + (x >> params.lut_shift_x)];

                if params.accepts_disparity(disp) && meta.is_structured() {
                    let view = self
                        .projector
                        .project(disp, n_px, sin_az, cos_az, meta.scaling);
                    let (position, rotation_unc) = params
                        .view
                        .apply(view.position, self.odometry_uncertainty_rad);
                    let uncertainty_mm = view.uncertainty_mm + rotation_unc;

                    match self
                        .envelope
                        .locate(position, uncertainty_mm, frame.confidence[disp_idx])
                    {
                        Some(sample) => match scratch.add_sample(&sample) {
                            InsertStatus::Inserted => stats.inserted += 1,
                            InsertStatus::AlreadyExists => stats.merged += 1,
                            InsertStatus::Collision => stats.collisions += 1,
                        },
                        None => stats.out_of_grid += 1,
                    }
                } else {
                    stats.rejected += 1;
                }

                n_px += 1.0;
            }

            y += 1;
            azimuth += params.azim_delta_rad;
        }

        stats
    }
}
