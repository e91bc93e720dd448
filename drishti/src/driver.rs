//! Grid-cell driver.
//!
//! The region of interest is split into a `grid_width x grid_height` layout of
//! cells. Cells are processed in row-major order; each one resets the
//! scratch table, projects its pixels and merges the scratch into the output
//! buffer. The last column and row stretch (or shrink) to end exactly at the
//! inclusive ROI bound.
//!
//! With the `parallel` feature, cells are projected concurrently with a
//! private scratch table each, and all scratches are merged afterwards in
//! row-major order. The result is identical to the sequential path.

use serde::{Deserialize, Serialize};

use crate::core::{ExactTrig, FrameError, FrameView, PolynomialTrig, StereoFrame, Trig, TrigMode};
use crate::grid::GridEnvelope;
use crate::projection::{
    CameraModel, CameraProjector, CellContext, CellProjectionParams, CellStats, ConicalProjector,
    CylindricalProjector, UncertaintyModel,
};
use crate::voxel::{DEFAULT_BUFFER_CAPACITY, MergeOutcome, VoxelBuffer, VoxelScratch};

/// Inclusive pixel bounds of the region of interest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    /// First column
    pub min_x: i32,
    /// First row
    pub min_y: i32,
    /// Last column (inclusive)
    pub max_x: i32,
    /// Last row (inclusive)
    pub max_y: i32,
}

impl Roi {
    /// Create from inclusive bounds.
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

/// Cell layout over the region of interest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellGrid {
    /// Region of interest
    pub roi: Roi,
    /// Cells per row
    pub grid_width: i32,
    /// Cell rows
    pub grid_height: i32,
    /// Nominal cell width (px)
    pub cell_width: i32,
    /// Nominal cell height (px)
    pub cell_height: i32,
    /// Azimuth of image row 0 (rad)
    pub start_azimuth_rad: f32,
}

/// One cell to process.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellWindow {
    /// Row-major cell index
    pub index: i32,
    /// First column
    pub start_x: i32,
    /// First row
    pub start_y: i32,
    /// Columns (zero or negative means empty)
    pub width: i32,
    /// Rows (zero or negative means empty)
    pub height: i32,
    /// Azimuth of the first row (rad)
    pub azimuth_rad: f32,
}

impl CellWindow {
    /// Whether the window covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl CellGrid {
    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        (self.grid_width.max(0) as usize) * (self.grid_height.max(0) as usize)
    }

    /// Window of cell `(i, j)` (column, row).
    pub fn window(&self, i: i32, j: i32, azim_delta_rad: f32) -> CellWindow {
        let start_y = (j * self.cell_height) + self.roi.min_y;
        let start_x = (i * self.cell_width) + self.roi.min_x;
        let height = if j == self.grid_height - 1 {
            (self.roi.max_y + 1) - start_y
        } else {
            self.cell_height
        };
        let width = if i == self.grid_width - 1 {
            (self.roi.max_x + 1) - start_x
        } else {
            self.cell_width
        };

        CellWindow {
            index: (j * self.grid_width) + i,
            start_x,
            start_y,
            width,
            height,
            // Azimuth is mapped to the image row
            azimuth_rad: self.start_azimuth_rad + (start_y as f32 * azim_delta_rad),
        }
    }

    /// All windows in row-major order.
    pub fn windows(&self, azim_delta_rad: f32) -> impl Iterator<Item = CellWindow> + '_ {
        (0..self.grid_height.max(0))
            .flat_map(move |j| (0..self.grid_width.max(0)).map(move |i| (i, j)))
            .map(move |(i, j)| self.window(i, j, azim_delta_rad))
    }

    /// Check that every window stays inside the frame arrays.
    ///
    /// Run once per invocation so the pixel loop can index without checks.
    pub fn validate(&self, params: &CellProjectionParams, frame: &FrameView) -> Result<(), FrameError> {
        if self.grid_width < 0 || self.grid_height < 0 {
            return Err(FrameError::InvalidLayout(format!(
                "negative grid size {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if self.cell_width < 0 || self.cell_height < 0 {
            return Err(FrameError::InvalidLayout(format!(
                "negative cell size {}x{}",
                self.cell_width, self.cell_height
            )));
        }
        if self.roi.min_x < 0 || self.roi.min_y < 0 {
            return Err(FrameError::InvalidLayout(format!(
                "ROI starts at negative pixel ({}, {})",
                self.roi.min_x, self.roi.min_y
            )));
        }
        if params.lut_shift_x >= usize::BITS || params.lut_shift_y >= usize::BITS {
            return Err(FrameError::InvalidLayout(format!(
                "LUT shift ({}, {}) out of range",
                params.lut_shift_x, params.lut_shift_y
            )));
        }

        for window in self.windows(params.azim_delta_rad) {
            if window.is_empty() {
                continue;
            }
            let last_x = (window.start_x + window.width - 1) as i64;
            let last_y = (window.start_y + window.height - 1) as i64;

            let pixel = last_y * params.img_width as i64 + last_x;
            if pixel >= frame.pixel_count() as i64 {
                return Err(FrameError::PixelOutOfRange {
                    cell: window.index,
                    index: pixel,
                    len: frame.pixel_count(),
                });
            }

            let lut = (last_y >> params.lut_shift_y) * params.lut_width as i64
                + (last_x >> params.lut_shift_x);
            if lut >= frame.lut.len() as i64 {
                return Err(FrameError::LutOutOfRange {
                    cell: window.index,
                    index: lut,
                    len: frame.lut.len(),
                });
            }
        }
        Ok(())
    }
}

/// Run-time choices for one invocation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelizeOptions {
    /// Camera model
    pub camera_model: CameraModel,
    /// Trigonometry implementation
    pub trig: TrigMode,
    /// Error model
    pub uncertainty: UncertaintyModel,
    /// Output buffer capacity
    pub buffer_capacity: usize,
    /// Process cells on the rayon pool (needs the `parallel` feature)
    pub parallel: bool,
}

impl Default for VoxelizeOptions {
    fn default() -> Self {
        Self {
            camera_model: CameraModel::default(),
            trig: TrigMode::default(),
            uncertainty: UncertaintyModel::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            parallel: cfg!(feature = "parallel"),
        }
    }
}

/// Counters of one invocation.
///
/// Diagnostic only: the drop policies do not depend on them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoxelizeReport {
    /// Cells processed
    pub cells: usize,
    /// Pixel level counters summed over all cells
    pub pixels: CellStats,
    /// Cell batches appended to the buffer
    pub batches_merged: usize,
    /// Cell batches discarded for lack of capacity
    pub batches_dropped: usize,
    /// Voxels appended
    pub voxels_merged: usize,
    /// Voxels lost with dropped batches
    pub voxels_dropped: usize,
}

impl VoxelizeReport {
    /// Account for one finished cell.
    pub fn record_cell(&mut self, stats: &CellStats, outcome: MergeOutcome) {
        self.cells += 1;
        self.pixels.merge(stats);
        match outcome {
            MergeOutcome::Merged(n) => {
                self.batches_merged += 1;
                self.voxels_merged += n;
            }
            MergeOutcome::Dropped(n) => {
                self.batches_dropped += 1;
                self.voxels_dropped += n;
            }
        }
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: &VoxelizeReport) {
        self.cells += other.cells;
        self.pixels.merge(&other.pixels);
        self.batches_merged += other.batches_merged;
        self.batches_dropped += other.batches_dropped;
        self.voxels_merged += other.voxels_merged;
        self.voxels_dropped += other.voxels_dropped;
    }
}

/// Buffer and counters produced by [`voxelize`].
#[derive(Clone, Debug)]
pub struct VoxelizeOutput {
    /// Merged voxel entries
    pub buffer: VoxelBuffer,
    /// Invocation counters
    pub report: VoxelizeReport,
}

/// Voxelize one frame.
///
/// Selects the camera model and trigonometry from `options`, validates the
/// cell layout against the frame and runs all cells.
pub fn voxelize(
    frame: &StereoFrame,
    params: &CellProjectionParams,
    grid: &CellGrid,
    envelope: &GridEnvelope,
    options: &VoxelizeOptions,
) -> Result<VoxelizeOutput, FrameError> {
    let view = frame.view()?;
    let mut buffer = VoxelBuffer::with_capacity(options.buffer_capacity);
    let model = &options.uncertainty;

    let report = match options.camera_model {
        CameraModel::Cylindrical => {
            let projector = CylindricalProjector::new(params, model);
            run_with_trig(projector, options, params, view, envelope, grid, &mut buffer)?
        }
        CameraModel::Conical => {
            let projector = ConicalProjector::new(params, model);
            run_with_trig(projector, options, params, view, envelope, grid, &mut buffer)?
        }
    };

    log::debug!(
        "{} cells ({}), {} pixels, {} rejected, {} out of grid, {} collisions, {} voxels, {} batches dropped",
        report.cells,
        options.camera_model,
        report.pixels.pixels,
        report.pixels.rejected,
        report.pixels.out_of_grid,
        report.pixels.collisions,
        buffer.len(),
        report.batches_dropped
    );

    Ok(VoxelizeOutput { buffer, report })
}

fn run_with_trig<P: CameraProjector>(
    projector: P,
    options: &VoxelizeOptions,
    params: &CellProjectionParams,
    view: FrameView<'_>,
    envelope: &GridEnvelope,
    grid: &CellGrid,
    buffer: &mut VoxelBuffer,
) -> Result<VoxelizeReport, FrameError> {
    let model = &options.uncertainty;
    match options.trig {
        TrigMode::Polynomial => {
            let ctx = CellContext::new(projector, PolynomialTrig, params, view, envelope, model);
            run(&ctx, grid, buffer, options.parallel)
        }
        TrigMode::Exact => {
            let ctx = CellContext::new(projector, ExactTrig, params, view, envelope, model);
            run(&ctx, grid, buffer, options.parallel)
        }
    }
}

fn run<P: CameraProjector, T: Trig>(
    ctx: &CellContext<'_, P, T>,
    grid: &CellGrid,
    buffer: &mut VoxelBuffer,
    parallel: bool,
) -> Result<VoxelizeReport, FrameError> {
    #[cfg(feature = "parallel")]
    if parallel {
        return voxelize_cells_parallel(ctx, grid, buffer);
    }
    #[cfg(not(feature = "parallel"))]
    if parallel {
        log::warn!("built without the parallel feature, processing cells sequentially");
    }
    voxelize_cells(ctx, grid, buffer)
}

/// Process all cells sequentially with one reused scratch table.
pub fn voxelize_cells<P: CameraProjector, T: Trig>(
    ctx: &CellContext<'_, P, T>,
    grid: &CellGrid,
    buffer: &mut VoxelBuffer,
) -> Result<VoxelizeReport, FrameError> {
    grid.validate(ctx.params, &ctx.frame)?;

    let mut report = VoxelizeReport::default();
    let mut scratch = VoxelScratch::new();
    for window in grid.windows(ctx.params.azim_delta_rad) {
        scratch.reset();
        let stats = ctx.fill_cell(&window, &mut scratch);
        report.record_cell(&stats, buffer.merge_scratch(&scratch));
    }
    Ok(report)
}

/// Process cells on the rayon pool, then merge in row-major order.
#[cfg(feature = "parallel")]
pub fn voxelize_cells_parallel<P: CameraProjector, T: Trig>(
    ctx: &CellContext<'_, P, T>,
    grid: &CellGrid,
    buffer: &mut VoxelBuffer,
) -> Result<VoxelizeReport, FrameError> {
    use rayon::prelude::*;

    grid.validate(ctx.params, &ctx.frame)?;

    let windows: Vec<CellWindow> = grid.windows(ctx.params.azim_delta_rad).collect();
    let cells: Vec<(CellStats, VoxelScratch)> = windows
        .par_iter()
        .map(|window| {
            let mut scratch = VoxelScratch::new();
            let stats = ctx.fill_cell(window, &mut scratch);
            (stats, scratch)
        })
        .collect();

    let mut report = VoxelizeReport::default();
    for (stats, scratch) in &cells {
        report.record_cell(stats, buffer.merge_scratch(scratch));
    }
    Ok(report)
}
