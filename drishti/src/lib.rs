//! # Drishti
//!
//! Stereo disparity voxelization: turns one rectified disparity frame into a
//! sparse, deduplicated set of voxel samples in vehicle coordinates.
//!
//! ## Overview
//!
//! Each invocation takes a disparity map, a per-pixel confidence byte, a
//! downsampled structure/scaling LUT and a parameter block, and produces a
//! [`VoxelBuffer`]:
//!
//! - **Cell grid**: the region of interest is split into cells processed in
//!   row-major order
//! - **Projection**: every accepted pixel becomes a 3D point with the
//!   cylindrical or conical camera model, plus an uncertainty estimate
//! - **Voxel mapping**: points inside the grid envelope get a voxel
//!   coordinate and millimetre offsets from the voxel corner
//! - **Scratch table**: a 20-entry hash per cell merges samples that land in
//!   the same voxel
//! - **Output buffer**: each cell's scratch is appended to the buffer as a
//!   whole, or dropped as a whole when it does not fit
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use drishti::{load_dump, voxelize, VoxelizeOptions};
//!
//! let dump = load_dump(Path::new("dump/"))?;
//! let p = &dump.params;
//! let output = voxelize(&dump.frame, &p.projection, &p.grid, &p.envelope,
//!                       &VoxelizeOptions::default())?;
//!
//! println!("{} voxels", output.buffer.len());
//! ```
//!
//! ## Coordinate System
//!
//! Voxel X grows from `x_max` towards `x_min`, Y from `y_max` towards
//! `y_min`, and Z from `z_min` upwards. Keys pack `x << 16 | y << 8 | z`.

#![warn(missing_docs)]

// Core types, trigonometry and frame input
pub mod core;

// Grid envelope and point-to-voxel mapping
pub mod grid;

// Scratch hash table and output buffer
pub mod voxel;

// Camera models and the per-cell pixel loop
pub mod projection;

// Cell layout and invocation driver
pub mod driver;

// YAML configuration
pub mod config;

// Dump and points files
pub mod io;

// Re-export commonly used types
pub use core::{
    FrameError, FrameView, LutMeta, Mat3f, StereoFrame, TrigMode, Vec3f, VoxelCoord, VoxelKey,
    VoxelPoint,
};

pub use grid::{EnvelopeError, GridEnvelope, VoxelSample};

pub use voxel::{FinalVoxel, InsertStatus, MergeOutcome, VoxelBuffer, VoxelScratch};

pub use projection::{CameraModel, CellProjectionParams, UncertaintyModel, ViewTransform};

pub use driver::{
    CellGrid, CellWindow, Roi, VoxelizeOptions, VoxelizeOutput, VoxelizeReport, voxelize,
};

pub use config::{ConfigLoadError, DrishtiConfig};

pub use io::{Dump, DumpError, DumpParams, load_dump, save_dump, save_points};
