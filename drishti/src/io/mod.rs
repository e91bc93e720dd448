//! File I/O: frame dumps in, voxel points out.

mod dump;
mod error;
mod points;

pub use dump::{
    CONFIDENCE_FILE, DISPARITY_FILE, Dump, DumpParams, LUT_FILE, PARAMS_BLOCK_SIZE, PARAMS_FILE,
    load_dump, save_dump,
};
pub use error::DumpError;
pub use points::{load_points, read_points, save_points, write_points};
