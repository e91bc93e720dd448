//! Voxel accumulation: per-cell scratch table and invocation output buffer.

mod buffer;
mod scratch;

pub use buffer::{DEFAULT_BUFFER_CAPACITY, FinalVoxel, MergeOutcome, VoxelBuffer};
pub use scratch::{HASH_SLOTS, InsertStatus, SCRATCH_CAPACITY, VoxelScratch};
