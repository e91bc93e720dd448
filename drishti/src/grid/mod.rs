//! Voxel grid geometry.
//!
//! The grid itself is never materialised; only its envelope is needed to
//! turn vehicle-frame points into packed voxel coordinates.

mod envelope;

pub use envelope::{EnvelopeError, GridEnvelope, MAX_EXTENT_MM, VoxelSample};
