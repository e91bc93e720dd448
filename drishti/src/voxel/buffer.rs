//! Invocation-wide voxel output buffer.

use serde::{Deserialize, Serialize};

use super::scratch::VoxelScratch;
use crate::core::{Vec3f, VoxelCoord, VoxelKey, VoxelPoint};
use crate::grid::GridEnvelope;

/// Default number of entries the output buffer accepts.
pub const DEFAULT_BUFFER_CAPACITY: usize = 20_000;

/// Result of merging one cell's scratch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// All entries were appended.
    Merged(usize),
    /// The batch did not fit and was discarded in full.
    Dropped(usize),
}

impl MergeOutcome {
    /// Whether the batch was kept.
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged(_))
    }
}

/// Capacity-bounded output of one invocation.
///
/// Points, keys and counts are parallel arrays in insertion order. Points
/// hold offset sums; see [`finalized`](Self::finalized) for averaged values.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelBuffer {
    points: Vec<VoxelPoint>,
    keys: Vec<u32>,
    counts: Vec<u8>,
    capacity: usize,
}

impl Default for VoxelBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }
}

impl VoxelBuffer {
    /// Create an empty buffer holding at most `capacity` entries.
    ///
    /// Storage is reserved up front so merging never reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            keys: Vec::with_capacity(capacity),
            counts: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when nothing has been merged.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Free entries left.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// Whether a batch of `n` entries would be rejected.
    ///
    /// The check is strict: a batch that exactly fills the buffer is rejected
    /// too, so one entry of capacity always stays unused.
    pub fn would_overflow(&self, n: usize) -> bool {
        self.len() + n >= self.capacity
    }

    /// Stored points (offset sums).
    pub fn points(&self) -> &[VoxelPoint] {
        &self.points
    }

    /// Packed voxel keys.
    pub fn keys(&self) -> &[u32] {
        &self.keys
    }

    /// Samples accumulated per entry.
    pub fn counts(&self) -> &[u8] {
        &self.counts
    }

    /// Drop all entries, keeping the capacity.
    pub fn clear(&mut self) {
        self.points.clear();
        self.keys.clear();
        self.counts.clear();
    }

    /// Append a cell's scratch entries, all or nothing.
    pub fn merge_scratch(&mut self, scratch: &VoxelScratch) -> MergeOutcome {
        let n = scratch.len();
        if self.would_overflow(n) {
            log::debug!(
                "dropping batch of {} voxels ({} of {} used)",
                n,
                self.len(),
                self.capacity
            );
            return MergeOutcome::Dropped(n);
        }

        self.points.extend_from_slice(scratch.points());
        self.keys.extend_from_slice(scratch.keys());
        self.counts.extend_from_slice(scratch.counts());
        MergeOutcome::Merged(n)
    }

    /// Averaged view of every entry.
    pub fn finalized(&self) -> impl Iterator<Item = FinalVoxel> + '_ {
        self.points
            .iter()
            .zip(&self.keys)
            .zip(&self.counts)
            .map(|((point, &key), &count)| FinalVoxel::from_entry(point, VoxelKey(key), count))
    }
}

/// Averaged voxel entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalVoxel {
    /// Decoded grid coordinate
    pub coord: VoxelCoord,
    /// Mean sub-voxel offset in mm
    pub mean_offset_mm: Vec3f,
    /// Smallest uncertainty of the merged samples (cm)
    pub uncertainty_cm: u8,
    /// Highest confidence of the merged samples
    pub existence: u8,
    /// Number of merged samples
    pub samples: u16,
}

impl FinalVoxel {
    fn from_entry(point: &VoxelPoint, key: VoxelKey, count: u8) -> Self {
        // A count of zero means the u8 counter wrapped after 256 samples
        let samples = if count == 0 { 256 } else { count as u16 };
        let n = samples as f32;
        Self {
            coord: key.coord(),
            mean_offset_mm: Vec3f::new(
                point.x_mm as f32 / n,
                point.y_mm as f32 / n,
                point.z_mm as f32 / n,
            ),
            uncertainty_cm: point.uncertainty_cm,
            existence: point.existence,
            samples,
        }
    }

    /// Mean position in vehicle millimetres.
    pub fn vehicle_position_mm(&self, envelope: &GridEnvelope) -> Vec3f {
        let corner = envelope.voxel_corner_mm(self.coord);
        Vec3f::new(
            corner.x - self.mean_offset_mm.x,
            corner.y - self.mean_offset_mm.y,
            corner.z + self.mean_offset_mm.z,
        )
    }
}
