//! Per-cell deduplication table.
//!
//! A grid cell covers few enough pixels that at most [`SCRATCH_CAPACITY`]
//! distinct voxels are expected. Keys are hashed into a 256-slot index table
//! with Fibonacci multiplicative hashing; on a slot clash the running product
//! is multiplied by the constant again rather than probing linearly. The probe
//! sequence is part of the output contract (entry order and drops depend on
//! it) and must stay bit-for-bit stable.

use crate::core::{VoxelCoord, VoxelKey, VoxelPoint};
use crate::grid::VoxelSample;

/// Maximum distinct voxels per cell.
pub const SCRATCH_CAPACITY: usize = 20;

/// Number of hash slots.
pub const HASH_SLOTS: usize = 256;

/// Marker for an unused hash slot.
const EMPTY_SLOT: u8 = 0xFF;

/// ⌊2^32 / φ⌋
const FIBONACCI_MULTIPLIER: u32 = 2_654_435_769;

/// Hash slot = top 8 bits of the product.
const HASH_SHIFT: u32 = 32 - 8;

/// Probe counter limit; the counter starts at 1 so 11 slots are visited.
const MAX_PROBES: u32 = 12;

/// Result of a scratch insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertStatus {
    /// New entry created.
    Inserted,
    /// Key was already present; the caller merges into the entry.
    AlreadyExists,
    /// No free slot along the probe sequence (or the table is full).
    Collision,
}

/// Fixed-capacity accumulator for one grid cell.
///
/// Entries are stored densely in insertion order; the hash table maps slots
/// to entry indices.
#[derive(Clone, Debug)]
pub struct VoxelScratch {
    points: [VoxelPoint; SCRATCH_CAPACITY],
    keys: [u32; SCRATCH_CAPACITY],
    counts: [u8; SCRATCH_CAPACITY],
    slots: [u8; HASH_SLOTS],
    len: usize,
}

impl Default for VoxelScratch {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelScratch {
    /// Create an empty scratch table.
    pub fn new() -> Self {
        Self {
            points: [VoxelPoint::default(); SCRATCH_CAPACITY],
            keys: [0; SCRATCH_CAPACITY],
            counts: [0; SCRATCH_CAPACITY],
            slots: [EMPTY_SLOT; HASH_SLOTS],
            len: 0,
        }
    }

    /// Forget all entries and mark every slot empty.
    ///
    /// Entry arrays are not cleared; only the first `len` entries are read.
    pub fn reset(&mut self) {
        self.len = 0;
        self.slots.fill(EMPTY_SLOT);
    }

    /// Number of distinct voxels held.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no voxel has been inserted since the last reset.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when no further distinct voxel can be stored.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len >= SCRATCH_CAPACITY
    }

    /// Accumulated points, in insertion order.
    pub fn points(&self) -> &[VoxelPoint] {
        &self.points[..self.len]
    }

    /// Packed keys, parallel to [`points`](Self::points).
    pub fn keys(&self) -> &[u32] {
        &self.keys[..self.len]
    }

    /// Samples merged into each entry, parallel to [`points`](Self::points).
    pub fn counts(&self) -> &[u8] {
        &self.counts[..self.len]
    }

    /// Look up or create the entry for a grid coordinate.
    ///
    /// Returns the status and the entry index. The index is meaningful for
    /// `Inserted` and `AlreadyExists` only.
    ///
    /// A newly inserted entry has its key recorded but its accumulator left
    /// untouched; [`add_sample`](Self::add_sample) initialises it.
    pub fn insert(&mut self, x: i32, y: i32, z: i32) -> (InsertStatus, usize) {
        let key = VoxelKey::pack(x, y, z).raw();

        let mut ak = key.wrapping_mul(FIBONACCI_MULTIPLIER);
        let mut slot;
        let mut entry;
        let mut j = 1;
        loop {
            slot = (ak >> HASH_SHIFT) as usize;
            entry = self.slots[slot];
            if entry == EMPTY_SLOT {
                break;
            }
            if self.keys[entry as usize] == key {
                return (InsertStatus::AlreadyExists, entry as usize);
            }
            ak = ak.wrapping_mul(FIBONACCI_MULTIPLIER);
            j += 1;
            if j >= MAX_PROBES {
                break;
            }
        }

        if entry != EMPTY_SLOT || self.is_full() {
            log::trace!("scratch collision for key {:#010x}", key);
            return (InsertStatus::Collision, entry as usize);
        }

        let index = self.len;
        self.slots[slot] = index as u8;
        self.keys[index] = key;
        self.len = index + 1;
        (InsertStatus::Inserted, index)
    }

    /// Insert a located sample and merge it with an existing entry.
    ///
    /// On merge the offsets are summed with wrapping `i16` arithmetic, the
    /// uncertainty keeps the minimum, the existence keeps the maximum and the
    /// count increments (wrapping at 256). Colliding samples are dropped.
    pub fn add_sample(&mut self, sample: &VoxelSample) -> InsertStatus {
        let VoxelCoord { x, y, z } = sample.coord;
        let (status, index) = self.insert(x, y, z);
        let p = &sample.point;
        match status {
            InsertStatus::Inserted => {
                self.points[index] = *p;
                self.counts[index] = 1;
            }
            InsertStatus::AlreadyExists => {
                let acc = &mut self.points[index];
                acc.x_mm = acc.x_mm.wrapping_add(p.x_mm);
                acc.y_mm = acc.y_mm.wrapping_add(p.y_mm);
                acc.z_mm = acc.z_mm.wrapping_add(p.z_mm);
                acc.uncertainty_cm = acc.uncertainty_cm.min(p.uncertainty_cm);
                acc.existence = acc.existence.max(p.existence);
                self.counts[index] = self.counts[index].wrapping_add(1);
            }
            InsertStatus::Collision => {}
        }
        status
    }
}
