//! Buffer and output configuration sections.

use serde::{Deserialize, Serialize};

use crate::voxel::DEFAULT_BUFFER_CAPACITY;

use super::defaults;

/// Output buffer settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BufferSection {
    /// Maximum voxel entries per invocation
    #[serde(default = "defaults::buffer_capacity")]
    pub capacity: usize,
}

impl Default for BufferSection {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Output settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputSection {
    /// Plain-text points file written by the CLI
    #[serde(default = "defaults::points_path")]
    pub points_path: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            points_path: "points.txt".to_string(),
        }
    }
}
