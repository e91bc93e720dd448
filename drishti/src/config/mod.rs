//! Configuration loading for Drishti.
//!
//! Loads all configuration from a single YAML file; every field has a
//! default, so a missing file or section falls back to the built-in values.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use drishti::config::DrishtiConfig;
//!
//! // Load from default path (configs/drishti.yaml)
//! let config = DrishtiConfig::load_default()?;
//!
//! // Convert to run-time options
//! let options = config.to_voxelize_options();
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`PipelineSection`] | Camera model, trigonometry, parallelism |
//! | [`UncertaintySection`] | Error model constants |
//! | [`BufferSection`] | Output buffer capacity |
//! | [`OutputSection`] | Points file path |
//!
//! ## Example YAML
//!
//! ```yaml
//! pipeline:
//!   camera_model: cylindrical   # or conical
//!   trig: polynomial            # or exact
//!   parallel: true
//!
//! uncertainty:
//!   stereo_pixel_uncertainty: 4.0
//!   scaling_ratio: 0.015625     # 1/64
//!   odometry_uncertainty_rad: 0.02
//!
//! buffer:
//!   capacity: 20000
//!
//! output:
//!   points_path: points.txt
//! ```

mod defaults;
mod drishti;
mod error;
mod output;
mod pipeline;
mod uncertainty;

// Re-export main types
pub use drishti::DrishtiConfig;
pub use error::ConfigLoadError;

// Re-export section types
pub use output::{BufferSection, OutputSection};
pub use pipeline::PipelineSection;
pub use uncertainty::UncertaintySection;
