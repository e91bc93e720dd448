//! Stereo frame input (disparity, confidence, LUT) and bounds validation.

use thiserror::Error;

use super::types::LutMeta;

/// Errors raised when a frame cannot be processed with the given layout.
///
/// All of these are detected before the pixel loop starts so the inner loop
/// never indexes out of range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Disparity pointer offset lies past the end of the arrays.
    #[error("disparity offset {offset} exceeds image data ({len} samples)")]
    OffsetOutOfRange {
        /// Requested offset
        offset: usize,
        /// Available samples
        len: usize,
    },

    /// A cell reads a pixel outside the disparity or confidence array.
    #[error("cell {cell} reads pixel index {index}, but only {len} samples are available")]
    PixelOutOfRange {
        /// Cell index
        cell: i32,
        /// Largest pixel index (relative to the disparity offset)
        index: i64,
        /// Available samples after the offset
        len: usize,
    },

    /// A cell reads a LUT entry outside the LUT array.
    #[error("cell {cell} reads LUT index {index}, but the LUT has {len} entries")]
    LutOutOfRange {
        /// Cell index
        cell: i32,
        /// Largest LUT index
        index: i64,
        /// LUT length
        len: usize,
    },

    /// Grid or image layout is unusable (negative sizes, shifts, coordinates).
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

/// One stereo frame as delivered by the disparity stage.
///
/// Disparity and confidence share the same indexing
/// (`disp_offset + y * img_width + x`); the LUT is indexed without the offset.
#[derive(Clone, Debug, Default)]
pub struct StereoFrame {
    /// Image width in pixels (informational, strides come from the cell parameters)
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Disparity samples
    pub disparity: Vec<u16>,
    /// Confidence per disparity sample
    pub confidence: Vec<u8>,
    /// Downsampled structure/scaling table
    pub lut: Vec<LutMeta>,
    /// Start of the region of interest inside `disparity` / `confidence`
    pub disp_offset: usize,
}

impl StereoFrame {
    /// Create a frame without a disparity offset.
    pub fn new(
        width: usize,
        height: usize,
        disparity: Vec<u16>,
        confidence: Vec<u8>,
        lut: Vec<LutMeta>,
    ) -> Self {
        Self {
            width,
            height,
            disparity,
            confidence,
            lut,
            disp_offset: 0,
        }
    }

    /// Set the disparity offset.
    pub fn with_disp_offset(mut self, disp_offset: usize) -> Self {
        self.disp_offset = disp_offset;
        self
    }

    /// Borrow the arrays with the disparity offset applied.
    ///
    /// The view's disparity and confidence slices have equal length (the
    /// shorter of the two arrays decides).
    pub fn view(&self) -> Result<FrameView<'_>, FrameError> {
        let len = self.disparity.len().min(self.confidence.len());
        if self.disp_offset > len {
            return Err(FrameError::OffsetOutOfRange {
                offset: self.disp_offset,
                len,
            });
        }
        Ok(FrameView {
            disparity: &self.disparity[self.disp_offset..len],
            confidence: &self.confidence[self.disp_offset..len],
            lut: &self.lut,
        })
    }
}

/// Borrowed frame data, offset already applied.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    /// Disparity samples starting at the region of interest
    pub disparity: &'a [u16],
    /// Confidence samples, same indexing as `disparity`
    pub confidence: &'a [u8],
    /// LUT entries
    pub lut: &'a [LutMeta],
}

impl<'a> FrameView<'a> {
    /// Build a view directly from slices.
    pub fn new(disparity: &'a [u16], confidence: &'a [u8], lut: &'a [LutMeta]) -> Self {
        let len = disparity.len().min(confidence.len());
        Self {
            disparity: &disparity[..len],
            confidence: &confidence[..len],
            lut,
        }
    }

    /// Number of addressable pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.disparity.len()
    }
}
