//! Rasterized segment labels.

use super::regions::{BodySegment, SegmentId};
use crate::geometry::Bounds;
use crate::utils::safe_cast::{f64_to_pixel_clamp, u32_to_usize};
use crate::{Error, Result};
use std::ops::Range;

/// Per-pixel segment labels for one frame.
///
/// Pixel `(x, y)` holds the 1-based index into `segments` of the last
/// segment covering it, or 0 for background.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationMask {
    pub width: usize,
    pub height: usize,
    /// Row-major labels
    pub data: Vec<u8>,
    pub segments: Vec<BodySegment>,
}

impl SegmentationMask {
    /// Paint `segments` in order into a `width` x `height` raster
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the raster size overflows `usize`
    pub fn rasterize(width: u32, height: u32, segments: Vec<BodySegment>) -> Result<Self> {
        let w = u32_to_usize(width)?;
        let h = u32_to_usize(height)?;
        let len = w
            .checked_mul(h)
            .ok_or_else(|| Error::InvalidInput(format!("Frame {width}x{height} is too large")))?;

        let mut data = vec![0u8; len];
        for (index, segment) in segments.iter().enumerate() {
            let label = u8::try_from(index + 1)
                .map_err(|_| Error::InvalidInput("Too many segments for an 8-bit mask".to_string()))?;
            let (xs, ys) = pixel_span(&segment.bounds, w, h);
            for y in ys {
                data[y * w + xs.start..y * w + xs.end].fill(label);
            }
        }

        Ok(Self {
            width: w,
            height: h,
            data,
            segments,
        })
    }

    /// Label at `(x, y)`, 0 outside the frame
    #[must_use]
    pub fn label_at(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y * self.width + x]
    }

    /// Segment painted on top at `(x, y)`
    #[must_use]
    pub fn segment_at(&self, x: usize, y: usize) -> Option<&BodySegment> {
        let label = self.label_at(x, y);
        label.checked_sub(1).and_then(|i| self.segments.get(usize::from(i)))
    }

    #[must_use]
    pub fn segment(&self, id: SegmentId) -> Option<&BodySegment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Number of pixels carrying a label
    #[must_use]
    pub fn labelled_pixels(&self) -> usize {
        self.data.iter().filter(|&&l| l != 0).count()
    }
}

/// Pixel columns and rows covered by `bounds` after rounding its edges
#[must_use]
pub fn pixel_span(bounds: &Bounds, width: usize, height: usize) -> (Range<usize>, Range<usize>) {
    let left = f64_to_pixel_clamp(bounds.left, width);
    let right = f64_to_pixel_clamp(bounds.right, width);
    let top = f64_to_pixel_clamp(bounds.top, height);
    let bottom = f64_to_pixel_clamp(bounds.bottom, height);
    (left..right.max(left), top..bottom.max(top))
}
