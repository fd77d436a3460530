//! Body segmentation and overlay constraints.
//!
//! Regions (head, torso, arms, legs) are derived from a stabilized pose,
//! rasterized into a label mask and cached per `(timestamp, width, height)`.

/// Rasterized segment labels
pub mod mask;

/// Garment placement guidance
pub mod overlay;

/// Region construction from landmarks
pub mod regions;

use crate::constants::SEGMENTATION_CACHE_SIZE;
use crate::pose::Pose;
use crate::Result;
use std::collections::VecDeque;

pub use mask::SegmentationMask;
pub use overlay::{
    check_overlay_conflicts, get_overlay_constraints, AnchorPoint, ConflictReport, GarmentCategory,
    OverlayConstraints,
};
pub use regions::{BodySegment, SegmentId};

type CacheKey = (u64, u32, u32);

/// Segmentation with a bounded, oldest-evicted-first mask cache
#[derive(Debug, Clone)]
pub struct SegmentationEngine {
    cache: VecDeque<(CacheKey, SegmentationMask)>,
    capacity: usize,
}

impl Default for SegmentationEngine {
    fn default() -> Self {
        Self::new(SEGMENTATION_CACHE_SIZE)
    }
}

impl SegmentationEngine {
    /// Create an engine caching up to `capacity` masks
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Segment `pose` for a `width` x `height` frame, reusing the cached
    /// mask for the same pose timestamp and frame size
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the frame is too large to rasterize
    pub fn segment(&mut self, pose: &Pose, width: u32, height: u32) -> Result<&SegmentationMask> {
        let key = (pose.timestamp_ms, width, height);
        if let Some(index) = self.cache.iter().position(|(k, _)| *k == key) {
            log::debug!("Segmentation cache hit for {} ms ({}x{})", key.0, width, height);
            return Ok(&self.cache[index].1);
        }

        let segments = regions::build_segments(pose, width, height);
        log::debug!("Segmented pose at {} ms into {} regions", key.0, segments.len());
        let mask = SegmentationMask::rasterize(width, height, segments)?;

        while !self.cache.is_empty() && self.cache.len() >= self.capacity {
            self.cache.pop_front();
        }
        self.cache.push_back((key, mask));

        let index = self.cache.len() - 1;
        Ok(&self.cache[index].1)
    }

    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
