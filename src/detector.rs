//! Boundary with the external landmark detector.

use crate::pose::RawPose;

/// A landmark detector run once per accepted frame.
///
/// Implementations may return partial or noisy output; the pipeline
/// tolerates low or garbage confidences. `F` is the frame type delivered
/// by the frame source.
pub trait PoseDetector<F: ?Sized> {
    /// Detect a pose in `frame`, `None` when no person was found
    fn detect(&mut self, frame: &F, width: u32, height: u32) -> Option<RawPose>;
}

impl<F, T> PoseDetector<F> for T
where
    F: ?Sized,
    T: FnMut(&F, u32, u32) -> Option<RawPose>,
{
    fn detect(&mut self, frame: &F, width: u32, height: u32) -> Option<RawPose> {
        self(frame, width, height)
    }
}
