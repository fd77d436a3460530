use crate::pose::{LandmarkId, Pose};

/// Snap every landmark of `pose` that moved less than `threshold` from
/// `previous` back onto its previous position. Confidence is untouched.
///
/// Returns the number of landmarks that were snapped.
pub fn suppress_jitter(pose: &mut Pose, previous: &Pose, threshold: f64) -> usize {
    let mut snapped = 0;
    for id in LandmarkId::ALL {
        let prev = previous.landmark(id);
        let current = pose.landmark_mut(id);
        if current.distance(prev) < threshold {
            current.x = prev.x;
            current.y = prev.y;
            current.z = prev.z;
            snapped += 1;
        }
    }
    snapped
}
