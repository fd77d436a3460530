//! Body-region bounding boxes derived from a pose.

use crate::constants::{EPSILON, MIN_LIMB_PADDING, SEGMENT_MIN_CONFIDENCE, VALID_LANDMARK_CONFIDENCE};
use crate::geometry::Bounds;
use crate::pose::{LandmarkId, Pose};
use serde::Serialize;
use std::fmt;

const HEAD_WIDTH_FACTOR: f64 = 1.2;
const HEAD_ASPECT: f64 = 1.1;
/// Share of the head box that lies above the nose
const HEAD_ABOVE_NOSE: f64 = 0.75;
const TORSO_MARGIN: f64 = 0.1;
const ARM_PADDING: f64 = 0.3;
const LEG_PADDING: f64 = 0.4;

/// Named body regions, in rasterization order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentId {
    Head,
    Torso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl SegmentId {
    pub const ALL: [SegmentId; 6] = [
        Self::Head,
        Self::Torso,
        Self::LeftArm,
        Self::RightArm,
        Self::LeftLeg,
        Self::RightLeg,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Torso => "torso",
            Self::LeftArm => "left_arm",
            Self::RightArm => "right_arm",
            Self::LeftLeg => "left_leg",
            Self::RightLeg => "right_leg",
        }
    }

    /// Landmarks the region is built from
    #[must_use]
    pub fn landmarks(self) -> &'static [LandmarkId] {
        use LandmarkId::*;
        match self {
            Self::Head => &[LeftEar, RightEar, Nose],
            Self::Torso => &[LeftShoulder, RightShoulder, LeftHip, RightHip],
            Self::LeftArm => &[LeftShoulder, LeftElbow, LeftWrist],
            Self::RightArm => &[RightShoulder, RightElbow, RightWrist],
            Self::LeftLeg => &[LeftHip, LeftKnee, LeftAnkle],
            Self::RightLeg => &[RightHip, RightKnee, RightAnkle],
        }
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One body region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodySegment {
    pub id: SegmentId,
    pub name: &'static str,
    /// Landmarks that contributed to the bounds
    pub landmarks: Vec<LandmarkId>,
    pub bounds: Bounds,
    /// Mean confidence of the contributing landmarks
    pub confidence: f64,
    pub area: f64,
}

impl BodySegment {
    fn new(id: SegmentId, landmarks: Vec<LandmarkId>, bounds: Bounds, pose: &Pose) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let confidence = landmarks.iter().map(|l| pose.landmark(*l).confidence).sum::<f64>()
            / landmarks.len().max(1) as f64;
        Self {
            id,
            name: id.name(),
            landmarks,
            bounds,
            confidence,
            area: bounds.area(),
        }
    }
}

fn confident(pose: &Pose, ids: &[LandmarkId]) -> bool {
    ids.iter().all(|id| pose.landmark(*id).confidence >= SEGMENT_MIN_CONFIDENCE)
}

/// Regions of `pose` inside a `width` x `height` frame. Regions whose
/// anchor landmarks are not confident, or that fall entirely outside the
/// frame, are omitted.
#[must_use]
pub fn build_segments(pose: &Pose, width: u32, height: u32) -> Vec<BodySegment> {
    let (w, h) = (f64::from(width), f64::from(height));
    SegmentId::ALL
        .into_iter()
        .filter_map(|id| build_segment(pose, id))
        .filter_map(|mut segment| {
            segment.bounds = segment.bounds.clamp_to_frame(w, h);
            segment.area = segment.bounds.area();
            (segment.area > 0.0).then_some(segment)
        })
        .collect()
}

/// Unclamped region `id` of `pose`
#[must_use]
pub fn build_segment(pose: &Pose, id: SegmentId) -> Option<BodySegment> {
    match id {
        SegmentId::Head => head_segment(pose),
        SegmentId::Torso => torso_segment(pose),
        SegmentId::LeftArm | SegmentId::RightArm => limb_segment(pose, id, ARM_PADDING),
        SegmentId::LeftLeg | SegmentId::RightLeg => limb_segment(pose, id, LEG_PADDING),
    }
}

fn head_segment(pose: &Pose) -> Option<BodySegment> {
    let ids = SegmentId::Head.landmarks();
    if !confident(pose, ids) {
        return None;
    }
    let left = pose.landmark(LandmarkId::LeftEar);
    let right = pose.landmark(LandmarkId::RightEar);
    let ear_distance = left.distance(right);
    if ear_distance <= EPSILON {
        return None;
    }

    let width = HEAD_WIDTH_FACTOR * ear_distance;
    let height = HEAD_ASPECT * width;
    let center_x = pose.midpoint(LandmarkId::LeftEar, LandmarkId::RightEar).x;
    let nose_y = pose.landmark(LandmarkId::Nose).y;
    let top = nose_y - HEAD_ABOVE_NOSE * height;
    let bounds = Bounds::new(center_x - width / 2.0, top, center_x + width / 2.0, top + height);

    Some(BodySegment::new(SegmentId::Head, ids.to_vec(), bounds, pose))
}

fn torso_segment(pose: &Pose) -> Option<BodySegment> {
    let ids = SegmentId::Torso.landmarks();
    if !confident(pose, ids) {
        return None;
    }
    let core = Bounds::enclosing(ids.iter().map(|id| pose.landmark(*id).point()))?;
    let bounds = core.expand(core.width() * TORSO_MARGIN, core.height() * TORSO_MARGIN);
    Some(BodySegment::new(SegmentId::Torso, ids.to_vec(), bounds, pose))
}

/// Arm or leg: the root joint must be confident, the other joints join
/// the box when visible. Padding scales with the root-to-tip x-span.
fn limb_segment(pose: &Pose, id: SegmentId, padding: f64) -> Option<BodySegment> {
    let ids = id.landmarks();
    let (root, tip) = (ids[0], ids[2]);
    if !confident(pose, &[root]) {
        return None;
    }

    let included: Vec<LandmarkId> = ids
        .iter()
        .copied()
        .filter(|l| pose.landmark(*l).is_visible(VALID_LANDMARK_CONFIDENCE))
        .collect();
    if included.len() < 2 {
        return None;
    }

    let core = Bounds::enclosing(included.iter().map(|l| pose.landmark(*l).point()))?;
    let span = if included.contains(&tip) {
        pose.horizontal_span(root, tip)
    } else {
        core.width()
    };
    let pad = (span * padding).max(MIN_LIMB_PADDING);

    Some(BodySegment::new(id, included, core.expand(pad, pad), pose))
}
