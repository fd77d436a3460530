//! Segmentation mask and overlay constraint tests

mod test_helpers;

use pose_stabilization::geometry::Bounds;
use pose_stabilization::segmentation::mask::pixel_span;
use pose_stabilization::segmentation::{
    check_overlay_conflicts, get_overlay_constraints, BodySegment, GarmentCategory, SegmentId, SegmentationEngine,
    SegmentationMask,
};
use proptest::prelude::*;
use test_helpers::upright_pose;

#[test]
fn test_upright_pose_yields_all_regions() {
    let mut engine = SegmentationEngine::default();
    let mask = engine.segment(&upright_pose(0.9, 0), 400, 600).unwrap();

    let ids: Vec<SegmentId> = mask.segments.iter().map(|s| s.id).collect();
    assert_eq!(ids, SegmentId::ALL.to_vec());
    assert_eq!((mask.width, mask.height), (400, 600));

    // torso center is covered by the torso (label 2) and nothing after it
    assert_eq!(mask.label_at(200, 225), 2);
    assert_eq!(mask.label_at(5, 5), 0);
    assert!(mask.segments.iter().all(|s| (s.confidence - 0.9).abs() < 1e-12));
}

#[test]
fn test_low_confidence_pose_has_empty_mask() {
    let mut engine = SegmentationEngine::default();
    let mask = engine.segment(&upright_pose(0.4, 0), 400, 600).unwrap();
    assert!(mask.segments.is_empty());
    assert_eq!(mask.labelled_pixels(), 0);
}

#[test]
fn test_cache_evicts_oldest_first() {
    let mut engine = SegmentationEngine::new(3);
    for ts in 0..3 {
        engine.segment(&upright_pose(0.9, ts), 100, 100).unwrap();
    }
    engine.segment(&upright_pose(0.9, 3), 100, 100).unwrap();
    assert_eq!(engine.cache_len(), 3);

    // ts 1..=3 are cached, re-segmenting them does not grow the cache
    for ts in 1..=3 {
        engine.segment(&upright_pose(0.9, ts), 100, 100).unwrap();
    }
    assert_eq!(engine.cache_len(), 3);
}

#[test]
fn test_bottoms_over_arms_conflict() {
    let mut engine = SegmentationEngine::default();
    let mask = engine.segment(&upright_pose(0.9, 0), 400, 600).unwrap();

    let constraints = get_overlay_constraints(mask, GarmentCategory::Bottoms);
    assert_eq!(constraints.safe_zones.len(), 2);
    assert_eq!(constraints.anchor_points.len(), 1);

    let torso = mask.segment(SegmentId::Torso).unwrap().bounds;
    let overlay = Bounds::new(120.0, 200.0, 280.0, 480.0);
    let report = check_overlay_conflicts(&overlay, mask, GarmentCategory::Bottoms);
    assert!(report.has_conflicts);
    assert!(report.overlap_percentage > 0.0);
    let adjustment = report.recommended_adjustment.unwrap();
    assert!((overlay.center().y + adjustment.y - torso.bottom).abs() < 1e-9);
}

fn segment(id: SegmentId, bounds: Bounds) -> BodySegment {
    BodySegment {
        id,
        name: id.name(),
        landmarks: id.landmarks().to_vec(),
        bounds,
        confidence: 1.0,
        area: bounds.area(),
    }
}

fn bounds_strategy() -> impl Strategy<Value = Bounds> {
    (-10.0..70.0f64, -10.0..70.0f64, 0.0..40.0f64, 0.0..40.0f64)
        .prop_map(|(left, top, w, h)| Bounds::new(left, top, left + w, top + h))
}

proptest! {
    #[test]
    fn prop_mask_labels_follow_painter_order(boxes in prop::collection::vec(bounds_strategy(), 0..6)) {
        let (width, height) = (64usize, 48usize);
        let segments: Vec<BodySegment> = boxes
            .iter()
            .zip(SegmentId::ALL)
            .map(|(b, id)| segment(id, *b))
            .collect();
        let mask = SegmentationMask::rasterize(64, 48, segments.clone()).unwrap();

        for y in 0..height {
            for x in 0..width {
                let expected = segments
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| {
                        let (xs, ys) = pixel_span(&s.bounds, width, height);
                        xs.contains(&x) && ys.contains(&y)
                    })
                    .map(|(i, _)| i + 1)
                    .last()
                    .unwrap_or(0);
                prop_assert_eq!(usize::from(mask.label_at(x, y)), expected);
            }
        }
    }
}
