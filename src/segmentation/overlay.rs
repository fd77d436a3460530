//! Garment overlay guidance: safe and avoid zones, anchor points and
//! conflict checks against a segmentation mask.

use super::mask::SegmentationMask;
use super::regions::SegmentId;
use crate::geometry::Bounds;
use crate::utils::safe_cast::safe_ratio;
use crate::Error;
use nalgebra::{Point2, Vector2};
use std::fmt;
use std::str::FromStr;

/// Garment families with distinct placement rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GarmentCategory {
    Tops,
    Outerwear,
    Bottoms,
    Dresses,
}

impl GarmentCategory {
    /// Regions the garment may cover
    #[must_use]
    pub fn safe_segments(self) -> &'static [SegmentId] {
        match self {
            Self::Tops | Self::Outerwear => &[SegmentId::Torso, SegmentId::LeftArm, SegmentId::RightArm],
            Self::Bottoms => &[SegmentId::LeftLeg, SegmentId::RightLeg],
            Self::Dresses => &[
                SegmentId::Torso,
                SegmentId::LeftArm,
                SegmentId::RightArm,
                SegmentId::LeftLeg,
                SegmentId::RightLeg,
            ],
        }
    }

    /// Regions the garment must not cover
    #[must_use]
    pub fn avoid_segments(self) -> &'static [SegmentId] {
        match self {
            Self::Tops | Self::Outerwear => &[SegmentId::Head, SegmentId::LeftLeg, SegmentId::RightLeg],
            Self::Bottoms => &[SegmentId::Head, SegmentId::LeftArm, SegmentId::RightArm],
            Self::Dresses => &[SegmentId::Head],
        }
    }
}

impl FromStr for GarmentCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tops" => Ok(Self::Tops),
            "outerwear" => Ok(Self::Outerwear),
            "bottoms" => Ok(Self::Bottoms),
            "dresses" => Ok(Self::Dresses),
            _ => Err(Error::InvalidInput(format!("Unknown garment category: {s}"))),
        }
    }
}

impl fmt::Display for GarmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tops => "tops",
            Self::Outerwear => "outerwear",
            Self::Bottoms => "bottoms",
            Self::Dresses => "dresses",
        };
        f.write_str(name)
    }
}

/// Weighted attachment point for an overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoint {
    pub name: &'static str,
    pub position: Point2<f64>,
    pub weight: f64,
}

/// Placement guidance for one garment category
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConstraints {
    pub category: GarmentCategory,
    pub safe_zones: Vec<Bounds>,
    pub avoid_zones: Vec<Bounds>,
    pub anchor_points: Vec<AnchorPoint>,
}

/// Outcome of [`check_overlay_conflicts`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictReport {
    pub has_conflicts: bool,
    /// Summed intersection area with every avoid zone
    pub total_overlap: f64,
    /// `total_overlap` over the overlay's area; 0 for an empty overlay
    pub overlap_percentage: f64,
    /// Translation of the overlay center onto the nearest anchor
    pub recommended_adjustment: Option<Vector2<f64>>,
}

fn zones(mask: &SegmentationMask, ids: &[SegmentId]) -> Vec<Bounds> {
    mask.segments
        .iter()
        .filter(|s| ids.contains(&s.id))
        .map(|s| s.bounds)
        .collect()
}

fn anchors(mask: &SegmentationMask, category: GarmentCategory) -> Vec<AnchorPoint> {
    let Some(torso) = mask.segment(SegmentId::Torso).map(|s| s.bounds) else {
        return Vec::new();
    };
    let center = torso.center();
    let top_center = AnchorPoint {
        name: "torso_top_center",
        position: Point2::new(center.x, torso.top),
        weight: 1.0,
    };
    let bottom_center = |weight| AnchorPoint {
        name: "torso_bottom_center",
        position: Point2::new(center.x, torso.bottom),
        weight,
    };

    match category {
        GarmentCategory::Tops | GarmentCategory::Outerwear => vec![
            top_center,
            AnchorPoint {
                name: "torso_left_center",
                position: Point2::new(torso.left, center.y),
                weight: 0.8,
            },
            AnchorPoint {
                name: "torso_right_center",
                position: Point2::new(torso.right, center.y),
                weight: 0.8,
            },
        ],
        GarmentCategory::Bottoms => vec![bottom_center(1.0)],
        GarmentCategory::Dresses => vec![top_center, bottom_center(0.9)],
    }
}

/// Safe zones, avoid zones and anchors of `mask` for `category`
#[must_use]
pub fn get_overlay_constraints(mask: &SegmentationMask, category: GarmentCategory) -> OverlayConstraints {
    OverlayConstraints {
        category,
        safe_zones: zones(mask, category.safe_segments()),
        avoid_zones: zones(mask, category.avoid_segments()),
        anchor_points: anchors(mask, category),
    }
}

/// Measure how much `overlay` covers the avoid zones of `category` and,
/// on conflict, suggest moving it onto the nearest anchor
#[must_use]
pub fn check_overlay_conflicts(overlay: &Bounds, mask: &SegmentationMask, category: GarmentCategory) -> ConflictReport {
    let constraints = get_overlay_constraints(mask, category);
    let total_overlap: f64 = constraints
        .avoid_zones
        .iter()
        .map(|zone| overlay.intersection_area(zone))
        .sum();
    let has_conflicts = total_overlap > 0.0;

    let recommended_adjustment = if has_conflicts {
        let center = overlay.center();
        constraints
            .anchor_points
            .iter()
            .min_by(|a, b| {
                nalgebra::distance(&center, &a.position).total_cmp(&nalgebra::distance(&center, &b.position))
            })
            .map(|anchor| overlay.offset_to(anchor.position))
    } else {
        None
    };

    ConflictReport {
        has_conflicts,
        total_overlap,
        overlap_percentage: safe_ratio(total_overlap, overlay.area()).unwrap_or(0.0),
        recommended_adjustment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::regions::BodySegment;

    fn segment(id: SegmentId, bounds: Bounds) -> BodySegment {
        BodySegment {
            id,
            name: id.name(),
            landmarks: id.landmarks().to_vec(),
            bounds,
            confidence: 0.9,
            area: bounds.area(),
        }
    }

    fn mask() -> SegmentationMask {
        SegmentationMask::rasterize(
            400,
            600,
            vec![
                segment(SegmentId::Head, Bounds::new(170.0, 40.0, 230.0, 110.0)),
                segment(SegmentId::Torso, Bounds::new(140.0, 135.0, 260.0, 315.0)),
                segment(SegmentId::LeftLeg, Bounds::new(230.0, 290.0, 250.0, 510.0)),
                segment(SegmentId::RightLeg, Bounds::new(150.0, 290.0, 170.0, 510.0)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Tops".parse::<GarmentCategory>().unwrap(), GarmentCategory::Tops);
        assert_eq!("dresses".parse::<GarmentCategory>().unwrap(), GarmentCategory::Dresses);
        assert!(matches!("hats".parse::<GarmentCategory>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_tops_constraints() {
        let constraints = get_overlay_constraints(&mask(), GarmentCategory::Tops);
        assert_eq!(constraints.safe_zones, vec![Bounds::new(140.0, 135.0, 260.0, 315.0)]);
        assert_eq!(constraints.avoid_zones.len(), 3);
        assert_eq!(constraints.anchor_points.len(), 3);
        assert_eq!(constraints.anchor_points[0].position, Point2::new(200.0, 135.0));
        assert_eq!(constraints.anchor_points[1].weight, 0.8);
    }

    #[test]
    fn test_dresses_anchor_bottom_center() {
        let constraints = get_overlay_constraints(&mask(), GarmentCategory::Dresses);
        assert_eq!(constraints.avoid_zones, vec![Bounds::new(170.0, 40.0, 230.0, 110.0)]);
        let bottom = constraints.anchor_points[1];
        assert_eq!(bottom.position, Point2::new(200.0, 315.0));
        assert_eq!(bottom.weight, 0.9);
    }

    #[test]
    fn test_overlay_inside_torso_has_no_conflict() {
        let report = check_overlay_conflicts(&Bounds::new(150.0, 140.0, 250.0, 280.0), &mask(), GarmentCategory::Tops);
        assert!(!report.has_conflicts);
        assert_eq!(report.overlap_percentage, 0.0);
        assert!(report.recommended_adjustment.is_none());
    }

    #[test]
    fn test_overlay_over_head_is_moved_to_anchor() {
        let overlay = Bounds::new(170.0, 60.0, 230.0, 160.0);
        let report = check_overlay_conflicts(&overlay, &mask(), GarmentCategory::Tops);
        assert!(report.has_conflicts);
        // 60 x 50 of the head box
        assert_eq!(report.total_overlap, 3000.0);
        assert!((report.overlap_percentage - 0.5).abs() < 1e-12);
        assert_eq!(report.recommended_adjustment, Some(Vector2::new(0.0, 25.0)));
    }
}
