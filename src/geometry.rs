//! Axis-aligned rectangles used for body regions and overlay placement.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in frame coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    /// Smallest rectangle containing every point, `None` for an empty set
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point2<f64>>,
    {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self::new(p.x, p.y, p.x, p.y),
                Some(b) => Self {
                    left: b.left.min(p.x),
                    top: b.top.min(p.y),
                    right: b.right.max(p.x),
                    bottom: b.bottom.max(p.y),
                },
            })
        })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        Point2::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    /// Grow by `dx` on the left/right and `dy` on the top/bottom
    #[must_use]
    pub fn expand(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.left - dx, self.top - dy, self.right + dx, self.bottom + dy)
    }

    /// Restrict to the `[0, width] x [0, height]` frame
    #[must_use]
    pub fn clamp_to_frame(&self, width: f64, height: f64) -> Self {
        Self {
            left: self.left.clamp(0.0, width),
            top: self.top.clamp(0.0, height),
            right: self.right.clamp(0.0, width),
            bottom: self.bottom.clamp(0.0, height),
        }
    }

    #[must_use]
    pub fn intersection(&self, other: &Bounds) -> Option<Bounds> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        (right > left && bottom > top).then_some(Bounds { left, top, right, bottom })
    }

    #[must_use]
    pub fn intersection_area(&self, other: &Bounds) -> f64 {
        self.intersection(other).map_or(0.0, |b| b.area())
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Translation moving this rectangle's center onto `target`
    #[must_use]
    pub fn offset_to(&self, target: Point2<f64>) -> Vector2<f64> {
        target - self.center()
    }
}
