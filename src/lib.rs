//! Full-body pose stabilization for overlay rendering.
//!
//! This library turns raw, noisy per-frame landmark detections into a
//! stabilized, anatomically plausible and confidence-scored skeleton:
//! - Temporal smoothing with velocity-aware damping and jitter suppression
//! - Composite quality scoring and multi-check validation
//! - Anatomical, symmetry and sudden-movement correction
//! - Multi-strategy recovery when tracking is lost
//! - Body-region segmentation and garment overlay constraints
//!
//! The landmark detector itself is an external collaborator behind the
//! [`detector::PoseDetector`] trait. All mutable pipeline state lives in a
//! [`session::TrackingSession`], one per tracked person.
//!
//! # Examples
//!
//! ```
//! use pose_stabilization::pose::{LandmarkId, RawKeypoint, RawPose};
//! use pose_stabilization::session::TrackingSession;
//!
//! let mut session = TrackingSession::default();
//! let detection = RawPose {
//!     keypoints: vec![RawKeypoint { id: LandmarkId::Nose, x: 200.0, y: 100.0, z: None, confidence: 0.9 }],
//!     score: Some(0.9),
//! };
//!
//! let outcome = session.process_frame(Some(detection), 400, 600, 0);
//! // a single landmark is not enough for a renderable pose
//! assert!(!outcome.renderable);
//! ```

/// Tracking pipeline configuration
pub mod config;

/// Named numeric thresholds
pub mod constants;

/// Anatomical correction and landmark interpolation
pub mod correction;

/// External landmark detector boundary
pub mod detector;

/// Error types
pub mod error;

/// Temporal pose filters
pub mod filters;

/// Axis-aligned rectangles
pub mod geometry;

/// Time-bounded pose history
pub mod history;

/// Velocity and displacement statistics
pub mod motion;

/// Landmark and pose data model
pub mod pose;

/// Composite pose confidence
pub mod quality;

/// Tracking-loss recovery state machine
pub mod recovery;

/// Recorded detector output replay
pub mod replay;

/// Body segmentation and overlay constraints
pub mod segmentation;

/// Per-session pipeline context
pub mod session;

/// Utility functions
pub mod utils;

/// Pose validation checks
pub mod validation;

pub use error::{Error, Result};
