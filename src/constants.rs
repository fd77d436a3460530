//! Constants used throughout the pipeline

/// Number of landmarks in a pose
pub const NUM_LANDMARKS: usize = 17;

/// Numeric precision epsilon used as a minimum denominator
pub const EPSILON: f64 = 1e-6;

/// Landmarks above this confidence count as visible
pub const VALID_LANDMARK_CONFIDENCE: f64 = 0.3;

/// Minimum number of visible landmarks for a scorable pose
pub const MIN_VALID_LANDMARKS: usize = 8;

/// Milliseconds of history retained per unit of `temporal_window_size`
pub const TEMPORAL_WINDOW_UNIT_MS: u64 = 200;

/// Hard cap on retained history entries regardless of the time window
pub const MAX_HISTORY_LEN: usize = 64;

/// Number of most recent history entries used for velocity and stability
pub const VELOCITY_SAMPLE_COUNT: usize = 3;

/// Default configuration values
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_MAX_POSE_COUNT: u32 = 1;
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.7;
pub const DEFAULT_TEMPORAL_WINDOW_SIZE: u32 = 5;
pub const DEFAULT_MAX_JITTER_THRESHOLD: f64 = 10.0;
pub const DEFAULT_MAX_RECOVERY_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECOVERY_COOLDOWN_MS: u32 = 500;
pub const DEFAULT_FRAME_WIDTH: u32 = 400;
pub const DEFAULT_FRAME_HEIGHT: u32 = 600;

/// Smoother: speed (units/s) at which damping bottoms out
pub const DAMPING_SPEED_SCALE: f64 = 500.0;
pub const MIN_DAMPING_FACTOR: f64 = 0.3;
pub const MIN_RECENCY_WEIGHT: f64 = 0.1;
pub const RECENCY_HORIZON_MS: f64 = 1000.0;

/// Quality scorer defaults
pub const DEFAULT_ANATOMICAL_SCORE: f64 = 0.3;
pub const NEUTRAL_TEMPORAL_SCORE: f64 = 0.5;
pub const STABILITY_MOVEMENT_SCALE: f64 = 50.0;

/// Recovery acceptance threshold on the quality score
pub const RECOVERY_ACCEPT_QUALITY: f64 = 0.2;

/// Segmentation
pub const SEGMENT_MIN_CONFIDENCE: f64 = 0.5;
pub const SEGMENTATION_CACHE_SIZE: usize = 10;
pub const MIN_LIMB_PADDING: f64 = 10.0;
