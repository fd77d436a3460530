//! Time-bounded pose history.
//!
//! Entries are appended once per accepted frame (most recent last) and are
//! never modified afterwards; the only removals are window pruning, the
//! length cap and an explicit `clear` on session reset.

use crate::constants::MAX_HISTORY_LEN;
use crate::pose::Pose;
use std::collections::VecDeque;

/// Ordered, time-windowed sequence of stabilized poses
#[derive(Debug, Clone)]
pub struct PoseHistory {
    entries: VecDeque<Pose>,
    window_ms: u64,
    max_len: usize,
}

impl PoseHistory {
    /// Create a history that keeps poses younger than `window_ms`
    #[must_use]
    pub fn new(window_ms: u64) -> Self {
        Self::with_capacity(window_ms, MAX_HISTORY_LEN)
    }

    /// Create a history with an explicit entry cap
    ///
    /// # Panics
    ///
    /// Panics if `max_len` is zero
    #[must_use]
    pub fn with_capacity(window_ms: u64, max_len: usize) -> Self {
        assert!(max_len > 0, "History capacity must be greater than 0");
        Self {
            entries: VecDeque::with_capacity(max_len.min(MAX_HISTORY_LEN)),
            window_ms,
            max_len,
        }
    }

    /// Append a pose, dropping the oldest entry once the cap is reached
    pub fn push(&mut self, pose: Pose) {
        if self.entries.len() >= self.max_len {
            self.entries.pop_front();
        }
        self.entries.push_back(pose);
    }

    /// Drop entries whose age relative to `now_ms` is not below the window
    pub fn prune(&mut self, now_ms: u64) {
        let window = self.window_ms;
        self.entries.retain(|p| now_ms.saturating_sub(p.timestamp_ms) < window);
    }

    #[must_use]
    pub fn last(&self) -> Option<&Pose> {
        self.entries.back()
    }

    /// The last `n` entries, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Pose> + '_ {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pose> + '_ {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
