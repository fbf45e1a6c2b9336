//! Bounded metric history for live charts
//!
//! Panels append one sample per completed step; once the buffer is full the
//! oldest sample is evicted, so charts always show the most recent window.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Default chart window
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Sample tagged with the step that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub step: usize,
    pub value: f64,
}

/// Fixed-capacity FIFO of metric samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricHistory {
    capacity: usize,
    samples: VecDeque<MetricSample>,
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl MetricHistory {
    /// A zero capacity is bumped to one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, step: usize, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(MetricSample { step, value });
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<MetricSample> {
        self.samples.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricSample> + '_ {
        self.samples.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Mean of the last `window` samples
    pub fn moving_average(&self, window: usize) -> Option<f64> {
        let window = window.min(self.samples.len());
        if window == 0 {
            return None;
        }
        let sum: f64 = self.samples.iter().rev().take(window).map(|s| s.value).sum();
        Some(sum / window as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = MetricHistory::with_capacity(3);
        for step in 1..=5 {
            history.push(step, step as f64 * 10.0);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.values(), vec![30.0, 40.0, 50.0]);
        assert_eq!(history.latest(), Some(MetricSample { step: 5, value: 50.0 }));
    }

    #[test]
    fn test_moving_average() {
        let mut history = MetricHistory::default();
        assert_eq!(history.moving_average(10), None);
        for (step, value) in [1.0, 2.0, 3.0, 4.0].into_iter().enumerate() {
            history.push(step, value);
        }
        assert_abs_diff_eq!(history.moving_average(2).unwrap(), 3.5);
        assert_abs_diff_eq!(history.moving_average(100).unwrap(), 2.5);
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let mut history = MetricHistory::with_capacity(0);
        history.push(0, 1.0);
        history.push(1, 2.0);
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.values(), vec![2.0]);
    }
}
