//! Run-state machine shared by the iterative panels
//!
//! Iterative simulations (K-Means auto mode, the network trainer) follow the
//! same lifecycle:
//!
//! ```text
//! Idle ──start──▶ Running ──pause──▶ Paused ──start──▶ Running
//!   ▲                                                     │
//!   └──────────────────────── reset ◀─────────────────────┘
//! ```
//!
//! `RunControl` owns the lifecycle together with the iteration counter. The
//! counter grows by exactly one per completed step, whether the step came
//! from the auto loop or from a manual "step" request.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an iterative simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Freshly initialized or reset, no step applied yet
    Idle,
    /// Auto mode: a timer keeps invoking `tick`
    Running,
    /// Halted after at least one step
    Paused,
}

impl Default for RunState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Lifecycle and iteration bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunControl {
    state: RunState,
    iteration: usize,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[inline]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Enters auto mode. Returns `false` when already running.
    pub fn start(&mut self) -> bool {
        self.transition(RunState::Running)
    }

    /// Halts auto mode. Only a running simulation can be paused.
    pub fn pause(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        self.transition(RunState::Paused)
    }

    /// Stops any in-flight loop without discarding progress
    pub fn halt(&mut self) {
        if self.state == RunState::Running {
            self.transition(RunState::Paused);
        }
    }

    /// Returns to `Idle` and clears the iteration counter
    pub fn reset(&mut self) {
        self.transition(RunState::Idle);
        self.iteration = 0;
    }

    /// Records one completed step. A step applied from `Idle` leaves the
    /// simulation `Paused`, so a later `start` resumes from there.
    pub fn record_step(&mut self) -> usize {
        self.iteration += 1;
        if self.state == RunState::Idle {
            self.transition(RunState::Paused);
        }
        self.iteration
    }

    fn transition(&mut self, next: RunState) -> bool {
        if self.state == next {
            return false;
        }
        debug!("Run state transition: {:?} -> {:?}", self.state, next);
        self.state = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        let mut control = RunControl::new();
        assert_eq!(control.state(), RunState::Idle);
        assert!(!control.pause());

        assert!(control.start());
        assert!(!control.start());
        assert!(control.is_running());

        assert!(control.pause());
        assert_eq!(control.state(), RunState::Paused);

        assert!(control.start());
        control.reset();
        assert_eq!(control.state(), RunState::Idle);
        assert_eq!(control.iteration(), 0);
    }

    #[test]
    fn test_step_counts_once_per_step() {
        let mut control = RunControl::new();
        assert_eq!(control.record_step(), 1);
        assert_eq!(control.state(), RunState::Paused);

        control.start();
        control.record_step();
        control.record_step();
        assert_eq!(control.iteration(), 3);
        assert!(control.is_running());

        control.halt();
        assert_eq!(control.state(), RunState::Paused);
        assert_eq!(control.iteration(), 3);
    }
}
