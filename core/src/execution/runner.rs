//! Timer-driven auto mode for iterative panels
//!
//! An `AutoRunner` repeatedly invokes a synchronous, self-contained step on a
//! shared simulation. Each tick locks the simulation, re-checks that it is
//! still running, applies exactly one step and releases the lock, so ticks
//! never overlap and a pause, reset or point drag issued from another task
//! takes effect before the next tick is applied.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::simulation::SimulationMetrics;

/// Shortest period accepted by the timer
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A simulation that can be advanced one atomic step at a time
pub trait Steppable: Send {
    /// The "still running" flag checked before every tick
    fn is_running(&self) -> bool;

    /// Applies one step when running; returns `None` without side effects otherwise
    fn tick(&mut self) -> Option<SimulationMetrics>;

    /// Preferred delay between ticks
    fn tick_interval(&self) -> Duration;
}

/// Outcome of an auto-mode session
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub ticks: usize,
    pub last_metrics: Option<SimulationMetrics>,
}

/// Drives a shared `Steppable` on a fixed-period timer
#[derive(Debug, Clone, Default)]
pub struct AutoRunner {
    max_ticks: Option<usize>,
    interval: Option<Duration>,
}

impl AutoRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops after `ticks` applied steps even if still running
    pub fn with_max_ticks(mut self, ticks: usize) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Overrides the simulation's preferred tick interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Runs until the simulation stops running or the tick budget is spent
    pub async fn run<S: Steppable>(&self, simulation: Arc<Mutex<S>>) -> RunSummary {
        let period = match self.interval {
            Some(interval) => interval,
            None => simulation.lock().await.tick_interval(),
        };
        let mut timer = time::interval(period.max(MIN_PERIOD));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut summary = RunSummary::default();
        loop {
            if self.max_ticks.map_or(false, |max| summary.ticks >= max) {
                break;
            }
            timer.tick().await;

            let mut guard = simulation.lock().await;
            if !guard.is_running() {
                trace!("Auto runner observed a halted simulation");
                break;
            }
            match guard.tick() {
                Some(metrics) => {
                    summary.ticks += 1;
                    trace!("Auto runner applied tick {}", summary.ticks);
                    summary.last_metrics = Some(metrics);
                }
                None => break,
            }
        }

        debug!("Auto runner finished after {} ticks", summary.ticks);
        summary
    }

    /// Runs on a background task
    pub fn spawn<S: Steppable + 'static>(
        self,
        simulation: Arc<Mutex<S>>,
    ) -> JoinHandle<RunSummary> {
        tokio::spawn(async move { self.run(simulation).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KMeansConfig;
    use crate::data_structures::rng::seeded;
    use crate::ml::kmeans::KMeansSimulation;
    use crate::simulation::RunState;

    fn kmeans_panel(seed: u64) -> KMeansSimulation {
        let config = KMeansConfig {
            k: 3,
            point_count: 100,
            tick_interval_ms: 1,
            ..KMeansConfig::default()
        };
        KMeansSimulation::new(&config, seeded(seed))
    }

    #[tokio::test]
    async fn test_auto_mode_runs_exactly_twenty_iterations() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut panel = kmeans_panel(2024);
        panel.start();
        let shared = Arc::new(Mutex::new(panel));

        let summary = AutoRunner::new().with_max_ticks(20).run(Arc::clone(&shared)).await;

        let panel = shared.lock().await;
        assert_eq!(summary.ticks, 20);
        assert_eq!(panel.iteration(), 20);
        assert_eq!(summary.last_metrics.and_then(|m| m.get("iteration")), Some(20.0));
    }

    #[tokio::test]
    async fn test_auto_mode_converges_without_empty_clusters() {
        let trials = 20;
        let mut healthy = 0;
        for seed in 0..trials {
            let mut panel = kmeans_panel(seed);
            panel.start();
            let shared = Arc::new(Mutex::new(panel));
            let summary = AutoRunner::new()
                .with_max_ticks(20)
                .with_interval(Duration::from_millis(1))
                .run(Arc::clone(&shared))
                .await;
            let panel = shared.lock().await;
            assert_eq!(summary.ticks, 20);
            assert_eq!(panel.iteration(), 20);
            if panel.empty_clusters() == 0 {
                healthy += 1;
            }
        }
        assert!(
            healthy * 10 >= trials * 9,
            "only {}/{} trials kept every cluster",
            healthy,
            trials
        );
    }

    #[tokio::test]
    async fn test_pause_from_another_task_stops_the_loop() {
        let mut panel = kmeans_panel(7);
        panel.start();
        let shared = Arc::new(Mutex::new(panel));

        let handle = AutoRunner::new()
            .with_interval(Duration::from_millis(2))
            .spawn(Arc::clone(&shared));

        time::sleep(Duration::from_millis(30)).await;
        shared.lock().await.pause();

        let summary = handle.await.unwrap();
        let panel = shared.lock().await;
        assert_eq!(panel.state(), RunState::Paused);
        assert_eq!(panel.iteration(), summary.ticks);
    }

    #[tokio::test]
    async fn test_idle_simulation_is_never_ticked() {
        let shared = Arc::new(Mutex::new(kmeans_panel(1)));
        let summary = AutoRunner::new().with_max_ticks(5).run(Arc::clone(&shared)).await;
        assert_eq!(summary.ticks, 0);
        assert_eq!(shared.lock().await.iteration(), 0);
    }
}
