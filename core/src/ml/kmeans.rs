//! K-Means clustering simulation
//!
//! Implements Lloyd's iteration as two pure operations over an explicit
//! point/centroid state, plus the interactive panel that owns the state and
//! its run lifecycle.
//!
//! # Mathematical Foundation
//!
//! One iteration alternates:
//! ```text
//! assign:  c(i) = argmin_j ‖x_i − μ_j‖        (lowest j wins on ties)
//! update:  μ_j  = (1/|C_j|) Σ_{i ∈ C_j} x_i    (unchanged when C_j = ∅)
//! ```
//! Both half-steps can only lower the inertia `Σ_i ‖x_i − μ_{c(i)}‖²`, so
//! the objective is monotonically non-increasing until convergence.
//!
//! # Performance Characteristics
//! - Time Complexity: O(n·k·d) per iteration
//! - Space Complexity: O(n + k)
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::time::Duration;

use log::{debug, info, warn};
use nalgebra::DVector;
use rand::seq::index;
use rand::Rng;

use crate::config::{KMeansConfig, MAX_CLUSTERS, MIN_CLUSTERS};
use crate::data_structures::dataset::{DatasetGenerator, DatasetShape};
use crate::data_structures::point::{Centroid, ColorTag, DistanceMode, Domain, Point};
use crate::data_structures::rng::SimRng;
use crate::execution::runner::Steppable;
use crate::simulation::{
    parse_usize, KernelComplexity, KernelId, KernelParameter, RunControl, RunState,
    SimulationError, SimulationKernel, SimulationMetrics,
};

/// Pure assign/update operations of Lloyd's algorithm
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterAssigner {
    mode: DistanceMode,
}

impl ClusterAssigner {
    pub fn new(mode: DistanceMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DistanceMode {
        self.mode
    }

    /// Index of the nearest centroid; the first one found wins a tie
    pub fn nearest(&self, point: &Point, centroids: &[Centroid]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (index, centroid) in centroids.iter().enumerate() {
            let distance = self.mode.distance_squared(&point.coords, &centroid.coords);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((index, distance)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Copies `points` with each `cluster` set to its nearest centroid
    pub fn assign(&self, points: &[Point], centroids: &[Centroid]) -> Vec<Point> {
        points
            .iter()
            .map(|point| {
                let mut assigned = point.clone();
                assigned.cluster = self.nearest(point, centroids);
                assigned
            })
            .collect()
    }

    /// Moves each centroid to the mean of its assigned points
    pub fn update(&self, points: &[Point], centroids: &[Centroid]) -> Vec<Centroid> {
        let mut sums: Vec<DVector<f64>> = centroids
            .iter()
            .map(|c| DVector::zeros(c.coords.len()))
            .collect();
        let mut counts = vec![0usize; centroids.len()];

        for point in points {
            let Some(cluster) = point.cluster.filter(|c| *c < centroids.len()) else {
                continue;
            };
            let axes = sums[cluster].len().min(point.dim());
            for axis in 0..axes {
                sums[cluster][axis] += point.coords[axis];
            }
            counts[cluster] += 1;
        }

        centroids
            .iter()
            .zip(sums)
            .zip(counts)
            .map(|((previous, sum), count)| {
                if count == 0 {
                    previous.clone()
                } else {
                    Centroid::new(sum / count as f64, previous.color)
                }
            })
            .collect()
    }

    /// One full assign + update pair
    pub fn step(&self, points: &[Point], centroids: &[Centroid]) -> (Vec<Point>, Vec<Centroid>) {
        let assigned = self.assign(points, centroids);
        let updated = self.update(&assigned, centroids);
        (assigned, updated)
    }

    /// Sum of squared distances from assigned points to their centroid
    pub fn inertia(&self, points: &[Point], centroids: &[Centroid]) -> f64 {
        points
            .iter()
            .filter_map(|p| {
                p.cluster
                    .and_then(|c| centroids.get(c))
                    .map(|c| self.mode.distance_squared(&p.coords, &c.coords))
            })
            .sum()
    }

    /// Number of points assigned to each centroid
    pub fn cluster_sizes(&self, points: &[Point], k: usize) -> Vec<usize> {
        let mut sizes = vec![0; k];
        for cluster in points.iter().filter_map(|p| p.cluster) {
            if let Some(size) = sizes.get_mut(cluster) {
                *size += 1;
            }
        }
        sizes
    }
}

/// Interactive K-Means panel
#[derive(Debug, Clone)]
pub struct KMeansSimulation<R: Rng = SimRng> {
    assigner: ClusterAssigner,
    generator: DatasetGenerator,
    shape: DatasetShape,
    k: usize,
    point_count: usize,
    points: Vec<Point>,
    centroids: Vec<Centroid>,
    control: RunControl,
    tick_interval: Duration,
    rng: R,
}

impl<R: Rng> KMeansSimulation<R> {
    pub fn new(config: &KMeansConfig, rng: R) -> Self {
        let mut simulation = Self {
            assigner: ClusterAssigner::new(config.distance_mode),
            generator: DatasetGenerator::new(Domain::UNIT, config.distance_mode),
            shape: config.shape,
            k: clamp_k(config.k),
            point_count: config.point_count,
            points: Vec::new(),
            centroids: Vec::new(),
            control: RunControl::new(),
            tick_interval: config.tick_interval(),
            rng,
        };
        simulation.regenerate();
        simulation
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn shape(&self) -> DatasetShape {
        self.shape
    }

    pub fn distance_mode(&self) -> DistanceMode {
        self.assigner.mode()
    }

    pub fn domain(&self) -> Domain {
        self.generator.domain()
    }

    pub fn iteration(&self) -> usize {
        self.control.iteration()
    }

    pub fn state(&self) -> RunState {
        self.control.state()
    }

    pub fn inertia(&self) -> f64 {
        self.assigner.inertia(&self.points, &self.centroids)
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.assigner.cluster_sizes(&self.points, self.centroids.len())
    }

    /// Centroids with no assigned point (only meaningful after a step)
    pub fn empty_clusters(&self) -> usize {
        self.cluster_sizes().iter().filter(|size| **size == 0).count()
    }

    pub fn start(&mut self) -> bool {
        self.control.start()
    }

    pub fn pause(&mut self) -> bool {
        self.control.pause()
    }

    /// Manual step: halts auto mode, then applies exactly one iteration
    pub fn step(&mut self) -> SimulationMetrics {
        self.control.halt();
        self.iterate()
    }

    /// Discards the point set and centroids and starts over from `Idle`
    pub fn reset(&mut self) {
        self.regenerate();
        info!("K-Means reset: {} points, k = {}", self.points.len(), self.k);
    }

    /// Changing `k` always re-seeds every centroid and drops all assignments
    pub fn set_k(&mut self, k: usize) {
        let clamped = clamp_k(k);
        if clamped != k {
            warn!("Requested k = {} clamped to {}", k, clamped);
        }
        self.k = clamped;
        self.control.reset();
        self.reseed_centroids();
        info!("K-Means re-initialized with k = {}", self.k);
    }

    pub fn set_shape(&mut self, shape: DatasetShape) {
        self.shape = shape;
        self.regenerate();
        info!("K-Means dataset regenerated as {}", shape);
    }

    pub fn set_point_count(&mut self, count: usize) {
        self.point_count = count.max(1);
        self.regenerate();
    }

    pub fn set_distance_mode(&mut self, mode: DistanceMode) {
        self.assigner = ClusterAssigner::new(mode);
        self.generator = DatasetGenerator::new(self.generator.domain(), mode);
        self.regenerate();
    }

    /// Drags a point; the position is clamped and auto mode halts
    pub fn move_point(&mut self, index: usize, coords: &[f64]) -> Result<(), SimulationError> {
        let dimensions = self.generator.dimensions();
        if coords.len() != dimensions {
            return Err(SimulationError::DimensionMismatch {
                expected: dimensions,
                actual: coords.len(),
            });
        }
        let domain = self.generator.domain();
        let point = self
            .points
            .get_mut(index)
            .ok_or(SimulationError::PointOutOfRange(index))?;
        point.coords = DVector::from_row_slice(coords);
        domain.clamp(&mut point.coords);
        self.control.halt();
        Ok(())
    }

    /// Adds a user-placed point (unassigned until the next step)
    pub fn add_point(&mut self, coords: &[f64]) -> Result<usize, SimulationError> {
        let dimensions = self.generator.dimensions();
        if coords.len() != dimensions {
            return Err(SimulationError::DimensionMismatch {
                expected: dimensions,
                actual: coords.len(),
            });
        }
        let mut point = Point::new(coords);
        self.generator.domain().clamp(&mut point.coords);
        self.points.push(point);
        self.control.halt();
        Ok(self.points.len() - 1)
    }

    fn iterate(&mut self) -> SimulationMetrics {
        let (points, centroids) = self.assigner.step(&self.points, &self.centroids);
        self.points = points;
        self.centroids = centroids;
        let iteration = self.control.record_step();
        debug!("K-Means iteration {}: inertia = {:.6}", iteration, self.inertia());
        self.metrics()
    }

    fn regenerate(&mut self) {
        self.points = self.generator.generate(self.shape, self.point_count, &mut self.rng);
        self.control.reset();
        self.reseed_centroids();
    }

    /// Seeds centroids at distinct random data points, topping up with
    /// uniform positions when there are fewer points than clusters
    fn reseed_centroids(&mut self) {
        for point in &mut self.points {
            point.cluster = None;
        }

        let sampled = self.k.min(self.points.len());
        let mut centroids: Vec<Centroid> = index::sample(&mut self.rng, self.points.len(), sampled)
            .into_iter()
            .enumerate()
            .map(|(slot, i)| {
                Centroid::new(self.points[i].coords.clone(), ColorTag::from_index(slot))
            })
            .collect();

        let dimensions = self.generator.dimensions();
        let domain = self.generator.domain();
        while centroids.len() < self.k {
            let slot = centroids.len();
            centroids.push(Centroid::new(
                domain.sample(&mut self.rng, dimensions),
                ColorTag::from_index(slot),
            ));
        }
        self.centroids = centroids;
    }
}

fn clamp_k(k: usize) -> usize {
    k.clamp(MIN_CLUSTERS, MAX_CLUSTERS)
}

fn parse_distance_mode(value: &str) -> Result<DistanceMode, SimulationError> {
    match value.trim() {
        "planar" | "2d" => Ok(DistanceMode::Planar),
        "spatial" | "3d" => Ok(DistanceMode::Spatial),
        other => Err(SimulationError::invalid_parameter(
            "distance_mode",
            format!("unknown mode '{}'", other),
        )),
    }
}

impl<R: Rng> SimulationKernel for KMeansSimulation<R> {
    fn id(&self) -> KernelId {
        KernelId::new("kmeans")
    }

    fn name(&self) -> &'static str {
        "K-Means Clustering"
    }

    fn category(&self) -> &'static str {
        "clustering"
    }

    fn description(&self) -> String {
        format!(
            "Lloyd's algorithm on {} {} points with k = {}",
            self.points.len(),
            self.shape,
            self.k
        )
    }

    fn complexity(&self) -> KernelComplexity {
        KernelComplexity::new("O(n·k·d) per iteration", "O(n + k)")
    }

    fn parameters(&self) -> Vec<KernelParameter> {
        let shapes: Vec<&str> = DatasetShape::ALL.iter().map(|s| s.as_str()).collect();
        let mode = match self.distance_mode() {
            DistanceMode::Planar => "planar",
            DistanceMode::Spatial => "spatial",
        };
        vec![
            KernelParameter::integer("k", self.k, MIN_CLUSTERS, MAX_CLUSTERS),
            KernelParameter::integer("point_count", self.point_count, 1, 1000),
            KernelParameter::choice("shape", self.shape.as_str(), &shapes),
            KernelParameter::choice("distance_mode", mode, &["planar", "spatial"]),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), SimulationError> {
        match name {
            "k" => self.set_k(parse_usize(name, value)?),
            "point_count" => self.set_point_count(parse_usize(name, value)?),
            "shape" => self.set_shape(value.parse()?),
            "distance_mode" => self.set_distance_mode(parse_distance_mode(value)?),
            _ => return Err(SimulationError::invalid_parameter(name, "unknown parameter")),
        }
        Ok(())
    }

    fn metrics(&self) -> SimulationMetrics {
        SimulationMetrics::new(self.id(), self.iteration())
            .with("iteration", self.iteration() as f64)
            .with("inertia", self.inertia())
            .with("k", self.k as f64)
            .with("empty_clusters", self.empty_clusters() as f64)
    }
}

impl<R: Rng + Send> Steppable for KMeansSimulation<R> {
    fn is_running(&self) -> bool {
        self.control.is_running()
    }

    fn tick(&mut self) -> Option<SimulationMetrics> {
        if !self.control.is_running() {
            return None;
        }
        Some(self.iterate())
    }

    fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::rng::seeded;
    use approx::assert_abs_diff_eq;

    fn centroid(coords: &[f64], tag: usize) -> Centroid {
        Centroid::new(DVector::from_row_slice(coords), ColorTag::from_index(tag))
    }

    #[test]
    fn test_assignment_is_optimal() {
        let mut rng = seeded(99);
        let generator = DatasetGenerator::new(Domain::UNIT, DistanceMode::Planar);
        let points = generator.generate(DatasetShape::Noisy, 80, &mut rng);
        let assigner = ClusterAssigner::new(DistanceMode::Planar);

        for k in 1..=MAX_CLUSTERS {
            let centroids: Vec<Centroid> = (0..k)
                .map(|i| Centroid::new(Domain::UNIT.sample(&mut rng, 2), ColorTag::from_index(i)))
                .collect();
            let (assigned, updated) = assigner.step(&points, &centroids);
            let (reassigned, _) = assigner.step(&assigned, &updated);

            for p in &reassigned {
                let own = p.cluster.unwrap();
                let own_distance = DistanceMode::Planar.distance(&p.coords, &updated[own].coords);
                for other in &updated {
                    let distance = DistanceMode::Planar.distance(&p.coords, &other.coords);
                    assert!(own_distance <= distance + 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_ties_go_to_the_lowest_index() {
        let assigner = ClusterAssigner::default();
        let point = Point::planar(0.5, 0.5);
        let centroids = vec![centroid(&[0.4, 0.5], 0), centroid(&[0.6, 0.5], 1)];
        assert_eq!(assigner.nearest(&point, &centroids), Some(0));
        assert_eq!(assigner.nearest(&point, &[]), None);
    }

    #[test]
    fn test_empty_cluster_keeps_previous_position() {
        let assigner = ClusterAssigner::default();
        let points = vec![Point::planar(0.1, 0.1), Point::planar(0.2, 0.2)];
        let centroids = vec![centroid(&[0.15, 0.15], 0), centroid(&[0.9, 0.9], 1)];

        let (assigned, updated) = assigner.step(&points, &centroids);
        assert!(assigned.iter().all(|p| p.cluster == Some(0)));
        assert_abs_diff_eq!(updated[0].coords[0], 0.15, epsilon = 1e-12);
        assert_eq!(updated[1], centroids[1]);
        assert!(updated[1].coords.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_single_cluster_lands_on_global_mean() {
        let assigner = ClusterAssigner::new(DistanceMode::Spatial);
        let points = vec![
            Point::spatial(0.0, 0.0, 0.0),
            Point::spatial(1.0, 0.0, 0.5),
            Point::spatial(0.5, 1.0, 1.0),
        ];
        let (_, updated) = assigner.step(&points, &[centroid(&[0.9, 0.9, 0.9], 0)]);
        assert_abs_diff_eq!(updated[0].coords[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(updated[0].coords[1], 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(updated[0].coords[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_inertia_never_increases() {
        for seed in 0..10 {
            for shape in DatasetShape::ALL {
                let config = KMeansConfig {
                    k: 4,
                    shape,
                    ..KMeansConfig::default()
                };
                let mut panel = KMeansSimulation::new(&config, seeded(seed));
                panel.step();
                let mut previous = panel.inertia();
                for _ in 0..15 {
                    panel.step();
                    let current = panel.inertia();
                    assert!(
                        current <= previous + 1e-9,
                        "inertia rose from {} to {}",
                        previous,
                        current
                    );
                    previous = current;
                }
            }
        }
    }

    #[test]
    fn test_step_halts_and_counts() {
        let mut panel = KMeansSimulation::new(&KMeansConfig::default(), seeded(1));
        assert_eq!(panel.state(), RunState::Idle);
        assert!(panel.tick().is_none());

        let metrics = panel.step();
        assert_eq!(metrics.get("iteration"), Some(1.0));
        assert_eq!(panel.state(), RunState::Paused);

        panel.start();
        panel.tick();
        panel.tick();
        assert_eq!(panel.iteration(), 3);

        panel.step();
        assert_eq!(panel.state(), RunState::Paused);
        assert_eq!(panel.iteration(), 4);
    }

    #[test]
    fn test_changing_k_reinitializes_everything() {
        let mut panel = KMeansSimulation::new(&KMeansConfig::default(), seeded(4));
        panel.start();
        panel.tick();
        panel.set_k(5);

        assert_eq!(panel.k(), 5);
        assert_eq!(panel.centroids().len(), 5);
        assert_eq!(panel.iteration(), 0);
        assert_eq!(panel.state(), RunState::Idle);
        assert!(panel.points().iter().all(|p| p.cluster.is_none()));

        panel.set_k(0);
        assert_eq!(panel.k(), 1);
        panel.set_k(42);
        assert_eq!(panel.k(), MAX_CLUSTERS);
    }

    #[test]
    fn test_changing_shape_regenerates_points() {
        let mut panel = KMeansSimulation::new(&KMeansConfig::default(), seeded(8));
        panel.step();
        panel.step();
        let before = panel.points().to_vec();

        panel.set_shape(DatasetShape::ConcentricRings);
        assert_eq!(panel.iteration(), 0);
        assert_eq!(panel.shape(), DatasetShape::ConcentricRings);
        assert_eq!(panel.points().len(), before.len());
        assert_ne!(panel.points(), before.as_slice());
    }

    #[test]
    fn test_more_clusters_than_points() {
        let config = KMeansConfig {
            k: 6,
            point_count: 2,
            ..KMeansConfig::default()
        };
        let mut panel = KMeansSimulation::new(&config, seeded(12));
        assert_eq!(panel.centroids().len(), 6);
        panel.step();
        assert_eq!(panel.empty_clusters(), 4);
        assert!(panel.centroids().iter().all(|c| c.coords.iter().all(|v| v.is_finite())));
    }

    #[test]
    fn test_dragging_clamps_and_halts() {
        let mut panel = KMeansSimulation::new(&KMeansConfig::default(), seeded(21));
        panel.start();
        panel.move_point(0, &[1.7, -0.3]).unwrap();

        assert_eq!(panel.state(), RunState::Paused);
        assert_eq!(panel.points()[0].coords.as_slice(), &[1.0, 0.0]);
        assert!(matches!(
            panel.move_point(10_000, &[0.5, 0.5]),
            Err(SimulationError::PointOutOfRange(10_000))
        ));
        assert!(matches!(
            panel.move_point(0, &[0.5]),
            Err(SimulationError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_parameters_drive_the_panel() {
        let mut panel = KMeansSimulation::new(&KMeansConfig::default(), seeded(30));
        panel.set_parameter("k", "6").unwrap();
        panel.set_parameter("shape", "crescent").unwrap();
        panel.set_parameter("distance_mode", "spatial").unwrap();

        assert_eq!(panel.get_parameter("k").as_deref(), Some("6"));
        assert_eq!(panel.get_parameter("shape").as_deref(), Some("crescent"));
        assert!(panel.points().iter().all(|p| p.dim() == 3));
        assert!(panel.set_parameter("k", "many").is_err());
        assert!(panel.set_parameter("gamma", "1").is_err());
    }
}
