//! K-nearest-neighbour classifier and decision-boundary rasterizer
//!
//! Prediction is lazy: the training set is kept as-is and every query sorts
//! it by distance. The heatmap repeats the query for every cell centre of a
//! fixed-resolution grid; the panel caches that grid and only rebuilds it
//! after the training set or `k` changes.
//!
//! # Tie-breaking
//! - Equal distances keep training-set insertion order (stable sort)
//! - Equal vote counts go to the lowest label
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeMap;

use log::{debug, info};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{KnnConfig, MAX_CLUSTERS, MAX_GRID_RESOLUTION};
use crate::data_structures::dataset::DatasetGenerator;
use crate::data_structures::point::{DistanceMode, Domain, Point};
use crate::data_structures::rng::SimRng;
use crate::simulation::{
    parse_usize, KernelComplexity, KernelId, KernelParameter, SimulationError, SimulationKernel,
    SimulationMetrics,
};

/// Whether neighbours vote on a class or average a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnnMode {
    #[default]
    Classification,
    Regression,
}

impl KnnMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::Regression => "regression",
        }
    }
}

/// A training point ranked by its distance to the query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Prediction {
    Class(i32),
    Value(f64),
}

/// Stateless k-NN query engine
#[derive(Debug, Clone, Copy)]
pub struct NeighborClassifier {
    k: usize,
}

impl NeighborClassifier {
    /// `k` below one is raised to one
    pub fn new(k: usize) -> Self {
        Self { k: k.max(1) }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// The `k` nearest points among those accepted by `eligible`, nearest
    /// first; fewer when the training set is smaller than `k`
    pub fn neighbors_where<F>(
        &self,
        training: &[Point],
        query: &Point,
        eligible: F,
    ) -> Vec<Neighbor>
    where
        F: Fn(&Point) -> bool,
    {
        let mut ranked: Vec<Neighbor> = training
            .iter()
            .enumerate()
            .filter(|(_, p)| eligible(p))
            .map(|(index, p)| Neighbor {
                index,
                distance: DistanceMode::Planar.distance(&p.coords, &query.coords),
            })
            .collect();
        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        ranked.truncate(self.k);
        ranked
    }

    pub fn neighbors(&self, training: &[Point], query: &Point) -> Vec<Neighbor> {
        self.neighbors_where(training, query, |_| true)
    }

    /// Majority label among the nearest labelled points
    pub fn classify(&self, training: &[Point], query: &Point) -> Option<i32> {
        let neighbors = self.neighbors_where(training, query, |p| p.label.is_some());
        majority(neighbors.iter().filter_map(|n| training[n.index].label))
    }

    /// Mean target among the nearest points carrying one
    pub fn regress(&self, training: &[Point], query: &Point) -> Option<f64> {
        let neighbors = self.neighbors_where(training, query, |p| p.target().is_some());
        if neighbors.is_empty() {
            return None;
        }
        let sum: f64 = neighbors.iter().filter_map(|n| training[n.index].target()).sum();
        Some(sum / neighbors.len() as f64)
    }

    pub fn predict(&self, mode: KnnMode, training: &[Point], query: &Point) -> Option<Prediction> {
        match mode {
            KnnMode::Classification => self.classify(training, query).map(Prediction::Class),
            KnnMode::Regression => self.regress(training, query).map(Prediction::Value),
        }
    }
}

/// Most frequent label; the lowest label wins a tie
fn majority<I: IntoIterator<Item = i32>>(labels: I) -> Option<i32> {
    let mut votes: BTreeMap<i32, usize> = BTreeMap::new();
    for label in labels {
        *votes.entry(label).or_insert(0) += 1;
    }
    let mut winner: Option<(i32, usize)> = None;
    for (label, count) in votes {
        if winner.map_or(true, |(_, best)| count > best) {
            winner = Some((label, count));
        }
    }
    winner.map(|(label, _)| label)
}

/// Square raster of predicted classes over the domain, row-major with row 0
/// at the domain minimum on the y axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionGrid {
    resolution: usize,
    domain: Domain,
    cells: Vec<Option<i32>>,
}

impl DecisionGrid {
    pub fn compute(
        classifier: &NeighborClassifier,
        training: &[Point],
        domain: Domain,
        resolution: usize,
    ) -> Self {
        let resolution = resolution.clamp(1, MAX_GRID_RESOLUTION);
        let cell = domain.span() / resolution as f64;
        let cells = (0..resolution * resolution)
            .into_par_iter()
            .map(|i| {
                let (row, col) = (i / resolution, i % resolution);
                let query = Point::planar(
                    domain.min + (col as f64 + 0.5) * cell,
                    domain.min + (row as f64 + 0.5) * cell,
                );
                classifier.classify(training, &query)
            })
            .collect();
        Self {
            resolution,
            domain,
            cells,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn cells(&self) -> &[Option<i32>] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        if row >= self.resolution || col >= self.resolution {
            return None;
        }
        self.cells[row * self.resolution + col]
    }

    pub fn cell_size(&self) -> f64 {
        self.domain.span() / self.resolution as f64
    }

    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let cell = self.cell_size();
        (
            self.domain.min + (col as f64 + 0.5) * cell,
            self.domain.min + (row as f64 + 0.5) * cell,
        )
    }

    /// Number of cells won by each class
    pub fn class_counts(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for label in self.cells.iter().flatten() {
            *counts.entry(*label).or_insert(0) += 1;
        }
        counts
    }
}

/// Averaged neighbour targets sampled at every cell centre, laid out like
/// `DecisionGrid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSurface {
    resolution: usize,
    domain: Domain,
    values: Vec<Option<f64>>,
}

impl RegressionSurface {
    pub fn compute(
        classifier: &NeighborClassifier,
        training: &[Point],
        domain: Domain,
        resolution: usize,
    ) -> Self {
        let resolution = resolution.clamp(1, MAX_GRID_RESOLUTION);
        let cell = domain.span() / resolution as f64;
        let values = (0..resolution * resolution)
            .into_par_iter()
            .map(|i| {
                let (row, col) = (i / resolution, i % resolution);
                let query = Point::planar(
                    domain.min + (col as f64 + 0.5) * cell,
                    domain.min + (row as f64 + 0.5) * cell,
                );
                classifier.regress(training, &query)
            })
            .collect();
        Self {
            resolution,
            domain,
            values,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.resolution || col >= self.resolution {
            return None;
        }
        self.values[row * self.resolution + col]
    }

    /// Smallest and largest predicted value, `None` when no cell has one
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |range, &value| {
            Some(match range {
                Some((min, max)) => (f64::min(min, value), f64::max(max, value)),
                None => (value, value),
            })
        })
    }
}

/// Interactive KNN panel with cached heatmaps
#[derive(Debug, Clone)]
pub struct KnnPanel<R: Rng = SimRng> {
    classifier: NeighborClassifier,
    mode: KnnMode,
    generator: DatasetGenerator,
    point_count: usize,
    class_count: usize,
    grid_resolution: usize,
    training: Vec<Point>,
    grid: Option<DecisionGrid>,
    surface: Option<RegressionSurface>,
    grid_builds: usize,
    rng: R,
}

impl<R: Rng> KnnPanel<R> {
    pub fn new(config: &KnnConfig, rng: R) -> Self {
        let mut panel = Self {
            classifier: NeighborClassifier::new(config.k),
            mode: config.mode,
            generator: DatasetGenerator::new(Domain::UNIT, DistanceMode::Planar),
            point_count: config.point_count,
            class_count: config.class_count.clamp(1, MAX_CLUSTERS),
            grid_resolution: config.grid_resolution.clamp(1, MAX_GRID_RESOLUTION),
            training: Vec::new(),
            grid: None,
            surface: None,
            grid_builds: 0,
            rng,
        };
        panel.regenerate();
        panel
    }

    pub fn training(&self) -> &[Point] {
        &self.training
    }

    pub fn k(&self) -> usize {
        self.classifier.k()
    }

    pub fn mode(&self) -> KnnMode {
        self.mode
    }

    pub fn domain(&self) -> Domain {
        self.generator.domain()
    }

    pub fn grid_resolution(&self) -> usize {
        self.grid_resolution
    }

    /// How many times either heatmap has been rasterized
    pub fn grid_builds(&self) -> usize {
        self.grid_builds
    }

    pub fn regenerate(&mut self) {
        self.training = self
            .generator
            .labelled_blobs(self.point_count, self.class_count, &mut self.rng);
        self.invalidate();
        info!(
            "KNN training set regenerated: {} points, {} classes",
            self.training.len(),
            self.class_count
        );
    }

    pub fn set_k(&mut self, k: usize) {
        let next = NeighborClassifier::new(k);
        if next.k() != self.classifier.k() {
            self.classifier = next;
            self.invalidate();
        }
    }

    pub fn set_mode(&mut self, mode: KnnMode) {
        self.mode = mode;
    }

    pub fn set_grid_resolution(&mut self, resolution: usize) {
        let resolution = resolution.clamp(1, MAX_GRID_RESOLUTION);
        if resolution != self.grid_resolution {
            self.grid_resolution = resolution;
            self.invalidate();
        }
    }

    pub fn add_point(&mut self, x: f64, y: f64, label: i32) -> usize {
        let domain = self.generator.domain();
        self.training
            .push(Point::planar(domain.clamp_value(x), domain.clamp_value(y)).with_label(label));
        self.invalidate();
        self.training.len() - 1
    }

    pub fn move_point(&mut self, index: usize, x: f64, y: f64) -> Result<(), SimulationError> {
        let domain = self.generator.domain();
        let point = self
            .training
            .get_mut(index)
            .ok_or(SimulationError::PointOutOfRange(index))?;
        point.coords[0] = domain.clamp_value(x);
        point.coords[1] = domain.clamp_value(y);
        self.invalidate();
        Ok(())
    }

    pub fn remove_point(&mut self, index: usize) -> Result<Point, SimulationError> {
        if index >= self.training.len() {
            return Err(SimulationError::PointOutOfRange(index));
        }
        self.invalidate();
        Ok(self.training.remove(index))
    }

    pub fn clear(&mut self) {
        self.training.clear();
        self.invalidate();
    }

    /// Prediction for a query position in the panel's current mode
    pub fn predict(&self, x: f64, y: f64) -> Option<Prediction> {
        self.classifier
            .predict(self.mode, &self.training, &Point::planar(x, y))
    }

    /// Cached heatmap, rebuilt only after an edit or a `k` change
    pub fn decision_grid(&mut self) -> &DecisionGrid {
        let grid = match self.grid.take() {
            Some(grid) => grid,
            None => {
                self.grid_builds += 1;
                debug!(
                    "Decision grid rebuilt ({}x{}, k = {})",
                    self.grid_resolution,
                    self.grid_resolution,
                    self.classifier.k()
                );
                DecisionGrid::compute(
                    &self.classifier,
                    &self.training,
                    self.generator.domain(),
                    self.grid_resolution,
                )
            }
        };
        self.grid.insert(grid)
    }

    /// Cached regression heatmap, with the same rebuild rule as the class grid
    pub fn regression_surface(&mut self) -> &RegressionSurface {
        let surface = match self.surface.take() {
            Some(surface) => surface,
            None => {
                self.grid_builds += 1;
                debug!(
                    "Regression surface rebuilt ({}x{}, k = {})",
                    self.grid_resolution,
                    self.grid_resolution,
                    self.classifier.k()
                );
                RegressionSurface::compute(
                    &self.classifier,
                    &self.training,
                    self.generator.domain(),
                    self.grid_resolution,
                )
            }
        };
        self.surface.insert(surface)
    }

    /// Last built heatmap, if still valid
    pub fn cached_grid(&self) -> Option<&DecisionGrid> {
        self.grid.as_ref()
    }

    pub fn cached_surface(&self) -> Option<&RegressionSurface> {
        self.surface.as_ref()
    }

    fn invalidate(&mut self) {
        self.grid = None;
        self.surface = None;
    }
}

impl<R: Rng> SimulationKernel for KnnPanel<R> {
    fn id(&self) -> KernelId {
        KernelId::new("knn")
    }

    fn name(&self) -> &'static str {
        "K-Nearest Neighbors"
    }

    fn category(&self) -> &'static str {
        "classification"
    }

    fn description(&self) -> String {
        format!(
            "{}-NN {} over {} training points",
            self.classifier.k(),
            self.mode.as_str(),
            self.training.len()
        )
    }

    fn complexity(&self) -> KernelComplexity {
        KernelComplexity::new("O(n log n) per query, O(g²·n log n) per heatmap", "O(n + g²)")
    }

    fn parameters(&self) -> Vec<KernelParameter> {
        vec![
            KernelParameter::integer("k", self.classifier.k(), 1, 25),
            KernelParameter::integer(
                "grid_resolution",
                self.grid_resolution,
                1,
                MAX_GRID_RESOLUTION,
            ),
            KernelParameter::choice("mode", self.mode.as_str(), &["classification", "regression"]),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), SimulationError> {
        match name {
            "k" => self.set_k(parse_usize(name, value)?),
            "grid_resolution" => self.set_grid_resolution(parse_usize(name, value)?),
            "mode" => match value.trim() {
                "classification" => self.set_mode(KnnMode::Classification),
                "regression" => self.set_mode(KnnMode::Regression),
                other => {
                    return Err(SimulationError::invalid_parameter(
                        name,
                        format!("unknown mode '{}'", other),
                    ))
                }
            },
            _ => return Err(SimulationError::invalid_parameter(name, "unknown parameter")),
        }
        Ok(())
    }

    fn metrics(&self) -> SimulationMetrics {
        SimulationMetrics::new(self.id(), self.grid_builds)
            .with("k", self.classifier.k() as f64)
            .with("points", self.training.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::rng::seeded;
    use approx::assert_abs_diff_eq;

    fn labelled(coords: &[(f64, f64, i32)]) -> Vec<Point> {
        coords
            .iter()
            .map(|&(x, y, label)| Point::planar(x, y).with_label(label))
            .collect()
    }

    #[test]
    fn test_one_nn_matches_brute_force() {
        let mut rng = seeded(64);
        let generator = DatasetGenerator::new(Domain::UNIT, DistanceMode::Planar);
        let training = generator.labelled_blobs(40, 3, &mut rng);
        let classifier = NeighborClassifier::new(1);

        for _ in 0..200 {
            let query = Point::planar(rng.gen(), rng.gen());
            let nearest = training
                .iter()
                .min_by(|a, b| {
                    let da = DistanceMode::Planar.distance(&a.coords, &query.coords);
                    let db = DistanceMode::Planar.distance(&b.coords, &query.coords);
                    da.total_cmp(&db)
                })
                .unwrap();
            assert_eq!(classifier.classify(&training, &query), nearest.label);
        }
    }

    #[test]
    fn test_equidistant_vote_follows_insertion_order() {
        let query = Point::planar(0.5, 0.5);
        let training = labelled(&[(0.6, 0.5, 1), (0.4, 0.5, 0), (0.5, 0.6, 1), (0.5, 0.4, 0)]);
        let classifier = NeighborClassifier::new(3);

        let neighbors = classifier.neighbors(&training, &query);
        assert_eq!(neighbors.iter().map(|n| n.index).collect::<Vec<_>>(), vec![0, 1, 2]);

        let manual = neighbors.iter().filter(|n| training[n.index].label == Some(1)).count();
        assert_eq!(manual, 2);
        assert_eq!(classifier.classify(&training, &query), Some(1));
    }

    #[test]
    fn test_vote_ties_go_to_lowest_label() {
        let query = Point::planar(0.5, 0.5);
        let training = labelled(&[(0.55, 0.5, 4), (0.45, 0.5, 2)]);
        assert_eq!(NeighborClassifier::new(2).classify(&training, &query), Some(2));
        assert_eq!(majority(vec![3, 1, 3, 1]), Some(1));
        assert_eq!(majority(Vec::new()), None);
    }

    #[test]
    fn test_empty_training_set_has_no_prediction() {
        let classifier = NeighborClassifier::new(3);
        let query = Point::planar(0.5, 0.5);
        assert_eq!(classifier.classify(&[], &query), None);
        assert_eq!(classifier.regress(&[], &query), None);
        let unlabelled = [Point::planar(0.1, 0.1)];
        assert_eq!(classifier.predict(KnnMode::Classification, &unlabelled, &query), None);
    }

    #[test]
    fn test_k_is_clamped() {
        let training = labelled(&[(0.1, 0.1, 0), (0.9, 0.9, 1)]);
        let query = Point::planar(0.2, 0.2);
        assert_eq!(NeighborClassifier::new(0).k(), 1);
        assert_eq!(NeighborClassifier::new(10).neighbors(&training, &query).len(), 2);
        assert_eq!(NeighborClassifier::new(10).classify(&training, &query), Some(0));
    }

    #[test]
    fn test_regression_averages_neighbours() {
        let training = vec![
            Point::planar(0.1, 0.5).with_value(1.0),
            Point::planar(0.2, 0.5).with_value(3.0),
            Point::planar(0.9, 0.5).with_value(100.0),
        ];
        let query = Point::planar(0.15, 0.5);
        let value = NeighborClassifier::new(2).regress(&training, &query).unwrap();
        assert_abs_diff_eq!(value, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_grid_splits_two_classes() {
        let training = labelled(&[(0.2, 0.5, 0), (0.8, 0.5, 1)]);
        let grid = DecisionGrid::compute(&NeighborClassifier::new(1), &training, Domain::UNIT, 10);

        assert_eq!(grid.cells().len(), 100);
        assert_eq!(grid.get(5, 0), Some(0));
        assert_eq!(grid.get(5, 9), Some(1));
        assert_eq!(grid.get(10, 0), None);
        let counts = grid.class_counts();
        assert_eq!(counts.get(&0), Some(&50));
        assert_eq!(counts.get(&1), Some(&50));

        let (x, y) = grid.cell_center(0, 9);
        assert_abs_diff_eq!(x, 0.95, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_panel_caches_grid_until_an_edit() {
        let mut panel = KnnPanel::new(&KnnConfig::default(), seeded(77));
        panel.decision_grid();
        panel.decision_grid();
        assert_eq!(panel.grid_builds(), 1);

        panel.set_k(panel.k());
        assert!(panel.cached_grid().is_some());

        panel.set_k(5);
        assert!(panel.cached_grid().is_none());
        panel.decision_grid();
        assert_eq!(panel.grid_builds(), 2);

        panel.move_point(0, 0.5, 0.5).unwrap();
        panel.decision_grid();
        panel.add_point(0.1, 0.9, 1);
        panel.decision_grid();
        assert_eq!(panel.grid_builds(), 4);
    }

    #[test]
    fn test_regression_surface_is_cached_until_an_edit() {
        let config = KnnConfig {
            mode: KnnMode::Regression,
            grid_resolution: 6,
            ..KnnConfig::default()
        };
        let mut panel = KnnPanel::new(&config, seeded(41));
        panel.regression_surface();
        panel.regression_surface();
        assert_eq!(panel.grid_builds(), 1);
        assert!(panel.cached_surface().is_some());

        panel.move_point(0, 0.3, 0.3).unwrap();
        assert!(panel.cached_surface().is_none());
        panel.regression_surface();
        assert_eq!(panel.grid_builds(), 2);

        panel.set_k(panel.k() + 1);
        panel.regression_surface();
        assert_eq!(panel.grid_builds(), 3);
    }

    #[test]
    fn test_surface_matches_pointwise_regression() {
        let training = vec![
            Point::planar(0.25, 0.5).with_value(2.0),
            Point::planar(0.75, 0.5).with_value(6.0),
        ];
        let classifier = NeighborClassifier::new(1);
        let surface = RegressionSurface::compute(&classifier, &training, Domain::UNIT, 4);

        assert_eq!(surface.values().len(), 16);
        assert_eq!(surface.get(2, 0), Some(2.0));
        assert_eq!(surface.get(2, 3), Some(6.0));
        assert_eq!(surface.get(4, 0), None);
        assert_eq!(surface.value_range(), Some((2.0, 6.0)));

        let empty = RegressionSurface::compute(&classifier, &[], Domain::UNIT, 4);
        assert_eq!(empty.value_range(), None);
    }

    #[test]
    fn test_panel_without_points_predicts_nothing() {
        let mut panel = KnnPanel::new(&KnnConfig::default(), seeded(2));
        panel.clear();
        assert_eq!(panel.predict(0.5, 0.5), None);
        assert!(panel.decision_grid().cells().iter().all(Option::is_none));
        assert!(panel.remove_point(0).is_err());
    }
}
