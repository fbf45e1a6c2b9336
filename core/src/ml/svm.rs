//! Maximal-margin linear separator for the SVM panel
//!
//! A pairwise search stands in for a quadratic-program solver. Every pair of
//! opposite-class points proposes a normal direction (the segment joining
//! them); projecting the whole dataset onto that direction reduces the
//! problem to one dimension, where separability and margin are read off
//! directly.
//!
//! # Mathematical Foundation
//!
//! For a unit normal `n` and projections `π(x) = n·x`:
//! ```text
//! feasible ⇔ min_{x∈A} π(x) > max_{x∈B} π(x)
//! margin   = ½ (min_{x∈A} π(x) − max_{x∈B} π(x))
//! w = n,  b = −½ (min_A π + max_B π)
//! ```
//! The orientation with the largest margin over all pairs wins. When no pair
//! yields a feasible orientation the perpendicular bisector of the globally
//! closest opposite-class pair is used instead.
//!
//! # Performance Characteristics
//! - Time Complexity: O(|A|·|B|·n)
//! - Space Complexity: O(n)
//!
//! Only suitable for the handful of points a canvas holds.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info, warn};
use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SvmConfig;
use crate::data_structures::dataset::DatasetGenerator;
use crate::data_structures::point::{DistanceMode, Domain, Point};
use crate::data_structures::rng::SimRng;
use crate::simulation::{
    parse_f64, parse_usize, KernelComplexity, KernelId, KernelParameter, SimulationError,
    SimulationKernel, SimulationMetrics,
};

/// Projection slack for support-vector membership
pub const DEFAULT_SUPPORT_TOLERANCE: f64 = 0.02;

/// Segments shorter than this do not define a direction
const DEGENERATE_LENGTH: f64 = 1e-12;

/// Linear decision boundary `w·x + b = 0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperplane {
    /// Unit normal pointing towards the `+1` class
    pub weights: Vector2<f64>,
    pub bias: f64,
    /// Distance from the boundary to the nearest point of either class, ≥ 0
    pub margin: f64,
    pub support_vectors: Vec<Point>,
    /// `false` when produced by the closest-pair fallback
    pub separable: bool,
}

impl Hyperplane {
    #[inline]
    pub fn decision_value(&self, point: &Point) -> f64 {
        self.weights.x * point.x() + self.weights.y * point.y() + self.bias
    }

    /// `+1` on the non-negative side, `-1` otherwise
    #[inline]
    pub fn classify(&self, point: &Point) -> i32 {
        if self.decision_value(point) >= 0.0 {
            1
        } else {
            -1
        }
    }

    /// Full corridor width between the two margin lines
    pub fn margin_width(&self) -> f64 {
        2.0 * self.margin
    }

    /// Whether every `±1` labelled point lies on its own side
    pub fn separates(&self, points: &[Point]) -> bool {
        points.iter().all(|p| match p.label.map(i32::signum) {
            Some(sign) if sign != 0 => self.classify(p) == sign,
            _ => true,
        })
    }
}

/// Projected extent of a class along a normal
#[derive(Debug, Clone, Copy)]
struct Extent {
    min: f64,
    max: f64,
}

impl Extent {
    fn of(points: &[&Point], normal: &Vector2<f64>) -> Self {
        points.iter().fold(
            Self {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |extent, p| {
                let projection = project(p, normal);
                Self {
                    min: extent.min.min(projection),
                    max: extent.max.max(projection),
                }
            },
        )
    }
}

/// Feasible orientation: positives project at or above `high`, negatives at
/// or below `low`
#[derive(Debug, Clone, Copy)]
struct Candidate {
    normal: Vector2<f64>,
    low: f64,
    high: f64,
}

impl Candidate {
    fn margin(&self) -> f64 {
        0.5 * (self.high - self.low)
    }
}

#[inline]
fn project(point: &Point, normal: &Vector2<f64>) -> f64 {
    normal.x * point.x() + normal.y * point.y()
}

#[inline]
fn offset(from: &Point, to: &Point) -> Vector2<f64> {
    Vector2::new(to.x() - from.x(), to.y() - from.y())
}

/// Pairwise maximal-margin search with a closest-pair fallback
#[derive(Debug, Clone, Copy)]
pub struct MarginSolver {
    tolerance: f64,
}

impl Default for MarginSolver {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPORT_TOLERANCE)
    }
}

impl MarginSolver {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: if tolerance.is_finite() {
                tolerance.max(0.0)
            } else {
                DEFAULT_SUPPORT_TOLERANCE
            },
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns `None` only when one of the two classes is empty. Points
    /// without a `±1` label are ignored.
    pub fn solve(&self, points: &[Point]) -> Option<Hyperplane> {
        let positives: Vec<&Point> = points
            .iter()
            .filter(|p| p.label.map_or(false, |l| l > 0))
            .collect();
        let negatives: Vec<&Point> = points
            .iter()
            .filter(|p| p.label.map_or(false, |l| l < 0))
            .collect();
        if positives.is_empty() || negatives.is_empty() {
            debug!(
                "Margin solver skipped: {} positive, {} negative points",
                positives.len(),
                negatives.len()
            );
            return None;
        }

        let mut best: Option<Candidate> = None;
        for p in &positives {
            for q in &negatives {
                let direction = offset(q, p);
                let length = direction.norm();
                if length < DEGENERATE_LENGTH {
                    continue;
                }
                let Some(candidate) = Self::evaluate(direction / length, &positives, &negatives)
                else {
                    continue;
                };
                if best.map_or(true, |b| candidate.margin() > b.margin()) {
                    best = Some(candidate);
                }
            }
        }

        let hyperplane = match best {
            Some(candidate) => self.from_candidate(candidate, &positives, &negatives),
            None => {
                warn!("No separating orientation found; using closest-pair bisector");
                Self::closest_pair_bisector(&positives, &negatives)
            }
        };
        debug!(
            "Hyperplane w = ({:.4}, {:.4}), b = {:.4}, margin = {:.4}, {} support vectors",
            hyperplane.weights.x,
            hyperplane.weights.y,
            hyperplane.bias,
            hyperplane.margin,
            hyperplane.support_vectors.len()
        );
        Some(hyperplane)
    }

    /// Checks whether the classes are cleanly split along `normal`
    fn evaluate(
        normal: Vector2<f64>,
        positives: &[&Point],
        negatives: &[&Point],
    ) -> Option<Candidate> {
        let pos = Extent::of(positives, &normal);
        let neg = Extent::of(negatives, &normal);
        if pos.min > neg.max {
            Some(Candidate {
                normal,
                low: neg.max,
                high: pos.min,
            })
        } else if neg.min > pos.max {
            Some(Candidate {
                normal: -normal,
                low: -neg.min,
                high: -pos.max,
            })
        } else {
            None
        }
    }

    fn from_candidate(
        &self,
        candidate: Candidate,
        positives: &[&Point],
        negatives: &[&Point],
    ) -> Hyperplane {
        let normal = candidate.normal;
        let support_vectors = positives
            .iter()
            .filter(|p| project(p, &normal) - candidate.high <= self.tolerance)
            .chain(
                negatives
                    .iter()
                    .filter(|q| candidate.low - project(q, &normal) <= self.tolerance),
            )
            .map(|p| (*p).clone())
            .collect();

        Hyperplane {
            weights: normal,
            bias: -0.5 * (candidate.high + candidate.low),
            margin: candidate.margin().max(0.0),
            support_vectors,
            separable: true,
        }
    }

    /// Perpendicular bisector of the closest opposite-class pair
    fn closest_pair_bisector(positives: &[&Point], negatives: &[&Point]) -> Hyperplane {
        let mut closest: Option<(&Point, &Point, f64)> = None;
        for p in positives {
            for q in negatives {
                let distance = offset(q, p).norm_squared();
                if closest.map_or(true, |(_, _, best)| distance < best) {
                    closest = Some((*p, *q, distance));
                }
            }
        }

        // Both slices are non-empty here, so a pair always exists
        let Some((p, q, _)) = closest else {
            return Hyperplane {
                weights: Vector2::new(1.0, 0.0),
                bias: 0.0,
                margin: 0.0,
                support_vectors: Vec::new(),
                separable: false,
            };
        };

        let direction = offset(q, p);
        let length = direction.norm();
        let normal = if length < DEGENERATE_LENGTH {
            Vector2::new(1.0, 0.0)
        } else {
            direction / length
        };
        let midpoint = Point::planar(0.5 * (p.x() + q.x()), 0.5 * (p.y() + q.y()));

        Hyperplane {
            weights: normal,
            bias: -project(&midpoint, &normal),
            margin: 0.0,
            support_vectors: vec![p.clone(), q.clone()],
            separable: false,
        }
    }
}

/// Interactive SVM panel owning two labelled classes
#[derive(Debug, Clone)]
pub struct SvmPanel<R: Rng = SimRng> {
    solver: MarginSolver,
    generator: DatasetGenerator,
    points_per_class: usize,
    points: Vec<Point>,
    hyperplane: Option<Hyperplane>,
    trainings: usize,
    rng: R,
}

impl<R: Rng> SvmPanel<R> {
    pub fn new(config: &SvmConfig, rng: R) -> Self {
        let mut panel = Self {
            solver: MarginSolver::new(config.support_tolerance),
            generator: DatasetGenerator::new(Domain::UNIT, DistanceMode::Planar),
            points_per_class: config.points_per_class.max(1),
            points: Vec::new(),
            hyperplane: None,
            trainings: 0,
            rng,
        };
        panel.regenerate();
        panel
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn hyperplane(&self) -> Option<&Hyperplane> {
        self.hyperplane.as_ref()
    }

    pub fn domain(&self) -> Domain {
        self.generator.domain()
    }

    /// Fresh, pre-separated classes; drops the current hyperplane
    pub fn regenerate(&mut self) {
        self.points = self.generator.separable_classes(self.points_per_class, &mut self.rng);
        self.hyperplane = None;
        self.trainings = 0;
        info!("SVM dataset regenerated with {} points per class", self.points_per_class);
    }

    /// Solves from scratch. On `None` the previous hyperplane stays visible.
    pub fn train(&mut self) -> Option<&Hyperplane> {
        self.trainings += 1;
        if let Some(hyperplane) = self.solver.solve(&self.points) {
            self.hyperplane = Some(hyperplane);
        }
        self.hyperplane.as_ref()
    }

    /// Adds a point; any non-negative label becomes `+1`, negative `-1`
    pub fn add_point(&mut self, x: f64, y: f64, label: i32) -> usize {
        let domain = self.generator.domain();
        let label = if label < 0 { -1 } else { 1 };
        self.points
            .push(Point::planar(domain.clamp_value(x), domain.clamp_value(y)).with_label(label));
        self.points.len() - 1
    }

    pub fn move_point(&mut self, index: usize, x: f64, y: f64) -> Result<(), SimulationError> {
        let domain = self.generator.domain();
        let point = self
            .points
            .get_mut(index)
            .ok_or(SimulationError::PointOutOfRange(index))?;
        point.coords[0] = domain.clamp_value(x);
        point.coords[1] = domain.clamp_value(y);
        Ok(())
    }

    pub fn remove_point(&mut self, index: usize) -> Result<Point, SimulationError> {
        if index >= self.points.len() {
            return Err(SimulationError::PointOutOfRange(index));
        }
        Ok(self.points.remove(index))
    }
}

impl<R: Rng> SimulationKernel for SvmPanel<R> {
    fn id(&self) -> KernelId {
        KernelId::new("svm")
    }

    fn name(&self) -> &'static str {
        "Support Vector Machine"
    }

    fn category(&self) -> &'static str {
        "classification"
    }

    fn description(&self) -> String {
        format!(
            "Maximal-margin linear separator over {} labelled points",
            self.points.len()
        )
    }

    fn complexity(&self) -> KernelComplexity {
        KernelComplexity::new("O(|A|·|B|·n) per training", "O(n)")
    }

    fn parameters(&self) -> Vec<KernelParameter> {
        vec![
            KernelParameter::integer("points_per_class", self.points_per_class, 1, 40),
            KernelParameter::float(
                "support_tolerance",
                self.solver.tolerance(),
                Some(0.0),
                Some(0.5),
            ),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), SimulationError> {
        match name {
            "points_per_class" => {
                self.points_per_class = parse_usize(name, value)?.max(1);
                self.regenerate();
            }
            "support_tolerance" => {
                let tolerance = parse_f64(name, value)?;
                if tolerance < 0.0 {
                    return Err(SimulationError::invalid_parameter(name, "must be non-negative"));
                }
                self.solver = MarginSolver::new(tolerance);
            }
            _ => return Err(SimulationError::invalid_parameter(name, "unknown parameter")),
        }
        Ok(())
    }

    fn metrics(&self) -> SimulationMetrics {
        let metrics = SimulationMetrics::new(self.id(), self.trainings)
            .with("points", self.points.len() as f64);
        match &self.hyperplane {
            Some(h) => metrics
                .with("margin", h.margin)
                .with("margin_width", h.margin_width())
                .with("support_vectors", h.support_vectors.len() as f64)
                .with("separable", if h.separable { 1.0 } else { 0.0 }),
            None => metrics,
        }
    }
}
