//! Ordinary least squares on a 2D point set
//!
//! # Mathematical Foundation
//!
//! ```text
//! slope     = (Σxy − n·x̄·ȳ) / (Σx² − n·x̄²)
//! intercept = ȳ − slope·x̄
//! R²        = 1 − SS_res / SS_tot
//! ```
//!
//! Degenerate inputs fall back to well-defined values instead of failing:
//! an empty set gives a flat line through the origin, a vertical stack of
//! points gives the horizontal line `y = ȳ`, and R² is reported as 1 when
//! there is no variance to explain.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;
use nalgebra::DVector;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::RegressionConfig;
use crate::data_structures::dataset::DatasetGenerator;
use crate::data_structures::point::{DistanceMode, Domain, Point};
use crate::data_structures::rng::SimRng;
use crate::simulation::{
    parse_f64, parse_usize, KernelComplexity, KernelId, KernelParameter, SimulationError,
    SimulationKernel, SimulationMetrics,
};

/// Relative tolerance under which the x variance counts as zero
const DEGENERATE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionModel {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl Default for RegressionModel {
    fn default() -> Self {
        Self {
            slope: 0.0,
            intercept: 0.0,
            r_squared: 1.0,
        }
    }
}

impl RegressionModel {
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionFitter;

impl RegressionFitter {
    pub fn new() -> Self {
        Self
    }

    pub fn fit(&self, points: &[Point]) -> RegressionModel {
        let n = points.len();
        if n == 0 {
            return RegressionModel::default();
        }

        let xs = DVector::from_iterator(n, points.iter().map(Point::x));
        let ys = DVector::from_iterator(n, points.iter().map(Point::y));
        let (mean_x, mean_y) = (xs.mean(), ys.mean());
        let count = n as f64;

        let sum_xx = xs.dot(&xs);
        let denominator = sum_xx - count * mean_x * mean_x;
        let (slope, intercept) = if denominator.abs() <= DEGENERATE_TOLERANCE * sum_xx.max(1.0) {
            (0.0, mean_y)
        } else {
            let slope = (xs.dot(&ys) - count * mean_x * mean_y) / denominator;
            (slope, mean_y - slope * mean_x)
        };

        let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
        let r_squared = if n < 2 || ss_tot <= f64::EPSILON {
            1.0
        } else {
            let ss_res: f64 = xs
                .iter()
                .zip(ys.iter())
                .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
                .sum();
            1.0 - ss_res / ss_tot
        };

        RegressionModel {
            slope,
            intercept,
            r_squared,
        }
    }
}

/// Editable scatter plot whose line is refitted after every edit
#[derive(Debug, Clone)]
pub struct RegressionPanel<R: Rng = SimRng> {
    fitter: RegressionFitter,
    generator: DatasetGenerator,
    config: RegressionConfig,
    points: Vec<Point>,
    model: RegressionModel,
    rng: R,
}

impl<R: Rng> RegressionPanel<R> {
    pub fn new(config: &RegressionConfig, rng: R) -> Self {
        let mut panel = Self {
            fitter: RegressionFitter::new(),
            generator: DatasetGenerator::new(Domain::SYMMETRIC, DistanceMode::Planar),
            config: config.clone(),
            points: Vec::new(),
            model: RegressionModel::default(),
            rng,
        };
        panel.regenerate();
        panel
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn model(&self) -> RegressionModel {
        self.model
    }

    pub fn domain(&self) -> Domain {
        self.generator.domain()
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.model.predict(x)
    }

    /// Fresh points along the configured trend
    pub fn regenerate(&mut self) {
        let RegressionConfig {
            point_count,
            slope,
            intercept,
            noise,
        } = self.config;
        self.points = self
            .generator
            .linear_trend(point_count, slope, intercept, noise, &mut self.rng);
        self.refit();
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.refit();
    }

    pub fn add_point(&mut self, x: f64, y: f64) -> usize {
        let domain = self.domain();
        self.points
            .push(Point::planar(domain.clamp_value(x), domain.clamp_value(y)));
        self.refit();
        self.points.len() - 1
    }

    pub fn move_point(&mut self, index: usize, x: f64, y: f64) -> Result<(), SimulationError> {
        let domain = self.domain();
        let point = self
            .points
            .get_mut(index)
            .ok_or(SimulationError::PointOutOfRange(index))?;
        point.coords[0] = domain.clamp_value(x);
        point.coords[1] = domain.clamp_value(y);
        self.refit();
        Ok(())
    }

    pub fn remove_point(&mut self, index: usize) -> Result<Point, SimulationError> {
        if index >= self.points.len() {
            return Err(SimulationError::PointOutOfRange(index));
        }
        let removed = self.points.remove(index);
        self.refit();
        Ok(removed)
    }

    fn refit(&mut self) {
        self.model = self.fitter.fit(&self.points);
        debug!(
            "Regression refit over {} points: y = {:.3}x + {:.3} (R² {:.3})",
            self.points.len(),
            self.model.slope,
            self.model.intercept,
            self.model.r_squared
        );
    }
}

impl<R: Rng> SimulationKernel for RegressionPanel<R> {
    fn id(&self) -> KernelId {
        KernelId::new("regression")
    }

    fn name(&self) -> &'static str {
        "Linear Regression"
    }

    fn category(&self) -> &'static str {
        "regression"
    }

    fn description(&self) -> String {
        format!("Least-squares line through {} points", self.points.len())
    }

    fn complexity(&self) -> KernelComplexity {
        KernelComplexity::new("O(n) per edit", "O(n)")
    }

    fn parameters(&self) -> Vec<KernelParameter> {
        vec![
            KernelParameter::integer("point_count", self.config.point_count, 0, 200),
            KernelParameter::float("noise", self.config.noise, Some(0.0), Some(5.0)),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), SimulationError> {
        match name {
            "point_count" => self.config.point_count = parse_usize(name, value)?,
            "noise" => {
                let noise = parse_f64(name, value)?;
                if noise < 0.0 {
                    return Err(SimulationError::invalid_parameter(name, "must not be negative"));
                }
                self.config.noise = noise;
            }
            _ => return Err(SimulationError::invalid_parameter(name, "unknown parameter")),
        }
        self.regenerate();
        Ok(())
    }

    fn metrics(&self) -> SimulationMetrics {
        SimulationMetrics::new(self.id(), 0)
            .with("slope", self.model.slope)
            .with("intercept", self.model.intercept)
            .with("r_squared", self.model.r_squared)
            .with("points", self.points.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::rng::seeded;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_recovers_noiseless_line() {
        let points: Vec<Point> = (0..10)
            .map(|i| {
                let x = i as f64 * 0.5 - 2.0;
                Point::planar(x, 2.0 * x + 3.0)
            })
            .collect();
        let model = RegressionFitter::new().fit(&points);
        assert_relative_eq!(model.slope, 2.0, epsilon = 1e-9);
        assert_relative_eq!(model.intercept, 3.0, epsilon = 1e-9);
        assert_relative_eq!(model.r_squared, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_single_point_is_flat_through_it() {
        let model = RegressionFitter::new().fit(&[Point::planar(1.5, -0.75)]);
        assert_eq!(model.slope, 0.0);
        assert_abs_diff_eq!(model.intercept, -0.75);
        assert_eq!(model.r_squared, 1.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        let fitter = RegressionFitter::new();
        assert_eq!(fitter.fit(&[]), RegressionModel::default());
        assert_eq!(fitter.fit(&[]).intercept, 0.0);

        let stacked = [Point::planar(0.1, 1.0), Point::planar(0.1, 2.0), Point::planar(0.1, 4.0)];
        let model = fitter.fit(&stacked);
        assert_eq!(model.slope, 0.0);
        assert_abs_diff_eq!(model.intercept, 7.0 / 3.0, epsilon = 1e-12);

        let flat = [Point::planar(-1.0, 2.0), Point::planar(1.0, 2.0)];
        assert_eq!(fitter.fit(&flat).r_squared, 1.0);
    }

    #[test]
    fn test_noisy_fit_has_partial_r_squared() {
        let points = [
            Point::planar(0.0, 0.0),
            Point::planar(1.0, 2.0),
            Point::planar(2.0, 1.0),
            Point::planar(3.0, 3.0),
        ];
        let model = RegressionFitter::new().fit(&points);
        assert_abs_diff_eq!(model.slope, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(model.intercept, 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(model.r_squared, 0.64, epsilon = 1e-12);
    }

    #[test]
    fn test_panel_refits_on_every_edit() {
        let mut panel = RegressionPanel::new(&RegressionConfig::default(), seeded(4));
        assert_eq!(panel.points().len(), 12);

        panel.clear();
        assert_eq!(panel.model(), RegressionModel::default());

        panel.add_point(-1.0, 1.0);
        panel.add_point(1.0, 5.0);
        assert_abs_diff_eq!(panel.model().slope, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(panel.predict(0.0), 3.0, epsilon = 1e-12);

        panel.move_point(1, 1.0, 1.0).unwrap();
        assert_abs_diff_eq!(panel.model().slope, 0.0, epsilon = 1e-12);

        panel.remove_point(0).unwrap();
        assert_abs_diff_eq!(panel.model().intercept, 1.0, epsilon = 1e-12);
        assert!(panel.remove_point(3).is_err());
    }

    #[test]
    fn test_points_are_clamped_to_domain() {
        let mut panel = RegressionPanel::new(&RegressionConfig::default(), seeded(9));
        let index = panel.add_point(42.0, -42.0);
        assert_eq!(panel.points()[index].x(), 5.0);
        assert_eq!(panel.points()[index].y(), -5.0);
    }
}
