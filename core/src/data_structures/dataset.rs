//! Random point-set generation for the visualization panels
//!
//! Every panel starts from freshly generated data. Shapes are laid out in
//! normalized `[0,1]` coordinates, perturbed with Gaussian noise, mapped onto
//! the panel domain and clamped so no generated point escapes the canvas.
//!
//! # Shapes
//! - `Clusters`: three isotropic Gaussian blobs
//! - `Crescent`: two interleaved half-moons
//! - `ConcentricRings`: an inner and an outer ring around the canvas centre
//! - `Noisy`: uniform scatter with no structure
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use nalgebra::DVector;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::data_structures::point::{DistanceMode, Domain, Point};
use crate::simulation::SimulationError;

const BLOB_COUNT: usize = 3;
const BLOB_SPREAD: f64 = 0.06;
const SHAPE_NOISE: f64 = 0.02;
const DEPTH_SPREAD: f64 = 0.08;

/// Layout of a generated K-Means dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetShape {
    Clusters,
    Crescent,
    ConcentricRings,
    Noisy,
}

impl Default for DatasetShape {
    fn default() -> Self {
        Self::Clusters
    }
}

impl DatasetShape {
    pub const ALL: [DatasetShape; 4] = [
        DatasetShape::Clusters,
        DatasetShape::Crescent,
        DatasetShape::ConcentricRings,
        DatasetShape::Noisy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clusters => "clusters",
            Self::Crescent => "crescent",
            Self::ConcentricRings => "concentric_rings",
            Self::Noisy => "noisy",
        }
    }
}

impl fmt::Display for DatasetShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetShape {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|shape| shape.as_str() == s.trim())
            .ok_or_else(|| {
                SimulationError::invalid_parameter("shape", format!("unknown shape '{}'", s))
            })
    }
}

/// Point-set factory bound to a domain and dimensionality
#[derive(Debug, Clone, Copy)]
pub struct DatasetGenerator {
    domain: Domain,
    dimensions: usize,
}

impl DatasetGenerator {
    pub fn new(domain: Domain, mode: DistanceMode) -> Self {
        Self {
            domain,
            dimensions: mode.dimensions(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Unlabelled points arranged according to `shape`
    pub fn generate<R: Rng + ?Sized>(
        &self,
        shape: DatasetShape,
        count: usize,
        rng: &mut R,
    ) -> Vec<Point> {
        match shape {
            DatasetShape::Clusters => self.clusters(count, rng),
            DatasetShape::Crescent => self.crescent(count, rng),
            DatasetShape::ConcentricRings => self.rings(count, rng),
            DatasetShape::Noisy => (0..count)
                .map(|_| self.place(&self.uniform_unit(rng), rng, 0.0))
                .collect(),
        }
    }

    /// Two linearly separable classes: `-1` on the left band, `+1` on the right
    pub fn separable_classes<R: Rng + ?Sized>(&self, per_class: usize, rng: &mut R) -> Vec<Point> {
        let mut points = Vec::with_capacity(per_class * 2);
        for (label, band) in [(-1, (0.05, 0.3)), (1, (0.6, 0.95))] {
            for _ in 0..per_class {
                let mut unit = self.uniform_unit(rng);
                unit[0] = band.0 + rng.gen::<f64>() * (band.1 - band.0);
                points.push(self.place(&unit, rng, 0.0).with_label(label));
            }
        }
        points
    }

    /// Gaussian blobs labelled `0..classes`, spaced on a circle
    pub fn labelled_blobs<R: Rng + ?Sized>(
        &self,
        count: usize,
        classes: usize,
        rng: &mut R,
    ) -> Vec<Point> {
        let classes = classes.max(1);
        let centres: Vec<(f64, f64)> = (0..classes)
            .map(|c| {
                let angle = 2.0 * PI * c as f64 / classes as f64;
                (0.5 + 0.28 * angle.cos(), 0.5 + 0.28 * angle.sin())
            })
            .collect();

        (0..count)
            .map(|i| {
                let class = i % classes;
                let mut unit = vec![0.5; self.dimensions];
                unit[0] = centres[class].0;
                unit[1] = centres[class].1;
                self.place(&unit, rng, BLOB_SPREAD * 1.5).with_label(class as i32)
            })
            .collect()
    }

    /// Points scattered around `y = slope·x + intercept`
    pub fn linear_trend<R: Rng + ?Sized>(
        &self,
        count: usize,
        slope: f64,
        intercept: f64,
        noise: f64,
        rng: &mut R,
    ) -> Vec<Point> {
        (0..count)
            .map(|_| {
                let x = self.domain.lerp(rng.gen::<f64>());
                let jitter: f64 = rng.sample(StandardNormal);
                let y = self.domain.clamp_value(slope * x + intercept + noise * jitter);
                Point::planar(x, y)
            })
            .collect()
    }

    fn clusters<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Point> {
        let centres: Vec<Vec<f64>> = (0..BLOB_COUNT)
            .map(|_| (0..self.dimensions).map(|_| 0.2 + 0.6 * rng.gen::<f64>()).collect())
            .collect();

        (0..count)
            .map(|i| self.place(&centres[i % BLOB_COUNT], rng, BLOB_SPREAD))
            .collect()
    }

    fn crescent<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Point> {
        (0..count)
            .map(|i| {
                let moon = i % 2;
                let t = PI * rng.gen::<f64>();
                // Raw moons span x ∈ [-1, 2], y ∈ [-0.5, 1]
                let (x, y) = if moon == 0 {
                    (t.cos(), t.sin())
                } else {
                    (1.0 - t.cos(), 0.5 - t.sin())
                };
                let mut unit = self.depth_centre(rng);
                unit[0] = 0.1 + 0.8 * (x + 1.0) / 3.0;
                unit[1] = 0.1 + 0.8 * (y + 0.5) / 1.5;
                self.place(&unit, rng, SHAPE_NOISE).with_label(moon as i32)
            })
            .collect()
    }

    fn rings<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Point> {
        (0..count)
            .map(|i| {
                let ring = i % 2;
                let radius = if ring == 0 { 0.15 } else { 0.38 };
                let angle = 2.0 * PI * rng.gen::<f64>();
                let mut unit = self.depth_centre(rng);
                unit[0] = 0.5 + radius * angle.cos();
                unit[1] = 0.5 + radius * angle.sin();
                self.place(&unit, rng, SHAPE_NOISE).with_label(ring as i32)
            })
            .collect()
    }

    fn uniform_unit<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        (0..self.dimensions).map(|_| rng.gen::<f64>()).collect()
    }

    /// Unit-space template whose depth axis (if any) hovers around the middle
    fn depth_centre<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        (0..self.dimensions)
            .map(|axis| {
                if axis < 2 {
                    0.5
                } else {
                    let z: f64 = rng.sample(StandardNormal);
                    0.5 + DEPTH_SPREAD * z
                }
            })
            .collect()
    }

    /// Adds isotropic noise to a unit-space position and maps it onto the domain
    fn place<R: Rng + ?Sized>(&self, unit: &[f64], rng: &mut R, spread: f64) -> Point {
        let coords = DVector::from_iterator(
            self.dimensions,
            (0..self.dimensions).map(|axis| {
                let base = unit.get(axis).copied().unwrap_or(0.5);
                let z: f64 = if spread > 0.0 { rng.sample(StandardNormal) } else { 0.0 };
                self.domain.clamp_value(self.domain.lerp(base + spread * z))
            }),
        );
        Point {
            coords,
            label: None,
            cluster: None,
            value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::rng::seeded;

    #[test]
    fn test_every_shape_stays_in_domain() {
        let mut rng = seeded(11);
        for mode in [DistanceMode::Planar, DistanceMode::Spatial] {
            let generator = DatasetGenerator::new(Domain::UNIT, mode);
            for shape in DatasetShape::ALL {
                let points = generator.generate(shape, 120, &mut rng);
                assert_eq!(points.len(), 120);
                for p in &points {
                    assert_eq!(p.dim(), mode.dimensions());
                    assert!(Domain::UNIT.contains(&p.coords), "{} escaped: {:?}", shape, p.coords);
                }
            }
        }
    }

    #[test]
    fn test_separable_classes_are_banded() {
        let mut rng = seeded(3);
        let generator = DatasetGenerator::new(Domain::UNIT, DistanceMode::Planar);
        let points = generator.separable_classes(15, &mut rng);
        assert_eq!(points.len(), 30);
        for p in &points {
            match p.label {
                Some(-1) => assert!(p.x() <= 0.3),
                Some(1) => assert!(p.x() >= 0.6),
                other => panic!("unexpected label {:?}", other),
            }
        }
    }

    #[test]
    fn test_linear_trend_without_noise_is_exact() {
        let mut rng = seeded(5);
        let generator = DatasetGenerator::new(Domain::SYMMETRIC, DistanceMode::Planar);
        for p in generator.linear_trend(20, 0.5, 1.0, 0.0, &mut rng) {
            assert!((p.y() - (0.5 * p.x() + 1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_shape_round_trips_through_str() {
        for shape in DatasetShape::ALL {
            assert_eq!(shape.as_str().parse::<DatasetShape>().unwrap(), shape);
        }
        assert!("spiral".parse::<DatasetShape>().is_err());
    }
}
