//! Point-set primitives shared by every simulation kernel
//!
//! Points carry 2 or 3 coordinates plus optional annotations: a class label
//! (SVM, KNN), a cluster assignment (K-Means) and a continuous target value
//! (KNN regression). Every point lives inside a panel `Domain`; any
//! coordinate written through a panel is clamped into it.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use nalgebra::DVector;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Palette index used by the renderer to colour clusters and classes
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ColorTag(pub u8);

impl ColorTag {
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self((index % u8::MAX as usize) as u8)
    }

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// A sample in a visualization panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub coords: DVector<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl Point {
    pub fn new(coords: &[f64]) -> Self {
        Self {
            coords: DVector::from_row_slice(coords),
            label: None,
            cluster: None,
            value: None,
        }
    }

    pub fn planar(x: f64, y: f64) -> Self {
        Self::new(&[x, y])
    }

    pub fn spatial(x: f64, y: f64, z: f64) -> Self {
        Self::new(&[x, y, z])
    }

    pub fn with_label(mut self, label: i32) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.coord(0)
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.coord(1)
    }

    /// Coordinate `axis`, zero when the point has fewer axes
    #[inline]
    pub fn coord(&self, axis: usize) -> f64 {
        self.coords.get(axis).copied().unwrap_or(0.0)
    }

    /// Regression target: the explicit value, else the numeric label
    pub fn target(&self) -> Option<f64> {
        self.value.or_else(|| self.label.map(f64::from))
    }
}

/// Representative point of a K-Means cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub coords: DVector<f64>,
    pub color: ColorTag,
}

impl Centroid {
    pub fn new(coords: DVector<f64>, color: ColorTag) -> Self {
        Self { coords, color }
    }
}

/// Euclidean metric over the first two or three axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    Planar,
    Spatial,
}

impl Default for DistanceMode {
    fn default() -> Self {
        Self::Planar
    }
}

impl DistanceMode {
    #[inline]
    pub fn dimensions(self) -> usize {
        match self {
            Self::Planar => 2,
            Self::Spatial => 3,
        }
    }

    /// Squared distance; axes missing on either side are skipped
    pub fn distance_squared(self, a: &DVector<f64>, b: &DVector<f64>) -> f64 {
        let axes = self.dimensions().min(a.len()).min(b.len());
        (0..axes).map(|i| (a[i] - b[i]).powi(2)).sum()
    }

    #[inline]
    pub fn distance(self, a: &DVector<f64>, b: &DVector<f64>) -> f64 {
        self.distance_squared(a, b).sqrt()
    }
}

/// Axis-aligned visualization domain `[min, max]` on every axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Default for Domain {
    fn default() -> Self {
        Self::UNIT
    }
}

impl Domain {
    /// Normalized canvas used by the clustering and classification panels
    pub const UNIT: Domain = Domain { min: 0.0, max: 1.0 };

    /// Cartesian plane used by the regression panel
    pub const SYMMETRIC: Domain = Domain { min: -5.0, max: 5.0 };

    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn clamp_value(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    pub fn clamp(&self, coords: &mut DVector<f64>) {
        for c in coords.iter_mut() {
            *c = self.clamp_value(*c);
        }
    }

    pub fn contains(&self, coords: &DVector<f64>) -> bool {
        coords.iter().all(|c| *c >= self.min && *c <= self.max)
    }

    /// Maps `t ∈ [0,1]` onto the domain
    #[inline]
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + t * self.span()
    }

    /// Uniformly distributed coordinate vector inside the domain
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, dimensions: usize) -> DVector<f64> {
        DVector::from_iterator(dimensions, (0..dimensions).map(|_| self.lerp(rng.gen::<f64>())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_point_accessors() {
        let p = Point::planar(0.25, 0.75).with_label(-1);
        assert_eq!(p.dim(), 2);
        assert_abs_diff_eq!(p.x(), 0.25);
        assert_abs_diff_eq!(p.y(), 0.75);
        assert_abs_diff_eq!(p.coord(2), 0.0);
        assert_eq!(p.target(), Some(-1.0));
        assert_eq!(p.clone().with_value(2.5).target(), Some(2.5));
    }

    #[test]
    fn test_distance_modes() {
        let a = DVector::from_row_slice(&[0.0, 0.0, 0.0]);
        let b = DVector::from_row_slice(&[3.0, 4.0, 12.0]);
        assert_abs_diff_eq!(DistanceMode::Planar.distance(&a, &b), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(DistanceMode::Spatial.distance(&a, &b), 13.0, epsilon = 1e-12);
    }

    #[test]
    fn test_domain_clamping() {
        let domain = Domain::SYMMETRIC;
        let mut coords = DVector::from_row_slice(&[-7.0, 2.0, 9.5, f64::NAN]);
        domain.clamp(&mut coords);
        assert_eq!(coords.as_slice(), &[-5.0, 2.0, 5.0, -5.0]);
        assert!(domain.contains(&coords));
        assert_eq!(Domain::new(1.0, -1.0), Domain { min: -1.0, max: 1.0 });
    }

    #[test]
    fn test_domain_sampling_stays_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let coords = Domain::UNIT.sample(&mut rng, 3);
            assert_eq!(coords.len(), 3);
            assert!(Domain::UNIT.contains(&coords));
        }
    }
}
