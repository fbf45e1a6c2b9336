//! Panel configuration
//!
//! Initial values for the runtime UI inputs of every panel. Each section
//! deserializes with defaults for missing fields, so a partial JSON document
//! only overrides what it names. Nothing in the kernels reads configuration
//! on its own: panels receive their section at construction time.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::data_structures::dataset::DatasetShape;
use crate::data_structures::point::DistanceMode;
use crate::ml::knn::KnnMode;
use crate::simulation::SimulationError;

/// Bounds for the cluster count slider
pub const MIN_CLUSTERS: usize = 1;
pub const MAX_CLUSTERS: usize = 8;

/// Largest supported KNN heatmap resolution per axis
pub const MAX_GRID_RESOLUTION: usize = 512;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    pub k: usize,
    pub point_count: usize,
    pub shape: DatasetShape,
    pub distance_mode: DistanceMode,
    pub tick_interval_ms: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 3,
            point_count: 100,
            shape: DatasetShape::Clusters,
            distance_mode: DistanceMode::Planar,
            tick_interval_ms: 500,
        }
    }
}

impl KMeansConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmConfig {
    pub points_per_class: usize,
    pub support_tolerance: f64,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            points_per_class: 15,
            support_tolerance: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnConfig {
    pub k: usize,
    pub point_count: usize,
    pub class_count: usize,
    pub grid_resolution: usize,
    pub mode: KnnMode,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self {
            k: 3,
            point_count: 30,
            class_count: 2,
            grid_resolution: 50,
            mode: KnnMode::Classification,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub layer_sizes: Vec<usize>,
    pub learning_rate: f64,
    pub history_capacity: usize,
    pub tick_interval_ms: u64,
    pub inputs: Vec<f64>,
    pub target: Vec<f64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            layer_sizes: vec![2, 4, 4, 1],
            learning_rate: 0.1,
            history_capacity: 50,
            tick_interval_ms: 100,
            inputs: vec![1.0, 0.5],
            target: vec![0.8],
        }
    }
}

impl NetworkConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    pub point_count: usize,
    pub slope: f64,
    pub intercept: f64,
    pub noise: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            point_count: 12,
            slope: 0.8,
            intercept: 0.5,
            noise: 0.6,
        }
    }
}

/// Aggregated configuration for every panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed seed for reproducible sessions; entropy when absent
    pub seed: Option<u64>,
    pub kmeans: KMeansConfig,
    pub svm: SvmConfig,
    pub knn: KnnConfig,
    pub network: NetworkConfig,
    pub regression: RegressionConfig,
}

impl SimulationConfig {
    /// Parses and validates a JSON document
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        info!("Loaded simulation config (seed: {:?})", config.seed);
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Range checks mirroring the UI slider bounds
    pub fn validate(&self) -> Result<(), SimulationError> {
        let kmeans = &self.kmeans;
        if !(MIN_CLUSTERS..=MAX_CLUSTERS).contains(&kmeans.k) {
            return Err(SimulationError::invalid_parameter(
                "kmeans.k",
                format!("must be within {}..={}", MIN_CLUSTERS, MAX_CLUSTERS),
            ));
        }
        if kmeans.point_count == 0 {
            return Err(SimulationError::invalid_parameter(
                "kmeans.point_count",
                "must be positive",
            ));
        }
        if kmeans.tick_interval_ms == 0 {
            return Err(SimulationError::invalid_parameter(
                "kmeans.tick_interval_ms",
                "must be positive",
            ));
        }

        if self.svm.points_per_class == 0 {
            return Err(SimulationError::invalid_parameter(
                "svm.points_per_class",
                "must be positive",
            ));
        }
        if !self.svm.support_tolerance.is_finite() || self.svm.support_tolerance < 0.0 {
            return Err(SimulationError::invalid_parameter(
                "svm.support_tolerance",
                "must be a non-negative number",
            ));
        }

        let knn = &self.knn;
        if knn.k == 0 {
            return Err(SimulationError::invalid_parameter("knn.k", "must be positive"));
        }
        if !(1..=MAX_GRID_RESOLUTION).contains(&knn.grid_resolution) {
            return Err(SimulationError::invalid_parameter(
                "knn.grid_resolution",
                format!("must be within 1..={}", MAX_GRID_RESOLUTION),
            ));
        }
        if !(1..=MAX_CLUSTERS).contains(&knn.class_count) {
            return Err(SimulationError::invalid_parameter(
                "knn.class_count",
                format!("must be within 1..={}", MAX_CLUSTERS),
            ));
        }

        let network = &self.network;
        if network.layer_sizes.len() < 2 || network.layer_sizes.contains(&0) {
            return Err(SimulationError::invalid_parameter(
                "network.layer_sizes",
                "needs an input and an output layer, all non-empty",
            ));
        }
        if !network.learning_rate.is_finite() || network.learning_rate < 0.0 {
            return Err(SimulationError::invalid_parameter(
                "network.learning_rate",
                "must be a non-negative number",
            ));
        }
        if network.history_capacity == 0 {
            return Err(SimulationError::invalid_parameter(
                "network.history_capacity",
                "must be positive",
            ));
        }
        if network.tick_interval_ms == 0 {
            return Err(SimulationError::invalid_parameter(
                "network.tick_interval_ms",
                "must be positive",
            ));
        }
        let input_width = network.layer_sizes[0];
        if network.inputs.len() != input_width {
            return Err(SimulationError::DimensionMismatch {
                expected: input_width,
                actual: network.inputs.len(),
            });
        }
        let output_width = network.layer_sizes[network.layer_sizes.len() - 1];
        if network.target.len() != output_width {
            return Err(SimulationError::DimensionMismatch {
                expected: output_width,
                actual: network.target.len(),
            });
        }

        let regression = &self.regression;
        if !regression.noise.is_finite() || regression.noise < 0.0 {
            return Err(SimulationError::invalid_parameter(
                "regression.noise",
                "must be a non-negative number",
            ));
        }
        if !regression.slope.is_finite() || !regression.intercept.is_finite() {
            return Err(SimulationError::invalid_parameter(
                "regression",
                "slope and intercept must be finite",
            ));
        }

        Ok(())
    }
}
