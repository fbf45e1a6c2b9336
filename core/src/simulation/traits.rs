//! Core simulation trait definitions for the MLSCOPE observatory
//!
//! This module establishes the foundational trait system shared by every
//! simulation panel: typed kernel identifiers, parameter descriptors with
//! range constraints, scalar metric snapshots, and the error taxonomy used
//! at the parameter/configuration boundary.
//!
//! # Key Design Principles
//! - Kernel contract failures (empty inputs, degenerate geometry) are values,
//!   never errors: they surface as `None` or as a fallback result
//! - Errors are reserved for malformed runtime input (parameters, configs,
//!   point edits)
//! - Parameters are exposed as strings so that any UI control can bind to them
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Universal kernel identifier for type-safe dispatch
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct KernelId(String);

impl KernelId {
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kernel parameter with strongly typed values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelParameter {
    pub name: String,
    pub value: String,
    pub value_type: ParameterType,
    pub constraints: Option<ParameterConstraints>,
}

impl KernelParameter {
    /// Integer parameter bounded to `[min, max]`
    pub fn integer(name: &str, value: usize, min: usize, max: usize) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_string(),
            value_type: ParameterType::Integer,
            constraints: Some(ParameterConstraints {
                min: Some(min as f64),
                max: Some(max as f64),
                allowed_values: None,
            }),
        }
    }

    /// Float parameter with optional bounds
    pub fn float(name: &str, value: f64, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_string(),
            value_type: ParameterType::Float,
            constraints: Some(ParameterConstraints {
                min,
                max,
                allowed_values: None,
            }),
        }
    }

    /// Enumerated parameter restricted to `variants`
    pub fn choice(name: &str, value: &str, variants: &[&str]) -> Self {
        let variants: Vec<String> = variants.iter().map(|v| (*v).to_owned()).collect();
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
            value_type: ParameterType::Enum(variants.clone()),
            constraints: Some(ParameterConstraints {
                min: None,
                max: None,
                allowed_values: Some(variants),
            }),
        }
    }
}

/// Parameter type enumeration for type-safe parameter handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterType {
    Integer,
    Float,
    Enum(Vec<String>),
}

/// Parameter constraints for validating kernel parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterConstraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allowed_values: Option<Vec<String>>,
}

/// Error types for the parameter, configuration and editing boundary
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Point index out of range: {0}")]
    PointOutOfRange(usize),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl SimulationError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Parses an integer parameter value
pub fn parse_usize(name: &str, value: &str) -> Result<usize, SimulationError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|e| SimulationError::invalid_parameter(name, e.to_string()))
}

/// Parses a float parameter value, rejecting NaN and infinities
pub fn parse_f64(name: &str, value: &str) -> Result<f64, SimulationError> {
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|e| SimulationError::invalid_parameter(name, e.to_string()))?;
    if !parsed.is_finite() {
        return Err(SimulationError::invalid_parameter(name, "value must be finite"));
    }
    Ok(parsed)
}

/// Scalar metrics snapshot published after every step for textual display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    pub kernel: KernelId,
    pub steps_executed: usize,
    pub scalars: BTreeMap<String, f64>,
}

impl SimulationMetrics {
    pub fn new(kernel: KernelId, steps_executed: usize) -> Self {
        Self {
            kernel,
            steps_executed,
            scalars: BTreeMap::new(),
        }
    }

    /// Builder-style scalar insertion
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.scalars.insert(name.to_owned(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.scalars.get(name).copied()
    }
}

/// Kernel complexity information shown next to each panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelComplexity {
    pub time_complexity: String,
    pub space_complexity: String,
}

impl KernelComplexity {
    pub fn new(time: &str, space: &str) -> Self {
        Self {
            time_complexity: time.to_owned(),
            space_complexity: space.to_owned(),
        }
    }
}

/// Main trait implemented by every simulation panel
///
/// # Invariants
/// - `set_parameter` either applies a validated value or returns an error
///   leaving the panel untouched
/// - Parameters that change the structure of the simulation (`k`, dataset
///   shape, topology) trigger a full re-initialization
pub trait SimulationKernel {
    /// Returns the kernel's unique identifier
    fn id(&self) -> KernelId;

    /// Returns the kernel's descriptive name
    fn name(&self) -> &'static str;

    /// Returns the kernel's category (e.g. clustering, classification)
    fn category(&self) -> &'static str;

    /// Returns a short pedagogical description
    fn description(&self) -> String;

    /// Returns the asymptotic cost of one step
    fn complexity(&self) -> KernelComplexity;

    /// Returns supported parameters with type information
    fn parameters(&self) -> Vec<KernelParameter>;

    /// Sets a parameter from its string representation
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), SimulationError>;

    /// Gets a parameter value
    fn get_parameter(&self, name: &str) -> Option<String> {
        self.parameters()
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
    }

    /// Current scalar metrics for textual display
    fn metrics(&self) -> SimulationMetrics;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_id_uniqueness() {
        let id1 = KernelId::new("kmeans");
        let id2 = KernelId::new("svm");
        let id3 = KernelId::new("kmeans");

        assert_ne!(id1, id2);
        assert_eq!(id1, id3);
        assert_eq!(id1.to_string(), "kmeans");
    }

    #[test]
    fn test_parameter_constraints() {
        let param = KernelParameter::integer("k", 3, 1, 8);
        assert_eq!(param.value, "3");
        assert_eq!(param.value_type, ParameterType::Integer);

        let constraints = param.constraints.unwrap();
        assert_eq!(constraints.min, Some(1.0));
        assert_eq!(constraints.max, Some(8.0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_usize("k", " 4 ").unwrap(), 4);
        assert!(parse_usize("k", "four").is_err());
        assert!(parse_f64("rate", "NaN").is_err());
        assert!(matches!(
            parse_f64("rate", "x"),
            Err(SimulationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_metrics_builder() {
        let metrics = SimulationMetrics::new(KernelId::new("knn"), 2)
            .with("k", 5.0)
            .with("accuracy", 80.0);
        assert_eq!(metrics.get("k"), Some(5.0));
        assert_eq!(metrics.get("missing"), None);
        assert_eq!(metrics.steps_executed, 2);
    }
}
