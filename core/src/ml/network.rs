//! Toy feed-forward network with a noisy error-driven update
//!
//! # Mathematical Foundation
//!
//! Forward pass, layer by layer, with no bias term:
//!
//! ```text
//! a_j = ReLU(Σ_i w_ij · a_i)
//! ```
//!
//! Training is not backpropagation. After a forward pass the
//! elementwise error `e = target − output` is computed and every weight is
//! nudged by
//!
//! ```text
//! w ← w + η · e_0 · ξ,    ξ ~ U[0, 0.5)
//! ```
//!
//! so all weights drift in the direction of the first output's error. The
//! output trends toward the target but stays noisy from epoch to epoch.
//!
//! # Performance Characteristics
//!
//! - Forward pass: O(C) for C connections
//! - Update: O(C)
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::ops::Range;
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::NetworkConfig;
use crate::data_structures::rng::SimRng;
use crate::execution::history::MetricHistory;
use crate::execution::runner::Steppable;
use crate::simulation::{
    parse_f64, parse_usize, KernelComplexity, KernelId, KernelParameter, RunControl, RunState,
    SimulationError, SimulationKernel, SimulationMetrics,
};

/// Upper bound of the uniform perturbation applied to each weight update
pub const UPDATE_NOISE_SCALE: f64 = 0.5;

/// Range of freshly initialized weights
const INITIAL_WEIGHT_RANGE: Range<f64> = -1.0..1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub id: usize,
    pub layer: usize,
    pub activation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

/// Serialized form of a `NetworkGraph`: the topology plus one weight per
/// connection in connection order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub layer_sizes: Vec<usize>,
    pub weights: Vec<f64>,
}

/// Fully connected layered graph. Neuron ids are assigned layer by layer and
/// connections are grouped by destination layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphSnapshot", into = "GraphSnapshot")]
pub struct NetworkGraph {
    layer_sizes: Vec<usize>,
    neurons: Vec<Neuron>,
    connections: Vec<Connection>,
    layer_offsets: Vec<usize>,
    incoming: Vec<Range<usize>>,
}

impl NetworkGraph {
    /// Builds the topology with every weight set to zero
    pub fn new(layer_sizes: &[usize]) -> Result<Self, SimulationError> {
        if layer_sizes.len() < 2 || layer_sizes.contains(&0) {
            return Err(SimulationError::invalid_parameter(
                "layer_sizes",
                "needs an input and an output layer, all non-empty",
            ));
        }

        let mut layer_offsets = Vec::with_capacity(layer_sizes.len());
        let mut neurons = Vec::new();
        for (layer, &size) in layer_sizes.iter().enumerate() {
            layer_offsets.push(neurons.len());
            for _ in 0..size {
                neurons.push(Neuron {
                    id: neurons.len(),
                    layer,
                    activation: 0.0,
                });
            }
        }

        let mut connections = Vec::new();
        let mut incoming = vec![0..0];
        for layer in 1..layer_sizes.len() {
            let start = connections.len();
            let sources =
                layer_offsets[layer - 1]..layer_offsets[layer - 1] + layer_sizes[layer - 1];
            let targets = layer_offsets[layer]..layer_offsets[layer] + layer_sizes[layer];
            for to in targets {
                for from in sources.clone() {
                    connections.push(Connection { from, to, weight: 0.0 });
                }
            }
            incoming.push(start..connections.len());
        }

        Ok(Self {
            layer_sizes: layer_sizes.to_vec(),
            neurons,
            connections,
            layer_offsets,
            incoming,
        })
    }

    /// Same topology with weights drawn from U[-1, 1)
    pub fn randomized<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        rng: &mut R,
    ) -> Result<Self, SimulationError> {
        let mut graph = Self::new(layer_sizes)?;
        graph.randomize(rng);
        Ok(graph)
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for connection in &mut self.connections {
            connection.weight = rng.gen_range(INITIAL_WEIGHT_RANGE);
        }
        for neuron in &mut self.neurons {
            neuron.activation = 0.0;
        }
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn layer_count(&self) -> usize {
        self.layer_sizes.len()
    }

    pub fn input_width(&self) -> usize {
        self.layer_sizes[0]
    }

    pub fn output_width(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Neurons of one layer; empty past the output layer
    pub fn layer(&self, layer: usize) -> &[Neuron] {
        match self.layer_sizes.get(layer) {
            Some(&size) => {
                let start = self.layer_offsets[layer];
                &self.neurons[start..start + size]
            }
            None => &[],
        }
    }

    pub fn weights(&self) -> Vec<f64> {
        self.connections.iter().map(|c| c.weight).collect()
    }

    pub fn set_all_weights(&mut self, weight: f64) {
        for connection in &mut self.connections {
            connection.weight = weight;
        }
    }

    /// Activations of the output layer from the last forward pass
    pub fn outputs(&self) -> Vec<f64> {
        self.layer(self.layer_count() - 1)
            .iter()
            .map(|n| n.activation)
            .collect()
    }

    pub fn forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>, SimulationError> {
        if inputs.len() != self.input_width() {
            return Err(SimulationError::DimensionMismatch {
                expected: self.input_width(),
                actual: inputs.len(),
            });
        }
        Ok(self.propagate(inputs))
    }

    fn propagate(&mut self, inputs: &[f64]) -> Vec<f64> {
        for (neuron, &value) in self.neurons.iter_mut().zip(inputs) {
            neuron.activation = value;
        }

        for layer in 1..self.layer_count() {
            let offset = self.layer_offsets[layer];
            let mut sums = vec![0.0; self.layer_sizes[layer]];
            for connection in &self.connections[self.incoming[layer].clone()] {
                let source = self.neurons[connection.from].activation;
                sums[connection.to - offset] += connection.weight * source;
            }
            for (i, sum) in sums.into_iter().enumerate() {
                self.neurons[offset + i].activation = sum.max(0.0);
            }
        }

        self.outputs()
    }
}

impl TryFrom<GraphSnapshot> for NetworkGraph {
    type Error = SimulationError;

    fn try_from(snapshot: GraphSnapshot) -> Result<Self, Self::Error> {
        let mut graph = Self::new(&snapshot.layer_sizes)?;
        if snapshot.weights.len() != graph.connections.len() {
            return Err(SimulationError::DimensionMismatch {
                expected: graph.connections.len(),
                actual: snapshot.weights.len(),
            });
        }
        for (connection, weight) in graph.connections.iter_mut().zip(snapshot.weights) {
            connection.weight = weight;
        }
        Ok(graph)
    }
}

impl From<NetworkGraph> for GraphSnapshot {
    fn from(graph: NetworkGraph) -> Self {
        Self {
            weights: graph.weights(),
            layer_sizes: graph.layer_sizes,
        }
    }
}

/// Result of one training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStep {
    pub epoch: usize,
    pub outputs: Vec<f64>,
    pub loss: f64,
    pub accuracy: f64,
}

/// Trainer panel owning one network, its training loop state and chart history
#[derive(Debug, Clone)]
pub struct ToyNetworkTrainer<R: Rng = SimRng> {
    network: NetworkGraph,
    inputs: Vec<f64>,
    target: Vec<f64>,
    learning_rate: f64,
    control: RunControl,
    accuracy_history: MetricHistory,
    loss_history: MetricHistory,
    last_step: Option<TrainingStep>,
    tick_interval: Duration,
    rng: R,
}

impl<R: Rng> ToyNetworkTrainer<R> {
    pub fn new(config: &NetworkConfig, mut rng: R) -> Result<Self, SimulationError> {
        let network = NetworkGraph::randomized(&config.layer_sizes, &mut rng)?;
        let mut trainer = Self {
            network,
            inputs: Vec::new(),
            target: Vec::new(),
            learning_rate: 0.0,
            control: RunControl::new(),
            accuracy_history: MetricHistory::with_capacity(config.history_capacity),
            loss_history: MetricHistory::with_capacity(config.history_capacity),
            last_step: None,
            tick_interval: config.tick_interval(),
            rng,
        };
        trainer.set_inputs(&config.inputs)?;
        trainer.set_target(&config.target)?;
        trainer.set_learning_rate(config.learning_rate);
        info!("Network trainer ready with topology {:?}", config.layer_sizes);
        Ok(trainer)
    }

    pub fn network(&self) -> &NetworkGraph {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut NetworkGraph {
        &mut self.network
    }

    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn epoch(&self) -> usize {
        self.control.iteration()
    }

    pub fn state(&self) -> RunState {
        self.control.state()
    }

    pub fn accuracy_history(&self) -> &MetricHistory {
        &self.accuracy_history
    }

    pub fn loss_history(&self) -> &MetricHistory {
        &self.loss_history
    }

    pub fn last_step(&self) -> Option<&TrainingStep> {
        self.last_step.as_ref()
    }

    pub fn set_inputs(&mut self, inputs: &[f64]) -> Result<(), SimulationError> {
        if inputs.len() != self.network.input_width() {
            return Err(SimulationError::DimensionMismatch {
                expected: self.network.input_width(),
                actual: inputs.len(),
            });
        }
        self.inputs = inputs.to_vec();
        Ok(())
    }

    pub fn set_target(&mut self, target: &[f64]) -> Result<(), SimulationError> {
        if target.len() != self.network.output_width() {
            return Err(SimulationError::DimensionMismatch {
                expected: self.network.output_width(),
                actual: target.len(),
            });
        }
        self.target = target.to_vec();
        Ok(())
    }

    /// Negative or non-finite rates become zero
    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        if learning_rate.is_finite() && learning_rate >= 0.0 {
            self.learning_rate = learning_rate;
        } else {
            warn!("Learning rate {} clamped to 0", learning_rate);
            self.learning_rate = 0.0;
        }
    }

    pub fn set_tick_interval(&mut self, interval: Duration) {
        self.tick_interval = interval;
    }

    pub fn start(&mut self) -> bool {
        self.control.start()
    }

    pub fn pause(&mut self) -> bool {
        self.control.pause()
    }

    /// Fresh random weights, epoch zero and empty charts
    pub fn reset(&mut self) {
        self.control.reset();
        self.network.randomize(&mut self.rng);
        self.accuracy_history.clear();
        self.loss_history.clear();
        self.last_step = None;
        debug!("Network trainer reset");
    }

    /// One forward pass followed by the noisy update
    pub fn train_step(&mut self) -> TrainingStep {
        let outputs = self.network.propagate(&self.inputs);
        let errors: Vec<f64> = self
            .target
            .iter()
            .zip(&outputs)
            .map(|(target, output)| target - output)
            .collect();

        let count = errors.len().max(1) as f64;
        let loss = errors.iter().map(|e| e * e).sum::<f64>() / count;
        let mean_abs_error = errors.iter().map(|e| e.abs()).sum::<f64>() / count;
        let accuracy = (100.0 * (1.0 - mean_abs_error)).clamp(0.0, 100.0);

        let lead_error = errors.first().copied().unwrap_or(0.0);
        if self.learning_rate > 0.0 {
            for connection in &mut self.network.connections {
                let noise = self.rng.gen::<f64>() * UPDATE_NOISE_SCALE;
                connection.weight += self.learning_rate * lead_error * noise;
            }
        }

        let epoch = self.control.record_step();
        debug!("Epoch {}: loss = {:.6}, accuracy = {:.1}%", epoch, loss, accuracy);
        self.accuracy_history.push(epoch, accuracy);
        self.loss_history.push(epoch, loss);

        let step = TrainingStep {
            epoch,
            outputs,
            loss,
            accuracy,
        };
        self.last_step = Some(step.clone());
        step
    }
}

impl<R: Rng> SimulationKernel for ToyNetworkTrainer<R> {
    fn id(&self) -> KernelId {
        KernelId::new("network")
    }

    fn name(&self) -> &'static str {
        "Feed-Forward Network"
    }

    fn category(&self) -> &'static str {
        "neural_network"
    }

    fn description(&self) -> String {
        format!(
            "ReLU network {:?} trained with a noisy error-driven update",
            self.network.layer_sizes()
        )
    }

    fn complexity(&self) -> KernelComplexity {
        KernelComplexity::new("O(C) per epoch", "O(N + C)")
    }

    fn parameters(&self) -> Vec<KernelParameter> {
        vec![
            KernelParameter::float("learning_rate", self.learning_rate, Some(0.0), Some(1.0)),
            KernelParameter::integer(
                "tick_interval_ms",
                self.tick_interval.as_millis() as usize,
                1,
                5000,
            ),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), SimulationError> {
        match name {
            "learning_rate" => self.set_learning_rate(parse_f64(name, value)?),
            "tick_interval_ms" => {
                let millis = parse_usize(name, value)?.max(1);
                self.set_tick_interval(Duration::from_millis(millis as u64));
            }
            _ => return Err(SimulationError::invalid_parameter(name, "unknown parameter")),
        }
        Ok(())
    }

    fn metrics(&self) -> SimulationMetrics {
        let mut metrics =
            SimulationMetrics::new(self.id(), self.epoch()).with("epoch", self.epoch() as f64);
        if let Some(step) = &self.last_step {
            metrics = metrics.with("loss", step.loss).with("accuracy", step.accuracy);
        }
        metrics
    }
}

impl<R: Rng + Send> Steppable for ToyNetworkTrainer<R> {
    fn is_running(&self) -> bool {
        self.control.is_running()
    }

    fn tick(&mut self) -> Option<SimulationMetrics> {
        if !self.control.is_running() {
            return None;
        }
        self.train_step();
        Some(self.metrics())
    }

    fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}
