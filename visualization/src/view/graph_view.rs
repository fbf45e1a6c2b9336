//! Layered drawing of the toy network
//!
//! Layers are spread evenly across the x axis and the neurons of each layer
//! evenly along y. Neuron colour follows its activation; connection colour
//! follows the weight's sign and line width its magnitude relative to the
//! largest weight in the network.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use mlscope_core::data_structures::point::Domain;
use mlscope_core::ml::network::{NetworkGraph, ToyNetworkTrainer};
use nalgebra::Point2;
use rand::Rng;

use crate::frame::{Frame, LineSegment, Marker, ScatterPoint};
use crate::palette::{normalize, sample_gradient, SIGNED_GRADIENT, VALUE_GRADIENT};
use crate::view::FrameSource;

const MIN_CONNECTION_WIDTH: f32 = 0.5;
const MAX_CONNECTION_WIDTH: f32 = 3.0;

/// Window for the smoothed accuracy readout
const ACCURACY_WINDOW: usize = 10;

/// Neuron positions in the unit square, indexed by neuron id
pub fn layered_layout(graph: &NetworkGraph) -> Vec<Point2<f64>> {
    let layers = graph.layer_count() as f64;
    let mut positions = vec![Point2::origin(); graph.neurons().len()];
    for (layer, &size) in graph.layer_sizes().iter().enumerate() {
        let x = (layer as f64 + 0.5) / layers;
        for (slot, neuron) in graph.layer(layer).iter().enumerate() {
            positions[neuron.id] = Point2::new(x, (slot as f64 + 0.5) / size as f64);
        }
    }
    positions
}

/// Neuron markers and weighted connection segments
pub fn network_frame(graph: &NetworkGraph, title: &str) -> Frame {
    let mut frame = Frame::new(title, Domain::UNIT);
    let positions = layered_layout(graph);

    let max_weight = graph
        .connections()
        .iter()
        .map(|c| c.weight.abs())
        .fold(0.0_f64, f64::max);
    for connection in graph.connections() {
        let (from, to) = (positions[connection.from], positions[connection.to]);
        let color = sample_gradient(
            &SIGNED_GRADIENT,
            normalize(connection.weight, (-max_weight, max_weight)),
        );
        let strength = if max_weight > 0.0 {
            (connection.weight.abs() / max_weight) as f32
        } else {
            0.0
        };
        let width = MIN_CONNECTION_WIDTH + (MAX_CONNECTION_WIDTH - MIN_CONNECTION_WIDTH) * strength;
        frame.push_segment(LineSegment::solid([from.x, from.y], [to.x, to.y], color, width));
    }

    let max_activation = graph
        .neurons()
        .iter()
        .map(|n| n.activation.abs())
        .fold(0.0_f64, f64::max);
    for neuron in graph.neurons() {
        let position = positions[neuron.id];
        let color = sample_gradient(
            &VALUE_GRADIENT,
            normalize(neuron.activation, (0.0, max_activation)),
        );
        frame.push_point(
            ScatterPoint::planar(position.x, position.y, color).with_marker(Marker::Neuron),
        );
    }
    frame
}

impl<R: Rng> FrameSource for ToyNetworkTrainer<R> {
    fn frame(&mut self) -> Frame {
        let mut frame = network_frame(self.network(), "Neural Network Training");
        frame.push_metric("epoch", self.epoch() as f64, 0);
        if let Some(step) = self.last_step() {
            frame.push_metric("loss", step.loss, 4);
            frame.push_metric("accuracy", step.accuracy, 1);
        }
        if let Some(average) = self.accuracy_history().moving_average(ACCURACY_WINDOW) {
            frame.push_metric("accuracy_average", average, 1);
        }
        frame.push_metric("learning_rate", self.learning_rate(), 3);
        frame
    }
}
