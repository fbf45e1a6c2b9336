//! Decision line and margin corridor for the SVM panel
//!
//! The boundary `w·x + b = 0` and the two margin lines `w·x + b = ±m` are
//! clipped to the domain; since `w` is a unit normal, `m` is the Euclidean
//! distance from the boundary to each margin line. Support vectors are
//! highlighted in place. A fallback (non-separable) solution is drawn without
//! margin lines.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use mlscope_core::data_structures::point::Point;
use mlscope_core::ml::svm::{Hyperplane, SvmPanel};
use rand::Rng;

use crate::frame::{Frame, LineSegment, ScatterPoint};
use crate::geometry::clip_line;
use crate::palette::{polarity_color, UNASSIGNED};
use crate::view::FrameSource;

const BOUNDARY_WIDTH: f32 = 2.0;
const MARGIN_WIDTH: f32 = 1.0;

/// Boundary segment followed by the margin segments that intersect the domain
pub fn hyperplane_segments(hyperplane: &Hyperplane, frame: &Frame) -> Vec<LineSegment> {
    let (a, b) = (hyperplane.weights.x, hyperplane.weights.y);
    let mut segments = Vec::with_capacity(3);

    if let Some((start, end)) = clip_line(a, b, hyperplane.bias, frame.domain) {
        segments.push(LineSegment::solid(start, end, UNASSIGNED, BOUNDARY_WIDTH));
    }
    if hyperplane.separable && hyperplane.margin > 0.0 {
        for (offset, label) in [(-hyperplane.margin, 1), (hyperplane.margin, -1)] {
            if let Some((start, end)) = clip_line(a, b, hyperplane.bias + offset, frame.domain) {
                segments.push(LineSegment::dashed(start, end, polarity_color(label), MARGIN_WIDTH));
            }
        }
    }
    segments
}

fn is_support_vector(point: &Point, hyperplane: Option<&Hyperplane>) -> bool {
    hyperplane.map_or(false, |h| h.support_vectors.iter().any(|sv| sv.coords == point.coords))
}

impl<R: Rng> FrameSource for SvmPanel<R> {
    fn frame(&mut self) -> Frame {
        let mut frame = Frame::new("Support Vector Machine", self.domain());
        let hyperplane = self.hyperplane();

        for point in self.points() {
            let color = point.label.map(polarity_color).unwrap_or(UNASSIGNED);
            frame.push_point(
                ScatterPoint::planar(point.x(), point.y(), color)
                    .highlighted(is_support_vector(point, hyperplane)),
            );
        }

        match hyperplane {
            Some(h) => {
                for segment in hyperplane_segments(h, &frame) {
                    frame.push_segment(segment);
                }
                frame.push_metric("margin_width", h.margin_width(), 4);
                frame.push_metric("support_vectors", h.support_vectors.len() as f64, 0);
                frame.push_metric("separable", if h.separable { 1.0 } else { 0.0 }, 0);
            }
            None => frame.push_metric("support_vectors", 0.0, 0),
        }
        frame
    }
}
