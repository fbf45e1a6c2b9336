//! Scatter plots for the clustering and regression panels
//!
//! K-Means points take the colour of their cluster (grey until the first
//! assignment) and centroids are drawn as larger markers in the same colour.
//! The regression view adds the fitted line clipped to the domain and a
//! dashed residual from every point to it.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::trace;
use mlscope_core::data_structures::point::DistanceMode;
use mlscope_core::ml::kmeans::KMeansSimulation;
use mlscope_core::ml::regression::RegressionPanel;
use rand::Rng;

use crate::frame::{Frame, LineSegment, Marker, ScatterPoint};
use crate::geometry::clip_graph;
use crate::palette::{class_color, with_alpha, NEGATIVE_CLASS, POSITIVE_CLASS, UNASSIGNED};
use crate::view::FrameSource;

const FIT_LINE_WIDTH: f32 = 2.0;
const RESIDUAL_WIDTH: f32 = 1.0;

impl<R: Rng> FrameSource for KMeansSimulation<R> {
    fn frame(&mut self) -> Frame {
        let mut frame = Frame::new("K-Means Clustering", self.domain());
        let spatial = self.distance_mode() == DistanceMode::Spatial;

        for point in self.points() {
            let color = point.cluster.map(class_color).unwrap_or(UNASSIGNED);
            let mut scatter = ScatterPoint::planar(point.x(), point.y(), color);
            if spatial {
                scatter = scatter.with_depth(point.coord(2));
            }
            frame.push_point(scatter);
        }

        for centroid in self.centroids() {
            let coord = |axis: usize| centroid.coords.get(axis).copied().unwrap_or(0.0);
            let color = class_color(centroid.color.as_usize());
            let mut marker =
                ScatterPoint::planar(coord(0), coord(1), color).with_marker(Marker::Centroid);
            if spatial {
                marker = marker.with_depth(coord(2));
            }
            frame.push_point(marker);
        }

        frame.push_metric("iteration", self.iteration() as f64, 0);
        frame.push_metric("k", self.k() as f64, 0);
        frame.push_metric("inertia", self.inertia(), 4);
        frame.push_metric("empty_clusters", self.empty_clusters() as f64, 0);
        trace!("K-Means frame with {} markers", frame.points.len());
        frame
    }
}

impl<R: Rng> FrameSource for RegressionPanel<R> {
    fn frame(&mut self) -> Frame {
        let domain = self.domain();
        let model = self.model();
        let mut frame = Frame::new("Linear Regression", domain);

        for point in self.points() {
            frame.push_point(ScatterPoint::planar(point.x(), point.y(), POSITIVE_CLASS));
            let fitted = domain.clamp_value(model.predict(point.x()));
            frame.push_segment(LineSegment::dashed(
                [point.x(), point.y()],
                [point.x(), fitted],
                with_alpha(UNASSIGNED, 0.6),
                RESIDUAL_WIDTH,
            ));
        }

        if let Some((start, end)) = clip_graph(model.slope, model.intercept, domain) {
            frame.push_segment(LineSegment::solid(start, end, NEGATIVE_CLASS, FIT_LINE_WIDTH));
        }

        frame.push_metric("slope", model.slope, 3);
        frame.push_metric("intercept", model.intercept, 3);
        frame.push_metric("r_squared", model.r_squared, 3);
        frame.push_metric("points", self.points().len() as f64, 0);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::LineStyle;
    use approx::assert_abs_diff_eq;
    use mlscope_core::config::{KMeansConfig, RegressionConfig};
    use mlscope_core::data_structures::rng::seeded;

    #[test]
    fn test_kmeans_frame_colours_points_by_cluster() {
        let config = KMeansConfig {
            k: 4,
            point_count: 60,
            ..KMeansConfig::default()
        };
        let mut panel = KMeansSimulation::new(&config, seeded(10));
        let before = panel.frame();
        assert_eq!(before.points.len(), 64);
        assert!(before.points[..60].iter().all(|p| p.color == UNASSIGNED));

        panel.step();
        let after = panel.frame();
        let centroids: Vec<_> = after
            .points
            .iter()
            .filter(|p| p.marker == Marker::Centroid)
            .collect();
        assert_eq!(centroids.len(), 4);
        assert!(after.points[..60].iter().all(|p| p.color != UNASSIGNED));
        assert_eq!(after.metric("iteration"), Some(1.0));
        assert!(after.grid.is_none());
    }

    #[test]
    fn test_spatial_mode_carries_depth() {
        let config = KMeansConfig {
            distance_mode: DistanceMode::Spatial,
            ..KMeansConfig::default()
        };
        let mut panel = KMeansSimulation::new(&config, seeded(3));
        let frame = panel.frame();
        assert!(frame.points.iter().any(|p| p.z > 0.0));
    }

    #[test]
    fn test_regression_frame_draws_clipped_fit() {
        let mut panel = RegressionPanel::new(&RegressionConfig::default(), seeded(6));
        panel.clear();
        panel.add_point(-1.0, 1.0);
        panel.add_point(1.0, 5.0);

        let frame = panel.frame();
        let fit: Vec<_> = frame.segments.iter().filter(|s| s.style == LineStyle::Solid).collect();
        assert_eq!(fit.len(), 1);
        for end in [fit[0].start, fit[0].end] {
            assert!(end.iter().all(|v| (-5.0..=5.0).contains(v)));
            assert_abs_diff_eq!(end[1], 2.0 * end[0] + 3.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(frame.metric("slope").unwrap(), 2.0, epsilon = 1e-12);
        assert_eq!(frame.metric("r_squared"), Some(1.0));
    }
}
