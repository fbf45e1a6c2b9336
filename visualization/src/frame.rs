//! Render-ready snapshot of one panel
//!
//! A frame is everything a host renderer needs for one redraw: scatter
//! points with colours and markers, line segments already clipped to the
//! domain, an optional grid of classified cells and the scalar readouts shown
//! next to the plot. Coordinates are in domain units; the host maps them to
//! pixels.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use mlscope_core::data_structures::point::Domain;
use serde::{Deserialize, Serialize};

use crate::palette::Rgba;
use crate::view::ViewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Dot,
    Centroid,
    Neuron,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Depth axis, zero for planar panels
    pub z: f64,
    pub color: Rgba,
    pub marker: Marker,
    pub highlighted: bool,
}

impl ScatterPoint {
    pub fn planar(x: f64, y: f64, color: Rgba) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            color,
            marker: Marker::Dot,
            highlighted: false,
        }
    }

    pub fn with_depth(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    pub fn highlighted(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: [f64; 2],
    pub end: [f64; 2],
    pub color: Rgba,
    pub width: f32,
    pub style: LineStyle,
}

impl LineSegment {
    pub fn solid(start: [f64; 2], end: [f64; 2], color: Rgba, width: f32) -> Self {
        Self {
            start,
            end,
            color,
            width,
            style: LineStyle::Solid,
        }
    }

    pub fn dashed(start: [f64; 2], end: [f64; 2], color: Rgba, width: f32) -> Self {
        Self {
            style: LineStyle::Dashed,
            ..Self::solid(start, end, color, width)
        }
    }

    pub fn length(&self) -> f64 {
        (self.end[0] - self.start[0]).hypot(self.end[1] - self.start[1])
    }
}

/// Row-major grid of cells; row 0 sits at the domain minimum on the y axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellGrid {
    pub columns: usize,
    pub rows: usize,
    pub origin: [f64; 2],
    pub cell_size: f64,
    pub values: Vec<Option<f32>>,
    pub colors: Vec<Option<Rgba>>,
}

impl CellGrid {
    pub fn value(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.rows || col >= self.columns {
            return None;
        }
        self.values[row * self.columns + col]
    }

    pub fn color(&self, row: usize, col: usize) -> Option<Rgba> {
        if row >= self.rows || col >= self.columns {
            return None;
        }
        self.colors[row * self.columns + col]
    }
}

/// Scalar value with its display text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReadout {
    pub name: String,
    pub value: f64,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub title: String,
    pub domain: Domain,
    pub points: Vec<ScatterPoint>,
    pub segments: Vec<LineSegment>,
    pub grid: Option<CellGrid>,
    pub metrics: Vec<MetricReadout>,
}

impl Frame {
    pub fn new(title: &str, domain: Domain) -> Self {
        Self {
            title: title.to_owned(),
            domain,
            points: Vec::new(),
            segments: Vec::new(),
            grid: None,
            metrics: Vec::new(),
        }
    }

    pub fn push_point(&mut self, point: ScatterPoint) {
        self.points.push(point);
    }

    pub fn push_segment(&mut self, segment: LineSegment) {
        self.segments.push(segment);
    }

    pub fn set_grid(&mut self, grid: CellGrid) {
        self.grid = Some(grid);
    }

    /// Adds a readout shown with `precision` decimals
    pub fn push_metric(&mut self, name: &str, value: f64, precision: usize) {
        self.metrics.push(MetricReadout {
            name: name.to_owned(),
            value,
            display: format!("{:.*}", precision, value),
        });
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.iter().find(|m| m.name == name).map(|m| m.value)
    }

    pub fn highlighted_points(&self) -> impl Iterator<Item = &ScatterPoint> + '_ {
        self.points.iter().filter(|p| p.highlighted)
    }

    pub fn to_json(&self) -> Result<String, ViewError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::class_color;

    #[test]
    fn test_metric_display_precision() {
        let mut frame = Frame::new("test", Domain::UNIT);
        frame.push_metric("inertia", 1.23456, 2);
        frame.push_metric("iteration", 7.0, 0);

        assert_eq!(frame.metrics[0].display, "1.23");
        assert_eq!(frame.metrics[1].display, "7");
        assert_eq!(frame.metric("iteration"), Some(7.0));
        assert_eq!(frame.metric("missing"), None);
    }

    #[test]
    fn test_json_uses_snake_case_enums() {
        let mut frame = Frame::new("k-means", Domain::UNIT);
        frame.push_point(
            ScatterPoint::planar(0.5, 0.5, class_color(0)).with_marker(Marker::Centroid),
        );
        frame.push_segment(LineSegment::dashed([0.0, 0.0], [1.0, 1.0], class_color(1), 1.0));

        let json = frame.to_json().unwrap();
        assert!(json.contains("\"marker\":\"centroid\""));
        assert!(json.contains("\"style\":\"dashed\""));
        assert!(json.contains("\"grid\":null"));

        let parsed: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn test_cell_grid_lookup() {
        let grid = CellGrid {
            columns: 2,
            rows: 1,
            origin: [0.0, 0.0],
            cell_size: 0.5,
            values: vec![Some(0.0), None],
            colors: vec![Some(class_color(0)), None],
        };
        assert_eq!(grid.value(0, 0), Some(0.0));
        assert_eq!(grid.value(0, 1), None);
        assert_eq!(grid.color(1, 0), None);
    }
}
