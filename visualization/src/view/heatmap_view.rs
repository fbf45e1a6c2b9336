//! Heatmap rendering for the KNN decision regions
//!
//! Any scalar field exposed through `HeatmapDataSource` can be turned into a
//! `CellGrid`. Class grids are coloured categorically with the class palette;
//! continuous fields (KNN regression) are mapped through a colour gradient
//! over the source's value range.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;
use mlscope_core::data_structures::point::Domain;
use mlscope_core::ml::knn::{DecisionGrid, KnnMode, KnnPanel, RegressionSurface};
use rand::Rng;
use rayon::prelude::*;

use crate::frame::{CellGrid, Frame, ScatterPoint};
use crate::palette::{
    label_color, normalize, sample_gradient, with_alpha, Rgba, UNASSIGNED, VALUE_GRADIENT,
};
use crate::view::FrameSource;

/// Data source for heatmap visualization
pub trait HeatmapDataSource: Send + Sync {
    /// Get data dimensions (columns, rows)
    fn dimensions(&self) -> (usize, usize);

    /// Get data value at column `x`, row `y`
    fn value_at(&self, x: usize, y: usize) -> Option<f32>;

    /// Get value range (min, max)
    fn value_range(&self) -> (f32, f32);

    /// Domain covered by the grid
    fn domain(&self) -> Domain;

    /// Get data label (optional)
    fn label(&self) -> Option<&str> {
        None
    }
}

impl HeatmapDataSource for DecisionGrid {
    fn dimensions(&self) -> (usize, usize) {
        (self.resolution(), self.resolution())
    }

    fn value_at(&self, x: usize, y: usize) -> Option<f32> {
        self.get(y, x).map(|label| label as f32)
    }

    fn value_range(&self) -> (f32, f32) {
        let counts = self.class_counts();
        match (counts.keys().next(), counts.keys().next_back()) {
            (Some(&min), Some(&max)) => (min as f32, max as f32),
            _ => (0.0, 0.0),
        }
    }

    fn domain(&self) -> Domain {
        DecisionGrid::domain(self)
    }

    fn label(&self) -> Option<&str> {
        Some("decision regions")
    }
}

impl HeatmapDataSource for RegressionSurface {
    fn dimensions(&self) -> (usize, usize) {
        (self.resolution(), self.resolution())
    }

    fn value_at(&self, x: usize, y: usize) -> Option<f32> {
        self.get(y, x).map(|v| v as f32)
    }

    fn value_range(&self) -> (f32, f32) {
        RegressionSurface::value_range(self)
            .map_or((0.0, 0.0), |(min, max)| (min as f32, max as f32))
    }

    fn domain(&self) -> Domain {
        RegressionSurface::domain(self)
    }

    fn label(&self) -> Option<&str> {
        Some("neighbour average")
    }
}

/// Color mapping mode for heatmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMapMode {
    /// Values are class labels looked up in the class palette
    Categorical,

    /// Linear mapping from value range to the colour gradient
    Linear,
}

/// Configuration for heatmap visualization
#[derive(Debug, Clone)]
pub struct HeatmapViewConfig {
    pub color_map: ColorMapMode,

    /// Colour gradient for `Linear` mapping
    pub color_gradient: Vec<Rgba>,

    /// Value range mapping (min, max), None for auto-detect
    pub value_range: Option<(f32, f32)>,

    /// Cell opacity so training points stay visible on top
    pub cell_alpha: f32,
}

impl Default for HeatmapViewConfig {
    fn default() -> Self {
        Self {
            color_map: ColorMapMode::Categorical,
            color_gradient: VALUE_GRADIENT.to_vec(),
            value_range: None,
            cell_alpha: 0.35,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeatmapView {
    config: HeatmapViewConfig,
}

impl HeatmapView {
    pub fn new(config: HeatmapViewConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeatmapViewConfig {
        &self.config
    }

    fn color_for(&self, value: f32, range: (f32, f32)) -> Rgba {
        let color = match self.config.color_map {
            ColorMapMode::Categorical => label_color(value.round() as i32),
            ColorMapMode::Linear => sample_gradient(
                &self.config.color_gradient,
                normalize(value as f64, (range.0 as f64, range.1 as f64)),
            ),
        };
        with_alpha(color, self.config.cell_alpha)
    }

    /// Rasterize a data source into render cells
    pub fn build_grid<S: HeatmapDataSource + ?Sized>(&self, source: &S) -> CellGrid {
        let (columns, rows) = source.dimensions();
        let domain = source.domain();
        let range = self.config.value_range.unwrap_or_else(|| source.value_range());

        let values: Vec<Option<f32>> = (0..columns * rows)
            .into_par_iter()
            .map(|i| source.value_at(i % columns.max(1), i / columns.max(1)))
            .collect();
        let colors = values
            .iter()
            .map(|value| value.map(|v| self.color_for(v, range)))
            .collect();

        debug!(
            "Heatmap '{}' rasterized at {}x{}",
            source.label().unwrap_or("unnamed"),
            columns,
            rows
        );
        CellGrid {
            columns,
            rows,
            origin: [domain.min, domain.min],
            cell_size: domain.span() / columns.max(1) as f64,
            values,
            colors,
        }
    }
}

impl<R: Rng> FrameSource for KnnPanel<R> {
    fn frame(&mut self) -> Frame {
        let mut frame = Frame::new("K-Nearest Neighbors", self.domain());

        let grid = match self.mode() {
            KnnMode::Classification => HeatmapView::default().build_grid(self.decision_grid()),
            KnnMode::Regression => HeatmapView::new(HeatmapViewConfig {
                color_map: ColorMapMode::Linear,
                ..HeatmapViewConfig::default()
            })
            .build_grid(self.regression_surface()),
        };
        frame.set_grid(grid);

        for point in self.training() {
            let color = point.label.map(label_color).unwrap_or(UNASSIGNED);
            frame.push_point(ScatterPoint::planar(point.x(), point.y(), color));
        }

        frame.push_metric("k", self.k() as f64, 0);
        frame.push_metric("points", self.training().len() as f64, 0);
        frame
    }
}
