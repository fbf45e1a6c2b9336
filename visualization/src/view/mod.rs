//! Panel views
//! Each view turns one simulation panel into a `Frame`
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod graph_view;
pub mod heatmap_view;
pub mod hyperplane_view;
pub mod scatter_view;

pub use self::heatmap_view::HeatmapDataSource;

use crate::frame::Frame;

/// Error types for frame export
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("Frame serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A panel that can be drawn
///
/// Takes `&mut self` so panels with cached derived data (the KNN heatmap)
/// can refresh the cache while producing the frame.
pub trait FrameSource {
    fn frame(&mut self) -> Frame;
}
