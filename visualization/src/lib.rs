//! MLSCOPE visualization boundary
//!
//! Converts panel state into render-ready frames: coloured scatter points,
//! line segments clipped to the panel domain, classified cell grids and
//! scalar readouts. Rendering itself belongs to the host; a frame is plain
//! data and serializes to JSON.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod frame;
pub mod geometry;
pub mod palette;
pub mod view;

pub use self::frame::{CellGrid, Frame, LineSegment, LineStyle, Marker, MetricReadout, ScatterPoint};
pub use self::view::{FrameSource, HeatmapDataSource, ViewError};
