//! MLSCOPE core: simulation kernels for interactive machine-learning panels
//!
//! Every panel owns its own state (points, centroids, network) and an
//! injectable random source, so a fixed seed reproduces a whole session.
//! Kernels never fail on degenerate geometry: they fall back to a
//! well-defined value or report an explicit absent result.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod config;
pub mod data_structures;
pub mod execution;
pub mod ml;
pub mod session;
pub mod simulation;

pub use self::config::SimulationConfig;
pub use self::session::PanelSet;
pub use self::simulation::{SimulationError, SimulationKernel, SimulationMetrics};

/// Crate version reported by the panels
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
