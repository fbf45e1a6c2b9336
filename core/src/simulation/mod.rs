//! MLSCOPE Simulation Framework
//! Shared kernel traits and run-state lifecycle
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod traits;
pub mod state;

pub use self::traits::*;
pub use self::state::*;
