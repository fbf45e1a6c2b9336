//! Auto-mode runner and bounded metric history
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod history;
pub mod runner;

pub use self::history::*;
pub use self::runner::*;
