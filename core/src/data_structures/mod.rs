//! Points, domains, dataset generators and the injectable random source
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod dataset;
pub mod point;
pub mod rng;

pub use self::dataset::*;
pub use self::point::*;
pub use self::rng::*;
