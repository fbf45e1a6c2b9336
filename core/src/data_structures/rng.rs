//! Injectable random sources
//!
//! Panels are generic over any `rand::Rng`; production code seeds from the
//! operating system, tests pin a seed for reproducible runs.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Default generator used by every panel
pub type SimRng = StdRng;

/// Deterministic generator for reproducible runs
pub fn seeded(seed: u64) -> SimRng {
    StdRng::seed_from_u64(seed)
}

/// Non-deterministic generator seeded from system entropy
pub fn from_entropy() -> SimRng {
    StdRng::from_entropy()
}

/// Uses `seed` when provided, entropy otherwise
pub fn seeded_or_entropy(seed: Option<u64>) -> SimRng {
    match seed {
        Some(value) => seeded(value),
        None => from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_seeded_generators_repeat() {
        let mut a = seeded(42);
        let mut b = seeded_or_entropy(Some(42));
        let xs: Vec<f64> = (0..5).map(|_| a.gen()).collect();
        let ys: Vec<f64> = (0..5).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }
}
