//! One instance of every panel, built from a `SimulationConfig`
//!
//! With `seed` set, each panel draws from its own generator derived from that
//! seed, so edits or ticks in one panel never shift the random sequence of
//! another. Without it every panel is seeded from entropy.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::info;

use crate::config::SimulationConfig;
use crate::data_structures::rng::{seeded_or_entropy, SimRng};
use crate::ml::{KMeansSimulation, KnnPanel, RegressionPanel, SvmPanel, ToyNetworkTrainer};
use crate::simulation::{SimulationError, SimulationKernel};
use crate::VERSION;

#[derive(Debug)]
pub struct PanelSet {
    pub kmeans: KMeansSimulation<SimRng>,
    pub svm: SvmPanel<SimRng>,
    pub knn: KnnPanel<SimRng>,
    pub network: ToyNetworkTrainer<SimRng>,
    pub regression: RegressionPanel<SimRng>,
}

impl PanelSet {
    /// Validates `config` and builds every panel from its section
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let rng = |stream: u64| {
            seeded_or_entropy(config.seed.map(|seed| seed.wrapping_add(stream)))
        };

        let panels = Self {
            kmeans: KMeansSimulation::new(&config.kmeans, rng(0)),
            svm: SvmPanel::new(&config.svm, rng(1)),
            knn: KnnPanel::new(&config.knn, rng(2)),
            network: ToyNetworkTrainer::new(&config.network, rng(3))?,
            regression: RegressionPanel::new(&config.regression, rng(4)),
        };
        info!("MLSCOPE {} panels ready (seed: {:?})", VERSION, config.seed);
        Ok(panels)
    }

    /// Every panel behind the introspection interface
    pub fn kernels(&self) -> [&dyn SimulationKernel; 5] {
        [&self.kmeans, &self.svm, &self.knn, &self.network, &self.regression]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_reproduces_every_panel() {
        let config = SimulationConfig {
            seed: Some(17),
            ..SimulationConfig::default()
        };
        let a = PanelSet::from_config(&config).unwrap();
        let b = PanelSet::from_config(&config).unwrap();

        assert_eq!(a.kmeans.points(), b.kmeans.points());
        assert_eq!(a.svm.points(), b.svm.points());
        assert_eq!(a.knn.training(), b.knn.training());
        assert_eq!(a.network.network().weights(), b.network.network().weights());
        assert_eq!(a.regression.points(), b.regression.points());
    }

    #[test]
    fn test_panels_draw_from_separate_streams() {
        let config = SimulationConfig {
            seed: Some(5),
            ..SimulationConfig::default()
        };
        let panels = PanelSet::from_config(&config).unwrap();
        assert_ne!(panels.kmeans.points()[0], panels.knn.training()[0]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = SimulationConfig::default();
        config.knn.k = 0;
        assert!(matches!(
            PanelSet::from_config(&config),
            Err(SimulationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_kernels_expose_distinct_ids() {
        let panels = PanelSet::from_config(&SimulationConfig::default()).unwrap();
        let mut ids: Vec<String> = panels.kernels().iter().map(|k| k.id().to_string()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }
}
