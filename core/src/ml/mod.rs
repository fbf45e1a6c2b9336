//! MLSCOPE learning kernels
//! Clustering, margin classification, nearest neighbours, toy networks and least squares
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod kmeans;
pub mod knn;
pub mod network;
pub mod regression;
pub mod svm;

pub use self::kmeans::{ClusterAssigner, KMeansSimulation};
pub use self::knn::{
    DecisionGrid, KnnMode, KnnPanel, NeighborClassifier, Prediction, RegressionSurface,
};
pub use self::network::{GraphSnapshot, NetworkGraph, ToyNetworkTrainer, TrainingStep};
pub use self::regression::{RegressionFitter, RegressionModel, RegressionPanel};
pub use self::svm::{Hyperplane, MarginSolver, SvmPanel};
