pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod data;
pub mod train;
pub mod config;

// Convenience re-exports
pub use error::{DatasetError, NnError};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::{ForwardCache, Layer, LayerGradient};
pub use network::network::Network;
pub use network::spec::NetworkSpec;
pub use loss::quadratic::QuadraticLoss;
pub use data::sample::Sample;
pub use data::mnist::MnistData;
pub use train::{EpochStats, TrainConfig, Trainer, TrainingReport};
pub use config::RunConfig;
