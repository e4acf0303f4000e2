use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::sample::Sample;
use crate::error::Result;
use crate::network::network::Network;
use crate::train::loop_fn::train_loop;
use crate::train::report::TrainingReport;
use crate::train::train_config::TrainConfig;

/// Owns a training configuration and the RNG used for shuffling.
///
/// The RNG is seeded once when the trainer is built and then advances across
/// epochs and across `train` calls, so a fixed seed reproduces a whole run.
pub struct Trainer<R: Rng = StdRng> {
    config: TrainConfig,
    rng: R,
}

impl Trainer<StdRng> {
    pub fn from_seed(config: TrainConfig, seed: u64) -> Trainer<StdRng> {
        Trainer::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Trainer<R> {
    pub fn new(config: TrainConfig, rng: R) -> Trainer<R> {
        Trainer { config, rng }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Runs `config.epochs` epochs on `network`. See [`train_loop`].
    pub fn train(
        &mut self,
        network: &mut Network,
        training: &[Sample],
        test: Option<&[Sample]>,
    ) -> Result<TrainingReport> {
        train_loop(network, training, test, &self.config, &mut self.rng)
    }
}
