use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use crate::error::{NnError, Result};
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`        — total number of full passes over the training data
/// - `batch_size`    — samples per mini-batch; use `1` for online SGD
/// - `learning_rate` — SGD step size, divided by each batch's actual size
/// - `parallel`      — compute per-sample gradients on the rayon pool
/// - `progress_tx`   — optional channel sender; one `EpochStats` is sent per
///                     completed epoch.  If the receiver is dropped the loop
///                     terminates after that epoch.
/// - `stop_flag`     — optional atomic flag; when set to `true` from another
///                     thread the loop terminates after the current epoch.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub parallel: bool,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a validated `TrainConfig` with no progress channel and no stop flag.
    pub fn new(epochs: usize, batch_size: usize, learning_rate: f64) -> Result<Self> {
        let config = TrainConfig {
            epochs,
            batch_size,
            learning_rate,
            parallel: false,
            progress_tx: None,
            stop_flag: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(NnError::Configuration("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(NnError::Configuration("batch_size must be at least 1".into()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NnError::Configuration(format!(
                "learning rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_values() {
        assert!(TrainConfig::new(0, 10, 0.1).is_err());
        assert!(TrainConfig::new(1, 0, 0.1).is_err());
        assert!(TrainConfig::new(1, 10, 0.0).is_err());
        assert!(TrainConfig::new(1, 10, -3.0).is_err());
        assert!(TrainConfig::new(1, 10, f64::INFINITY).is_err());
        assert!(TrainConfig::new(1, 10, 3.0).is_ok());
    }
}
