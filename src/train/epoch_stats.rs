use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `EpochStats` value at the end of every completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean quadratic loss over all training samples in this epoch, measured
    /// as each sample went through its batch.
    pub train_loss: f64,
    /// Test accuracy as a fraction in [0, 1], if a test set was provided.
    pub test_accuracy: Option<f64>,
    /// Wall-clock duration of the training part of this epoch in seconds.
    pub elapsed_secs: f64,
}
