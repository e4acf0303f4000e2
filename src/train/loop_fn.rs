use std::sync::atomic::Ordering;
use std::time::Instant;

use log::{info, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::data::sample::Sample;
use crate::error::{NnError, Result};
use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;
use crate::train::report::TrainingReport;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs of mini-batch SGD.
///
/// # Arguments
/// - `network`  — mutable reference to the network; modified in place
/// - `training` — training samples
/// - `test`     — optional held-out samples, evaluated after every epoch
/// - `config`   — hyperparameters, optional progress channel, optional stop flag
/// - `rng`      — source of the per-epoch shuffle; never reseeded here
///
/// # Early termination
/// Checked only between epochs. The loop stops if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Errors
/// `Configuration` if the config is invalid, `training` is empty, or
/// `batch_size` exceeds the number of training samples. Any batch error is
/// returned as-is; batches before it stay applied.
pub fn train_loop<R: Rng + ?Sized>(
    network: &mut Network,
    training: &[Sample],
    test: Option<&[Sample]>,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<TrainingReport> {
    config.validate()?;
    if training.is_empty() {
        return Err(NnError::Configuration("training set is empty".into()));
    }
    if config.batch_size > training.len() {
        return Err(NnError::Configuration(format!(
            "batch_size {} exceeds training set size {}",
            config.batch_size,
            training.len()
        )));
    }

    let run_start = Instant::now();
    let mut report = TrainingReport::default();

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            report.stopped_early = true;
            break;
        }

        let t_start = Instant::now();

        // ── One full pass over the training data ───────────────────────────
        let train_loss = run_one_epoch(network, training, config, rng)?;
        let elapsed_secs = t_start.elapsed().as_secs_f64();

        // ── Held-out accuracy ─────────────────────────────────────────────
        let test_accuracy = match test {
            Some(samples) if !samples.is_empty() => Some(network.evaluate(samples)?),
            _ => None,
        };

        match test_accuracy {
            Some(acc) => info!(
                "epoch {}/{}: loss {:.6}, test accuracy {:.4}, {:.3}s",
                epoch, config.epochs, train_loss, acc, elapsed_secs
            ),
            None => info!(
                "epoch {}/{}: loss {:.6}, {:.3}s",
                epoch, config.epochs, train_loss, elapsed_secs
            ),
        }

        // ── Emit progress ─────────────────────────────────────────────────
        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss,
            test_accuracy,
            elapsed_secs,
        };
        report.record(&stats);

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                if epoch < config.epochs {
                    warn!("progress receiver dropped, stopping after epoch {}", epoch);
                    report.stopped_early = true;
                }
                break;
            }
        }
    }

    if report.stopped_early {
        warn!("training stopped after {} of {} epochs", report.epochs_completed, config.epochs);
    }
    report.training_time = run_start.elapsed().as_secs_f64();
    Ok(report)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config.stop_flag
        .as_ref()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}

/// Runs one full epoch of mini-batch SGD over the training data.
/// Returns the mean loss over all samples.
fn run_one_epoch<R: Rng + ?Sized>(
    network: &mut Network,
    training: &[Sample],
    config: &TrainConfig,
    rng: &mut R,
) -> Result<f64> {
    let n = training.len();

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let mut total_loss = 0.0;
    let mut batch: Vec<&Sample> = Vec::with_capacity(config.batch_size);

    // The last chunk may be short; train_on_batch averages over its real length.
    for chunk in indices.chunks(config.batch_size) {
        batch.clear();
        batch.extend(chunk.iter().map(|&i| &training[i]));

        total_loss += if config.parallel {
            network.train_on_batch_parallel(&batch, config.learning_rate)?
        } else {
            network.train_on_batch(&batch, config.learning_rate)?
        };
    }

    Ok(total_loss / n as f64)
}
