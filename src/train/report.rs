use serde::{Serialize, Deserialize};

use crate::train::epoch_stats::EpochStats;

/// Summary of a whole training run, printed as JSON by the binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Total wall-clock training time in seconds, evaluation included.
    pub training_time: f64,
    /// Test accuracy after the last completed epoch.
    pub accuracy: Option<f64>,
    /// Seconds spent training in each epoch.
    pub epoch_times: Vec<f64>,
    /// Test accuracy after each epoch; empty when no test set was given.
    pub accuracies: Vec<f64>,
    /// Mean training loss of each epoch.
    pub train_losses: Vec<f64>,
    pub epochs_completed: usize,
    /// True when a stop flag or a dropped progress receiver ended training
    /// before all epochs ran.
    pub stopped_early: bool,
}

impl TrainingReport {
    pub(crate) fn record(&mut self, stats: &EpochStats) {
        self.epoch_times.push(stats.elapsed_secs);
        self.train_losses.push(stats.train_loss);
        if let Some(acc) = stats.test_accuracy {
            self.accuracies.push(acc);
            self.accuracy = Some(acc);
        }
        self.epochs_completed = stats.epoch;
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Writes the report as pretty-printed JSON.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(epoch: usize, elapsed_secs: f64, test_accuracy: Option<f64>) -> EpochStats {
        EpochStats { epoch, total_epochs: 3, train_loss: 0.25, test_accuracy, elapsed_secs }
    }

    #[test]
    fn record_keeps_sub_millisecond_epoch_times() {
        let mut report = TrainingReport::default();
        report.record(&stats(1, 0.000_42, Some(0.5)));
        report.record(&stats(2, 0.000_07, Some(0.75)));
        assert_eq!(report.epoch_times, vec![0.000_42, 0.000_07]);
        assert_eq!(report.accuracies, vec![0.5, 0.75]);
        assert_eq!(report.accuracy, Some(0.75));
        assert_eq!(report.epochs_completed, 2);
    }

    #[test]
    fn record_without_test_set_leaves_accuracy_empty() {
        let mut report = TrainingReport::default();
        report.record(&stats(1, 0.01, None));
        assert!(report.accuracies.is_empty());
        assert_eq!(report.accuracy, None);
        assert_eq!(report.train_losses, vec![0.25]);
    }
}
