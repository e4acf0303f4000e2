use std::path::PathBuf;

use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{check_len, NnError, Result};
use crate::network::spec::NetworkSpec;
use crate::train::train_config::TrainConfig;

/// Everything the binary needs for one training run.
///
/// Loadable from JSON; any field left out takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub layer_sizes: Vec<usize>,
    pub activation: ActivationFunction,
    pub learning_rate: f64,
    pub epochs: usize,
    pub mini_batch_size: usize,
    /// Seeds both weight initialization and shuffling.
    pub seed: u64,
    pub parallel: bool,
    pub data_dir: PathBuf,
    pub train_limit: Option<usize>,
    pub test_limit: Option<usize>,
    /// Where to write the JSON report in addition to stdout.
    pub report_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            layer_sizes: vec![784, 128, 64, 10],
            activation: ActivationFunction::Sigmoid,
            learning_rate: 0.1,
            epochs: 30,
            mini_batch_size: 32,
            seed: 42,
            parallel: false,
            data_dir: PathBuf::from("data"),
            train_limit: None,
            test_limit: None,
            report_path: None,
        }
    }
}

impl RunConfig {
    pub fn load_json(path: &str) -> std::io::Result<RunConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    pub fn network_spec(&self) -> NetworkSpec {
        NetworkSpec::new(self.layer_sizes.clone(), self.activation)
    }

    pub fn train_config(&self) -> Result<TrainConfig> {
        Ok(TrainConfig::new(self.epochs, self.mini_batch_size, self.learning_rate)?
            .with_parallel(self.parallel))
    }

    pub fn validate(&self) -> Result<()> {
        self.network_spec().validate()?;
        self.train_config()?;
        if self.train_limit == Some(0) {
            return Err(NnError::Configuration("train_limit must be at least 1".into()));
        }
        Ok(())
    }

    /// Checks the first and last layer sizes against the loaded data:
    /// pixels per image and number of label classes.
    pub fn check_dataset(&self, input_size: usize, classes: usize) -> Result<()> {
        let first = self.layer_sizes.first().copied().unwrap_or(0);
        let last = self.layer_sizes.last().copied().unwrap_or(0);
        check_len("first layer size vs image pixels", input_size, first)?;
        check_len("last layer size vs label classes", classes, last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_run() {
        let c = RunConfig::default();
        assert_eq!(c.layer_sizes, vec![784, 128, 64, 10]);
        assert_eq!(c.epochs, 30);
        assert_eq!(c.mini_batch_size, 32);
        assert_eq!(c.seed, 42);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"layer_sizes": [784, 30, 10], "learning_rate": 3.0}}"#).unwrap();
        let c = RunConfig::load_json(file.path().to_str().unwrap()).unwrap();
        assert_eq!(c.layer_sizes, vec![784, 30, 10]);
        assert_eq!(c.learning_rate, 3.0);
        assert_eq!(c.mini_batch_size, 32);
        assert_eq!(c.activation, ActivationFunction::Sigmoid);
    }

    #[test]
    fn validate_reports_configuration_errors() {
        let c = RunConfig { layer_sizes: vec![784], ..RunConfig::default() };
        assert!(matches!(c.validate(), Err(NnError::Configuration(_))));
        let c = RunConfig { learning_rate: -1.0, ..RunConfig::default() };
        assert!(matches!(c.validate(), Err(NnError::Configuration(_))));
        let c = RunConfig { epochs: 0, ..RunConfig::default() };
        assert!(matches!(c.validate(), Err(NnError::Configuration(_))));
    }

    #[test]
    fn check_dataset_matches_both_ends() {
        let c = RunConfig::default();
        assert!(c.check_dataset(784, 10).is_ok());
        assert!(matches!(
            c.check_dataset(4, 10),
            Err(NnError::DimensionMismatch { expected: 4, got: 784, .. })
        ));

        let c = RunConfig { layer_sizes: vec![784, 30, 5], ..RunConfig::default() };
        assert!(matches!(
            c.check_dataset(784, 10),
            Err(NnError::DimensionMismatch { expected: 10, got: 5, .. })
        ));
    }
}
