//! Trains a digit classifier on MNIST IDX files and prints a JSON report.
//!
//!   cargo run --release -- data/ --layers 784,30,10 --learning-rate 3.0 --epochs 5
//!
//! Progress goes to stderr through the logger (`RUST_LOG` overrides the
//! default `info` level); only the final report is written to stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use ferrite_digits::data::mnist;
use ferrite_digits::{MnistData, Network, RunConfig, Trainer};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Directory holding the four MNIST IDX files.
    data_dir: Option<PathBuf>,

    /// JSON run configuration; command-line flags override its values.
    #[arg(long)]
    config: Option<String>,

    /// Layer sizes, input first, e.g. 784,128,64,10.
    #[arg(long, value_delimiter = ',')]
    layers: Option<Vec<usize>>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    /// Compute per-sample gradients on all cores.
    #[arg(long)]
    parallel: bool,

    /// Use only the first N training samples.
    #[arg(long)]
    train_limit: Option<usize>,

    /// Use only the first N test samples.
    #[arg(long)]
    test_limit: Option<usize>,

    /// Also write the JSON report to this file.
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Args {
    fn into_run_config(self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load_json(path)
                .with_context(|| format!("cannot load config '{}'", path))?,
            None => RunConfig::default(),
        };
        if let Some(dir) = self.data_dir { config.data_dir = dir; }
        if let Some(layers) = self.layers { config.layer_sizes = layers; }
        if let Some(epochs) = self.epochs { config.epochs = epochs; }
        if let Some(batch_size) = self.batch_size { config.mini_batch_size = batch_size; }
        if let Some(lr) = self.learning_rate { config.learning_rate = lr; }
        if let Some(seed) = self.seed { config.seed = seed; }
        if self.parallel { config.parallel = true; }
        if self.train_limit.is_some() { config.train_limit = self.train_limit; }
        if self.test_limit.is_some() { config.test_limit = self.test_limit; }
        if self.report.is_some() { config.report_path = self.report; }
        Ok(config)
    }
}

fn init_logging() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn main() -> Result<()> {
    init_logging();

    let config = Args::parse().into_run_config()?;
    config.validate()?;

    info!("loading MNIST from {}", config.data_dir.display());
    let mut data = MnistData::load(&config.data_dir)?;
    data.truncate(config.train_limit, config.test_limit);

    let input_size = data.input_size().context("training set is empty")?;
    config.check_dataset(input_size, mnist::CLASSES).with_context(|| {
        format!(
            "layers {:?} do not fit {}-pixel images with {} classes",
            config.layer_sizes, input_size, mnist::CLASSES
        )
    })?;
    info!("{} training samples, {} test samples", data.train.len(), data.test.len());

    // One seeded source for initialization, a second derived one for shuffling.
    let mut init_rng = StdRng::seed_from_u64(config.seed);
    let mut network = Network::from_spec(&config.network_spec(), &mut init_rng)?;
    info!("network {:?}, learning rate {}, batch size {}", network.layer_sizes(), config.learning_rate, config.mini_batch_size);

    let mut trainer = Trainer::from_seed(config.train_config()?, config.seed.wrapping_add(1));
    let report = trainer.train(&mut network, &data.train, Some(&data.test))?;

    if let Some(accuracy) = report.accuracy {
        info!("final test accuracy {:.4} after {:.1}s", accuracy, report.training_time);
    }

    if let Some(path) = &config.report_path {
        let path = path.to_string_lossy();
        report.save_json(&path).with_context(|| format!("cannot write report '{}'", path))?;
    }
    println!("{}", report.to_json()?);

    Ok(())
}
