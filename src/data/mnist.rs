use std::path::Path;

use log::debug;

use crate::data::idx::{read_images, read_labels};
use crate::data::sample::Sample;
use crate::error::DatasetError;

pub const TRAIN_IMAGES: &str = "train-images-idx3-ubyte";
pub const TRAIN_LABELS: &str = "train-labels-idx1-ubyte";
pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// Number of digit classes.
pub const CLASSES: usize = 10;

/// The MNIST training and test splits, decoded and one-hot encoded.
#[derive(Debug, Clone)]
pub struct MnistData {
    pub train: Vec<Sample>,
    pub test: Vec<Sample>,
}

impl MnistData {
    /// Loads the four standard MNIST files from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<MnistData, DatasetError> {
        let dir = dir.as_ref();
        let train = load_split(dir, TRAIN_IMAGES, TRAIN_LABELS)?;
        let test = load_split(dir, TEST_IMAGES, TEST_LABELS)?;
        debug!("loaded {} training and {} test samples from {}", train.len(), test.len(), dir.display());
        Ok(MnistData { train, test })
    }

    /// Keeps at most `train` / `test` samples from the front of each split.
    pub fn truncate(&mut self, train: Option<usize>, test: Option<usize>) {
        if let Some(n) = train {
            self.train.truncate(n);
        }
        if let Some(n) = test {
            self.test.truncate(n);
        }
    }

    /// Flattened image size, taken from the first training sample.
    pub fn input_size(&self) -> Option<usize> {
        self.train.first().map(|s| s.input.len())
    }
}

fn load_split(dir: &Path, images: &str, labels: &str) -> Result<Vec<Sample>, DatasetError> {
    let images = read_images(dir.join(images))?;
    let labels = read_labels(dir.join(labels))?;
    Sample::zip(images, &labels, CLASSES)
}
