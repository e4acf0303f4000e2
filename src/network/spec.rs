use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NnError, Result};

/// A serializable description of a network architecture.
///
/// `layer_sizes[0]` is the input dimension and the last entry is the number of
/// classes; each adjacent pair becomes one dense layer. The same activation is
/// used for every layer.
///
/// Only the architecture is stored. Trained parameters are never written out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub layer_sizes: Vec<usize>,
    #[serde(default)]
    pub activation: ActivationFunction,
}

impl NetworkSpec {
    pub fn new(layer_sizes: Vec<usize>, activation: ActivationFunction) -> NetworkSpec {
        NetworkSpec { layer_sizes, activation }
    }

    /// Checks that there are at least two sizes and none of them is zero.
    pub fn validate(&self) -> Result<()> {
        if self.layer_sizes.len() < 2 {
            return Err(NnError::Configuration(format!(
                "need at least 2 layer sizes (input and output), got {}",
                self.layer_sizes.len()
            )));
        }
        if let Some(i) = self.layer_sizes.iter().position(|&s| s == 0) {
            return Err(NnError::Configuration(format!("layer size at position {} is zero", i)));
        }
        Ok(())
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
