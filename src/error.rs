use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the network core and the training loop.
///
/// Every variant is returned before any parameter is touched, so a network
/// that produced one of these is still valid and usable.
#[derive(Debug, Error)]
pub enum NnError {
    #[error("dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("mini-batch is empty")]
    EmptyBatch,
}

/// Errors raised while decoding IDX files into samples.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read '{}': {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed IDX data: {0}")]
    Format(String),

    #[error("image/label count mismatch: {images} images but {labels} labels")]
    LengthMismatch { images: usize, labels: usize },

    #[error("label at index {index} is {label}, out of range for {classes} classes")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        classes: usize,
    },
}

pub type Result<T> = std::result::Result<T, NnError>;

pub(crate) fn check_len(context: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(NnError::DimensionMismatch { context, expected, got });
    }
    Ok(())
}
