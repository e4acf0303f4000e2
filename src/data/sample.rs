use crate::error::DatasetError;

/// One training example: a flattened image and its one-hot target.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

impl Sample {
    pub fn new(input: Vec<f64>, target: Vec<f64>) -> Sample {
        Sample { input, target }
    }

    /// Pairs decoded images with their labels by index, one-hot encoding each
    /// label into a vector of length `classes`.
    pub fn zip(
        images: Vec<Vec<f64>>,
        labels: &[u8],
        classes: usize,
    ) -> Result<Vec<Sample>, DatasetError> {
        if images.len() != labels.len() {
            return Err(DatasetError::LengthMismatch {
                images: images.len(),
                labels: labels.len(),
            });
        }
        images.into_iter()
            .zip(labels)
            .enumerate()
            .map(|(index, (input, &label))| {
                let target = one_hot(label as usize, classes).ok_or(DatasetError::LabelOutOfRange {
                    index,
                    label: label as usize,
                    classes,
                })?;
                Ok(Sample { input, target })
            })
            .collect()
    }

    /// Index of the hot entry in `target`.
    pub fn label(&self) -> usize {
        argmax(&self.target)
    }
}

/// One-hot vector of length `classes`, or `None` if `label >= classes`.
pub fn one_hot(label: usize, classes: usize) -> Option<Vec<f64>> {
    if label >= classes {
        return None;
    }
    let mut v = vec![0.0; classes];
    v[label] = 1.0;
    Some(v)
}

/// Index of the maximum element. The first index wins ties; NaN never wins.
pub fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .filter(|(_, x)| !x.is_nan())
        .fold((0, f64::NEG_INFINITY), |(best_i, best), (i, &x)| {
            if x > best { (i, x) } else { (best_i, best) }
        })
        .0
}
