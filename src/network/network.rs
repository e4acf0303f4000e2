use std::borrow::Borrow;

use log::debug;
use rand::Rng;
use rayon::prelude::*;

use crate::activation::activation::ActivationFunction;
use crate::data::sample::{argmax, Sample};
use crate::error::{check_len, NnError, Result};
use crate::layers::dense::{ForwardCache, Layer, LayerGradient};
use crate::loss::quadratic::QuadraticLoss;
use crate::network::spec::NetworkSpec;

/// Gradients summed over a mini-batch, one entry per layer, plus the summed loss.
#[derive(Debug, Clone)]
pub struct BatchGradient {
    pub layers: Vec<LayerGradient>,
    pub loss_sum: f64,
}

/// An ordered stack of dense layers.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Builds a randomly initialized network with one layer per adjacent pair
    /// in `layer_sizes`.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Result<Network> {
        Network::from_spec(&NetworkSpec::new(layer_sizes.to_vec(), activation), rng)
    }

    pub fn from_spec<R: Rng + ?Sized>(spec: &NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate()?;
        let layers = spec.layer_sizes.windows(2)
            .map(|pair| Layer::new(pair[0], pair[1], spec.activation, rng))
            .collect();
        debug!("built network {:?} with {:?} activation", spec.layer_sizes, spec.activation);
        Ok(Network { layers })
    }

    /// Wraps pre-built layers, checking that each layer's input matches the
    /// previous layer's output.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Network> {
        if layers.is_empty() {
            return Err(NnError::Configuration("network needs at least one layer".into()));
        }
        for pair in layers.windows(2) {
            check_len("layer chain", pair[0].size(), pair[1].input_size())?;
        }
        Ok(Network { layers })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(self.input_size())
            .chain(self.layers.iter().map(Layer::size))
            .collect()
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].size()
    }

    /// Runs the input through every layer. Does not touch parameters.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        check_len("network input", self.input_size(), input.len())?;
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.forward(&current)?;
        }
        Ok(current)
    }

    fn forward_pass(&self, input: &[f64]) -> Result<Vec<ForwardCache>> {
        let mut caches: Vec<ForwardCache> = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let cache = match caches.last() {
                Some(prev) => layer.forward_cached(&prev.output)?,
                None => layer.forward_cached(input)?,
            };
            caches.push(cache);
        }
        Ok(caches)
    }

    fn validate_sample(&self, sample: &Sample) -> Result<()> {
        check_len("sample input", self.input_size(), sample.input.len())?;
        check_len("sample target", self.output_size(), sample.target.len())
    }

    /// Forward and backward pass for one sample. Returns per-layer gradients
    /// (input layer first) and the sample's loss.
    pub fn backprop(&self, sample: &Sample) -> Result<(Vec<LayerGradient>, f64)> {
        self.validate_sample(sample)?;
        let caches = self.forward_pass(&sample.input)?;
        let output = &caches[caches.len() - 1].output;

        let loss = QuadraticLoss::loss(output, &sample.target);
        let mut error = QuadraticLoss::derivative(output, &sample.target);

        let mut grads = Vec::with_capacity(self.layers.len());
        for (layer, cache) in self.layers.iter().zip(&caches).rev() {
            let (input_error, grad) = layer.backward(cache, &error)?;
            grads.push(grad);
            error = input_error;
        }
        grads.reverse();

        Ok((grads, loss))
    }

    /// Sums per-sample gradients over `batch` without mutating the network.
    ///
    /// With `parallel` set, samples are processed on the rayon pool; the
    /// results are still reduced in sample order, so the sum is identical
    /// to the sequential one.
    pub fn batch_gradients<S>(&self, batch: &[S], parallel: bool) -> Result<BatchGradient>
    where
        S: Borrow<Sample> + Sync,
    {
        let per_sample: Vec<(Vec<LayerGradient>, f64)> = if parallel {
            batch.par_iter().map(|s| self.backprop(s.borrow())).collect::<Result<_>>()?
        } else {
            batch.iter().map(|s| self.backprop(s.borrow())).collect::<Result<_>>()?
        };

        let mut acc = BatchGradient {
            layers: self.layers.iter().map(LayerGradient::zeros_like).collect(),
            loss_sum: 0.0,
        };
        for (grads, loss) in &per_sample {
            for (sum, g) in acc.layers.iter_mut().zip(grads) {
                sum.accumulate(g);
            }
            acc.loss_sum += loss;
        }
        Ok(acc)
    }

    /// One SGD step on `batch`. Returns the summed loss over the batch.
    ///
    /// The whole batch is validated first; on any error the parameters are
    /// left exactly as they were.
    pub fn train_on_batch<S>(&mut self, batch: &[S], learning_rate: f64) -> Result<f64>
    where
        S: Borrow<Sample> + Sync,
    {
        self.update_mini_batch(batch, learning_rate, false)
    }

    /// Same as `train_on_batch`, with per-sample gradients computed in parallel.
    pub fn train_on_batch_parallel<S>(&mut self, batch: &[S], learning_rate: f64) -> Result<f64>
    where
        S: Borrow<Sample> + Sync,
    {
        self.update_mini_batch(batch, learning_rate, true)
    }

    fn update_mini_batch<S>(&mut self, batch: &[S], learning_rate: f64, parallel: bool) -> Result<f64>
    where
        S: Borrow<Sample> + Sync,
    {
        if batch.is_empty() {
            return Err(NnError::EmptyBatch);
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(NnError::Configuration(format!(
                "learning rate must be positive and finite, got {}",
                learning_rate
            )));
        }
        for sample in batch {
            self.validate_sample(sample.borrow())?;
        }

        let gradient = self.batch_gradients(batch, parallel)?;
        for (layer, grad) in self.layers.iter_mut().zip(&gradient.layers) {
            layer.apply_gradient(grad, learning_rate, batch.len())?;
        }
        Ok(gradient.loss_sum)
    }

    /// Fraction of samples whose predicted class matches the target class.
    /// An empty set scores 0.0.
    pub fn evaluate(&self, samples: &[Sample]) -> Result<f64> {
        if samples.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0usize;
        for sample in samples {
            self.validate_sample(sample)?;
            let output = self.predict(&sample.input)?;
            if argmax(&output) == argmax(&sample.target) {
                correct += 1;
            }
        }
        Ok(correct as f64 / samples.len() as f64)
    }

    /// Mean quadratic loss over `samples`. An empty set yields 0.0.
    pub fn mean_loss(&self, samples: &[Sample]) -> Result<f64> {
        if samples.is_empty() {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for sample in samples {
            self.validate_sample(sample)?;
            total += QuadraticLoss::loss(&self.predict(&sample.input)?, &sample.target);
        }
        Ok(total / samples.len() as f64)
    }
}
