use rand::Rng;

use crate::activation::activation::ActivationFunction;
use crate::error::{check_len, NnError, Result};
use crate::math::matrix::Matrix;

/// Everything one forward pass through a layer produces that backprop needs.
/// Returned by value, so a layer never holds per-pass state.
#[derive(Debug, Clone)]
pub struct ForwardCache {
    pub input: Vec<f64>,
    /// Pre-activation values z = Wx + b.
    pub weighted_sum: Vec<f64>,
    pub output: Vec<f64>,
}

/// Weight and bias gradients for one layer. Summed over a mini-batch before
/// being handed to `Layer::apply_gradient`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGradient {
    pub weights: Matrix,
    pub biases: Vec<f64>,
}

impl LayerGradient {
    pub fn zeros_like(layer: &Layer) -> LayerGradient {
        LayerGradient {
            weights: Matrix::zeros(layer.weights.rows, layer.weights.cols),
            biases: vec![0.0; layer.biases.len()],
        }
    }

    pub fn accumulate(&mut self, other: &LayerGradient) {
        self.weights += &other.weights;
        for (b, o) in self.biases.iter_mut().zip(&other.biases) {
            *b += o;
        }
    }
}

/// Fully-connected layer: `a = f(Wx + b)` with W of shape (size × input_size).
#[derive(Debug, Clone)]
pub struct Layer {
    weights: Matrix,
    biases: Vec<f64>,
    activator: ActivationFunction,
}

impl Layer {
    /// Random layer. Weights come from Xavier (He for ReLU), biases start at zero.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let weights = match activation {
            ActivationFunction::ReLU => Matrix::he(size, input_size, rng),
            _ => Matrix::xavier(size, input_size, rng),
        };

        Layer {
            weights,
            biases: vec![0.0; size],
            activator: activation,
        }
    }

    /// Layer with explicit parameters. `biases.len()` must equal `weights.rows`.
    pub fn from_parameters(
        weights: Matrix,
        biases: Vec<f64>,
        activation: ActivationFunction,
    ) -> Result<Layer> {
        if weights.rows == 0 || weights.cols == 0 {
            return Err(NnError::Configuration("layer weights must be non-empty".into()));
        }
        weights.check_shape()?;
        check_len("layer biases", weights.rows, biases.len())?;
        Ok(Layer { weights, biases, activator: activation })
    }

    pub fn input_size(&self) -> usize {
        self.weights.cols
    }

    pub fn size(&self) -> usize {
        self.weights.rows
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activator
    }

    fn weighted_sum(&self, input: &[f64]) -> Vec<f64> {
        let mut z = self.weights.mul_vec(input);
        for (zi, b) in z.iter_mut().zip(&self.biases) {
            *zi += b;
        }
        z
    }

    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        check_len("layer input", self.input_size(), input.len())?;
        Ok(self.weighted_sum(input).into_iter()
            .map(|z| self.activator.function(z))
            .collect())
    }

    /// Forward pass that keeps z and a for a subsequent `backward`.
    pub fn forward_cached(&self, input: &[f64]) -> Result<ForwardCache> {
        check_len("layer input", self.input_size(), input.len())?;
        let weighted_sum = self.weighted_sum(input);
        let output = weighted_sum.iter().map(|&z| self.activator.function(z)).collect();
        Ok(ForwardCache {
            input: input.to_vec(),
            weighted_sum,
            output,
        })
    }

    /// Backpropagates through this layer.
    ///
    /// `output_error` is ∂C/∂a (activation space). The layer applies f'(z)
    /// itself, giving δ = output_error ⊙ f'(z), then returns
    /// (Wᵗδ, gradient) where gradient = (δ·inputᵗ, δ).
    pub fn backward(
        &self,
        cache: &ForwardCache,
        output_error: &[f64],
    ) -> Result<(Vec<f64>, LayerGradient)> {
        check_len("layer output error", self.size(), output_error.len())?;
        check_len("forward cache", self.size(), cache.weighted_sum.len())?;
        check_len("forward cache input", self.input_size(), cache.input.len())?;

        let delta: Vec<f64> = output_error.iter().zip(&cache.weighted_sum)
            .map(|(e, &z)| e * self.activator.derivative(z))
            .collect();

        let mut weights = Matrix::zeros(self.weights.rows, self.weights.cols);
        weights.add_outer(&delta, &cache.input);
        let input_error = self.weights.transpose_mul_vec(&delta);

        Ok((input_error, LayerGradient { weights, biases: delta }))
    }

    /// `W -= lr/batch_size * grad.weights`, `b -= lr/batch_size * grad.biases`.
    pub fn apply_gradient(
        &mut self,
        gradient: &LayerGradient,
        learning_rate: f64,
        batch_size: usize,
    ) -> Result<()> {
        if batch_size == 0 {
            return Err(NnError::EmptyBatch);
        }
        check_len("weight gradient rows", self.weights.rows, gradient.weights.rows)?;
        check_len("weight gradient cols", self.weights.cols, gradient.weights.cols)?;
        check_len("bias gradient", self.biases.len(), gradient.biases.len())?;
        gradient.weights.check_shape()?;

        let scale = learning_rate / batch_size as f64;
        self.weights.scaled_sub_assign(&gradient.weights, scale);
        for (b, g) in self.biases.iter_mut().zip(&gradient.biases) {
            *b -= scale * g;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fixed_layer(activation: ActivationFunction) -> Layer {
        let weights = Matrix::from_data(vec![
            vec![1.0, 0.5, -0.5],
            vec![-1.0, -1.0, 2.0],
        ]).unwrap();
        Layer::from_parameters(weights, vec![0.0, 0.0], activation).unwrap()
    }

    #[test]
    fn forward_sigmoid() {
        let layer = fixed_layer(ActivationFunction::Sigmoid);
        let out = layer.forward(&[1.0, 0.5, -0.5]).unwrap();
        // z = [1.5, -2.5]
        assert_relative_eq!(out[0], 0.8175744761936437, epsilon = 1e-12);
        assert_relative_eq!(out[1], 0.07585818002124355, epsilon = 1e-12);
    }

    #[test]
    fn forward_rejects_wrong_length() {
        let layer = fixed_layer(ActivationFunction::Sigmoid);
        let err = layer.forward(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, NnError::DimensionMismatch { expected: 3, got: 2, .. }));
    }

    #[test]
    fn backward_identity_is_plain_linear_gradient() {
        let layer = fixed_layer(ActivationFunction::Identity);
        let cache = layer.forward_cached(&[1.0, 2.0, 3.0]).unwrap();
        let (input_error, grad) = layer.backward(&cache, &[1.0, -1.0]).unwrap();

        assert_eq!(grad.biases, vec![1.0, -1.0]);
        assert_eq!(grad.weights.data, vec![
            vec![1.0, 2.0, 3.0],
            vec![-1.0, -2.0, -3.0],
        ]);
        // Wᵗ · [1, -1]
        assert_eq!(input_error, vec![2.0, 1.5, -2.5]);
    }

    #[test]
    fn backward_applies_activation_derivative() {
        let layer = fixed_layer(ActivationFunction::Sigmoid);
        let cache = layer.forward_cached(&[1.0, 0.5, -0.5]).unwrap();
        let (_, grad) = layer.backward(&cache, &[1.0, 1.0]).unwrap();
        let a0 = cache.output[0];
        assert_relative_eq!(grad.biases[0], a0 * (1.0 - a0), epsilon = 1e-12);
    }

    #[test]
    fn apply_gradient_scales_by_batch() {
        let mut layer = fixed_layer(ActivationFunction::Identity);
        let mut grad = LayerGradient::zeros_like(&layer);
        grad.weights.data[0][0] = 4.0;
        grad.biases[1] = 2.0;
        layer.apply_gradient(&grad, 0.5, 2).unwrap();
        assert_relative_eq!(layer.weights().data[0][0], 0.0);
        assert_relative_eq!(layer.biases()[1], -0.5);
    }

    #[test]
    fn apply_gradient_rejects_empty_batch() {
        let mut layer = fixed_layer(ActivationFunction::Identity);
        let grad = LayerGradient::zeros_like(&layer);
        assert!(matches!(layer.apply_gradient(&grad, 0.1, 0), Err(NnError::EmptyBatch)));
    }

    fn assert_rejected_untouched(gradient: LayerGradient) {
        let mut layer = fixed_layer(ActivationFunction::Identity);
        let before = layer.clone();
        let err = layer.apply_gradient(&gradient, 0.1, 1).unwrap_err();
        assert!(matches!(err, NnError::DimensionMismatch { .. }), "{:?}", err);
        assert_eq!(layer.weights(), before.weights());
        assert_eq!(layer.biases(), before.biases());
    }

    #[test]
    fn apply_gradient_rejects_wrong_row_count() {
        assert_rejected_untouched(LayerGradient {
            weights: Matrix::zeros(3, 3),
            biases: vec![1.0; 2],
        });
    }

    #[test]
    fn apply_gradient_rejects_wrong_column_count() {
        assert_rejected_untouched(LayerGradient {
            weights: Matrix::zeros(2, 2),
            biases: vec![1.0; 2],
        });
    }

    #[test]
    fn apply_gradient_rejects_wrong_bias_length() {
        assert_rejected_untouched(LayerGradient {
            weights: Matrix::zeros(2, 3),
            biases: vec![1.0; 3],
        });
    }

    #[test]
    fn apply_gradient_rejects_ragged_weight_rows() {
        assert_rejected_untouched(LayerGradient {
            weights: Matrix { rows: 2, cols: 3, data: vec![vec![1.0, 1.0, 1.0], vec![1.0]] },
            biases: vec![1.0; 2],
        });
    }

    #[test]
    fn from_parameters_checks_bias_length() {
        let weights = Matrix::zeros(2, 3);
        assert!(Layer::from_parameters(weights, vec![0.0; 3], ActivationFunction::Sigmoid).is_err());
    }

    #[test]
    fn from_parameters_rejects_rows_narrower_than_declared() {
        let weights = Matrix { rows: 2, cols: 3, data: vec![vec![1.0], vec![1.0]] };
        let err = Layer::from_parameters(weights, vec![0.0, 0.0], ActivationFunction::Identity)
            .unwrap_err();
        assert!(matches!(err, NnError::DimensionMismatch { expected: 3, got: 1, .. }));
    }
}
