/// Quadratic cost `C = ½‖a − y‖²`, the cost paired with every activation in
/// this crate.
pub struct QuadraticLoss;

impl QuadraticLoss {
    /// Scalar cost for one sample: ½ Σ (predicted − expected)².
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        0.5 * predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
    }

    /// ∂C/∂a: predicted − expected. The layer multiplies in f'(z) itself.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| a - b)
            .collect()
    }
}
