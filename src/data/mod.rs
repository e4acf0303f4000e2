pub mod idx;
pub mod mnist;
pub mod sample;

pub use mnist::MnistData;
pub use sample::{argmax, one_hot, Sample};
