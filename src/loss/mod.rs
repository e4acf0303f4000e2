pub mod quadratic;

pub use quadratic::QuadraticLoss;
