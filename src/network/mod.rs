pub mod network;
pub mod spec;

pub use network::{BatchGradient, Network};
pub use spec::NetworkSpec;
