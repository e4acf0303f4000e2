use ferrite_digits::{ActivationFunction, Network, Sample, TrainConfig, Trainer};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut network = Network::new(&[2, 4, 2], ActivationFunction::Sigmoid, &mut rng)?;

    // Two output classes: [1, 0] = "inputs equal", [0, 1] = "inputs differ".
    let samples = vec![
        Sample::new(vec![1.0, 0.0], vec![0.0, 1.0]),
        Sample::new(vec![1.0, 1.0], vec![1.0, 0.0]),
        Sample::new(vec![0.0, 1.0], vec![0.0, 1.0]),
        Sample::new(vec![0.0, 0.0], vec![1.0, 0.0]),
    ];

    let mut trainer = Trainer::new(TrainConfig::new(1000, 2, 2.0)?, rng);
    for round in 0..5 {
        let report = trainer.train(&mut network, &samples, Some(&samples))?;
        println!(
            "round {}: loss = {:.6}, accuracy = {:.2}",
            round,
            report.train_losses.last().copied().unwrap_or_default(),
            report.accuracy.unwrap_or_default()
        );
    }

    for sample in &samples {
        println!("Input: {:?} -> Output: {:.4?}", sample.input, network.predict(&sample.input)?);
    }
    Ok(())
}
