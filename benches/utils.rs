#![allow(dead_code)]
use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// A heavy tailed sample: uniform noise with a few large spikes.
pub(crate) fn create_sample(n_samples: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(1903);
    let noise = Uniform::new(-1.0, 1.0);
    (0..n_samples)
        .map(|_| {
            let v: f64 = rng.sample(noise);
            if rng.gen::<f64>() < 0.01 {
                v * 100.0
            } else {
                v
            }
        })
        .collect()
}

// Column major features plus a target that is a noisy linear function of them.
pub(crate) fn create_data(n_samples: usize, n_features: usize) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(1903);

    let feature_distribution = Uniform::new(0.0, 1.0);
    let noise_distribution = Uniform::new(-1.0, 1.0);
    let weights: Vec<f64> = (0..n_features).map(|_| rng.sample(noise_distribution)).collect();

    let mut feature_space: Vec<Vec<f64>> = vec![Vec::with_capacity(n_samples); n_features];
    let mut target_variable: Vec<f64> = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let mut linear = 0.0;
        for (j, col) in feature_space.iter_mut().enumerate() {
            let v: f64 = rng.sample(feature_distribution);
            col.push(v);
            linear += v * weights[j];
        }
        target_variable.push(linear + rng.sample(noise_distribution));
    }

    (feature_space.into_iter().flatten().collect(), target_variable)
}
