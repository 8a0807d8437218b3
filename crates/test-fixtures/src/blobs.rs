use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sift_core::EmbeddingRecord;

/// Seeded isotropic gaussian blobs. Blob `b` is centred at `10 * b` on axis `b % dims`;
/// ticket ids are `"b{b}-{i:03}"`, so sorting by id keeps blob members together.
pub fn gaussian_blobs(
    n_blobs: usize,
    per_blob: usize,
    dims: usize,
    std_dev: f32,
    seed: u64,
    model_version: &str,
) -> Vec<EmbeddingRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(n_blobs * per_blob);
    for b in 0..n_blobs {
        let mut center = vec![0.0f32; dims];
        center[b % dims] = 10.0 * (b as f32 + 1.0);
        for i in 0..per_blob {
            let vector = center
                .iter()
                .map(|c| c + std_dev * standard_normal(&mut rng))
                .collect();
            records.push(EmbeddingRecord::new(format!("b{b}-{i:03}"), vector, model_version));
        }
    }
    records
}

/// Box-Muller transform.
fn standard_normal(rng: &mut StdRng) -> f32 {
    let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
    let u2: f32 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
}
