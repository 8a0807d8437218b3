//! Stochastic layout of the fuzzy graph in the target dimension.
//!
//! Attractive updates along sampled edges, repulsive updates against random
//! points, learning rate decaying linearly to zero. All randomness comes from one
//! seeded `StdRng`, and updates run sequentially, so identical input gives an
//! identical layout.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::fuzzy_graph::Edge;

const CLIP: f64 = 4.0;
const INIT_RANGE: f32 = 10.0;
const CURVE_SAMPLES: usize = 300;

/// Parameters of the low-dimensional similarity curve `1 / (1 + a * d^(2b))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveParams {
    pub a: f64,
    pub b: f64,
}

/// Least-squares fit of the curve to the `min_dist`/`spread` target:
/// 1 below `min_dist`, exponential decay with scale `spread` above it.
pub fn find_ab_params(spread: f64, min_dist: f64) -> CurveParams {
    let xs: Vec<f64> = (0..CURVE_SAMPLES)
        .map(|i| 3.0 * spread * i as f64 / (CURVE_SAMPLES - 1) as f64)
        .collect();
    let ys: Vec<f64> = xs
        .iter()
        .map(|&x| {
            if x < min_dist {
                1.0
            } else {
                (-(x - min_dist) / spread).exp()
            }
        })
        .collect();

    let sse = |a: f64, b: f64| -> f64 {
        xs.iter()
            .zip(&ys)
            .map(|(&x, &y)| {
                let f = 1.0 / (1.0 + a * x.powf(2.0 * b));
                (f - y) * (f - y)
            })
            .sum()
    };

    // Pattern search from a neutral start; both parameters stay positive.
    let (mut a, mut b) = (1.0f64, 1.0f64);
    let mut best = sse(a, b);
    let mut step = 0.5f64;
    while step > 1e-7 {
        let mut improved = false;
        for (da, db) in [(step, 0.0), (-step, 0.0), (0.0, step), (0.0, -step)] {
            let (na, nb) = (a + da, b + db);
            if na <= 0.0 || nb <= 0.0 {
                continue;
            }
            let candidate = sse(na, nb);
            if candidate < best {
                best = candidate;
                a = na;
                b = nb;
                improved = true;
            }
        }
        if !improved {
            step /= 2.0;
        }
    }
    CurveParams { a, b }
}

/// Layout optimisation settings.
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub n_components: usize,
    pub n_epochs: usize,
    pub learning_rate: f64,
    pub negative_sample_rate: usize,
    pub curve: CurveParams,
    pub seed: u64,
}

pub fn optimize_layout(n_points: usize, edges: &[Edge], params: &LayoutParams) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let dim = params.n_components;
    let mut embedding: Vec<Vec<f32>> = (0..n_points)
        .map(|_| {
            (0..dim)
                .map(|_| rng.gen_range(-INIT_RANGE..INIT_RANGE))
                .collect()
        })
        .collect();

    let n_epochs = params.n_epochs.max(1);
    let max_w = edges.iter().map(|e| e.2).fold(0.0f32, f32::max) as f64;
    if max_w <= 0.0 || n_points < 2 {
        return embedding;
    }

    // Edges too weak to be sampled once over all epochs are dropped.
    let active: Vec<(usize, usize, f64)> = edges
        .iter()
        .filter(|e| (e.2 as f64) >= max_w / n_epochs as f64)
        .map(|&(i, j, w)| (i, j, max_w / w as f64))
        .collect();
    let neg_rate = params.negative_sample_rate.max(1) as f64;
    let mut next_sample: Vec<f64> = active.iter().map(|e| e.2).collect();
    let mut next_negative: Vec<f64> = active.iter().map(|e| e.2 / neg_rate).collect();

    let CurveParams { a, b } = params.curve;
    let mut delta = vec![0.0f64; dim];

    for epoch in 0..n_epochs {
        let alpha = params.learning_rate * (1.0 - epoch as f64 / n_epochs as f64);
        let now = epoch as f64;

        for (e, &(head, tail, epochs_per_sample)) in active.iter().enumerate() {
            if next_sample[e] > now {
                continue;
            }

            let dist2 = squared(&embedding[head], &embedding[tail]);
            let coeff = if dist2 > 0.0 {
                -2.0 * a * b * dist2.powf(b - 1.0) / (1.0 + a * dist2.powf(b))
            } else {
                0.0
            };
            for d in 0..dim {
                delta[d] = clip(coeff * (embedding[head][d] - embedding[tail][d]) as f64) * alpha;
            }
            for d in 0..dim {
                embedding[head][d] += delta[d] as f32;
                embedding[tail][d] -= delta[d] as f32;
            }
            next_sample[e] += epochs_per_sample;

            let eps_negative = epochs_per_sample / neg_rate;
            let n_negative = ((now - next_negative[e]) / eps_negative).floor().max(0.0) as usize;
            for _ in 0..n_negative {
                let other = rng.gen_range(0..n_points);
                if other == head {
                    continue;
                }
                let dist2 = squared(&embedding[head], &embedding[other]);
                for d in 0..dim {
                    let grad = if dist2 > 0.0 {
                        let coeff = 2.0 * b / ((0.001 + dist2) * (1.0 + a * dist2.powf(b)));
                        clip(coeff * (embedding[head][d] - embedding[other][d]) as f64)
                    } else {
                        CLIP
                    };
                    embedding[head][d] += (grad * alpha) as f32;
                }
            }
            next_negative[e] += n_negative as f64 * eps_negative;
        }
    }
    embedding
}

fn squared(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum()
}

fn clip(v: f64) -> f64 {
    v.clamp(-CLIP, CLIP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_fit_matches_reference_values() {
        let p = find_ab_params(1.0, 0.1);
        assert!((p.a - 1.577).abs() < 0.05, "a = {}", p.a);
        assert!((p.b - 0.895).abs() < 0.02, "b = {}", p.b);
    }

    #[test]
    fn layout_is_seeded() {
        let edges = vec![(0, 1, 1.0), (1, 2, 0.5), (2, 3, 1.0)];
        let params = LayoutParams {
            n_components: 2,
            n_epochs: 50,
            learning_rate: 1.0,
            negative_sample_rate: 5,
            curve: find_ab_params(1.0, 0.1),
            seed: 7,
        };
        let a = optimize_layout(4, &edges, &params);
        let b = optimize_layout(4, &edges, &params);
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        assert!(a.iter().all(|row| row.len() == 2 && row.iter().all(|v| v.is_finite())));
    }
}
