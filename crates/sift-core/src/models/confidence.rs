use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Smallest spread the curve is fitted with, so degenerate snapshots
/// (all members on their centroid) still produce a usable curve.
const MIN_SPREAD: f64 = 1e-6;

/// Distance → confidence mapping fitted at recompute time.
///
/// Logistic in distance: `1 / (1 + exp(steepness * (d - midpoint)))`.
/// The median member-to-centroid distance maps to 0.9. The midpoint sits one spread
/// past the median, where the spread is the median-to-p90 gap, floored at a quarter
/// of p90. Strictly decreasing in `d`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceCurve {
    pub midpoint: f64,
    pub steepness: f64,
}

impl ConfidenceCurve {
    pub fn new(midpoint: f64, steepness: f64) -> Self {
        Self {
            midpoint: midpoint.max(0.0),
            steepness: steepness.max(f64::MIN_POSITIVE),
        }
    }

    /// Fit against the intra-cluster distances observed at recompute.
    pub fn fit(distances: &[f64]) -> Self {
        let mut sorted: Vec<f64> = distances.iter().copied().filter(|d| d.is_finite()).collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let median = percentile(&sorted, 0.5);
        let p90 = percentile(&sorted, 0.9);
        let spread = (p90 - median).max(p90 * 0.25).max(MIN_SPREAD);
        Self::new(median + spread, 9f64.ln() / spread)
    }

    /// Confidence in [0, 1] for a distance. Non-finite or NaN distances score 0.
    pub fn confidence(&self, distance: f64) -> f64 {
        if distance.is_nan() || distance == f64::INFINITY {
            return 0.0;
        }
        let d = distance.max(0.0);
        let value = 1.0 / (1.0 + (self.steepness * (d - self.midpoint)).exp());
        value.clamp(0.0, 1.0)
    }

    /// Inverse of [`confidence`](Self::confidence): the distance that scores `confidence`.
    pub fn distance_at(&self, confidence: f64) -> f64 {
        let c = confidence.clamp(1e-12, 1.0 - 1e-12);
        (self.midpoint + (1.0 / c - 1.0).ln() / self.steepness).max(0.0)
    }
}

impl Default for ConfidenceCurve {
    fn default() -> Self {
        Self::new(1.0, 9f64.ln() / 0.5)
    }
}

/// Linear-interpolated percentile over sorted input.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Band policy applied to a confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    /// `> high` is High, `[medium, high]` is Medium, below `medium` is Low.
    pub fn from_confidence(confidence: f64, high: f64, medium: f64) -> Self {
        if confidence > high {
            Self::High
        } else if confidence >= medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Whether a suggestion may be produced for this band.
    pub fn is_usable(self) -> bool {
        !matches!(self, Self::Low)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown confidence band: {other}")),
        }
    }
}
