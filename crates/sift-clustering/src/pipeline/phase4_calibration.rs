//! Phase 4: Calibration. Fit the distance-to-confidence curve on member distances.

use sift_core::models::ClusterAssignment;
use sift_core::ConfidenceCurve;

/// Fitted on non-noise members only; a member at the median distance maps to 0.9.
pub fn calibrate(assignments: &[ClusterAssignment]) -> ConfidenceCurve {
    let distances: Vec<f64> = assignments
        .iter()
        .filter(|a| !a.is_noise)
        .map(|a| a.distance_to_centroid)
        .collect();
    ConfidenceCurve::fit(&distances)
}
