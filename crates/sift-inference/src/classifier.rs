//! Nearest-centroid classification with calibrated confidence.

use std::sync::{Arc, RwLock};

use sift_core::config::InferenceConfig;
use sift_core::errors::ClusteringError;
use sift_core::{ClassificationResult, ConfidenceBand, SiftResult};
use tracing::debug;

use crate::view::ClassifierView;

pub struct InferenceClassifier {
    view: RwLock<Arc<ClassifierView>>,
    config: InferenceConfig,
}

impl InferenceClassifier {
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            view: RwLock::new(Arc::new(ClassifierView::empty())),
            config,
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Current view. Callers that classify several times against one snapshot hold on to it.
    pub fn view(&self) -> Arc<ClassifierView> {
        let guard = self.view.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the view in one step.
    pub fn swap(&self, view: ClassifierView) {
        let mut guard = self.view.write().unwrap_or_else(|e| e.into_inner());
        debug!(
            snapshot = ?view.snapshot_version,
            candidates = view.candidates.len(),
            "classifier view swapped"
        );
        *guard = Arc::new(view);
    }

    pub fn classify(&self, embedding: &[f32]) -> SiftResult<ClassificationResult> {
        classify_with(&self.view(), &self.config, embedding)
    }
}

/// Classify against a specific view.
///
/// No candidates yields the empty result; it is never an error. Equal minimum
/// distances resolve to the lexically smallest intent id.
pub fn classify_with(
    view: &ClassifierView,
    config: &InferenceConfig,
    embedding: &[f32],
) -> SiftResult<ClassificationResult> {
    if view.candidates.is_empty() {
        return Ok(ClassificationResult::empty(view.snapshot_version));
    }
    if embedding.len() != view.dimensions {
        return Err(ClusteringError::DimensionMismatch {
            expected: view.dimensions,
            actual: embedding.len(),
        }
        .into());
    }

    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in view.candidates.iter().enumerate() {
        let d = euclidean(embedding, &candidate.centroid);
        // Strict `<` keeps the earlier, lexically smaller intent on ties.
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((idx, d));
        }
    }
    let Some((idx, distance)) = best else {
        return Ok(ClassificationResult::empty(view.snapshot_version));
    };

    let nearest = &view.candidates[idx];
    let confidence = view.calibration.confidence(distance);
    let band = ConfidenceBand::from_confidence(
        confidence,
        config.high_threshold,
        config.medium_threshold,
    );
    let usable = band.is_usable();
    debug!(
        nearest = %nearest.intent_id,
        distance,
        confidence,
        band = %band,
        "ticket classified"
    );

    Ok(ClassificationResult {
        intent_id: usable.then(|| nearest.intent_id.clone()),
        confidence,
        band,
        nearest_intent_id: Some(nearest.intent_id.clone()),
        cluster_id: Some(nearest.cluster_id),
        distance: Some(distance),
        snapshot_version: view.snapshot_version,
        similar_ticket_ids: if usable {
            nearest.representatives.clone()
        } else {
            Vec::new()
        },
    })
}

fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
