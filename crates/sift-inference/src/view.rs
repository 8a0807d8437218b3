use sift_core::{ClusterSnapshot, ConfidenceCurve, Intent, SnapshotVersion};

/// An active intent's centroid in the original embedding space.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateCentroid {
    pub intent_id: String,
    pub cluster_id: u32,
    pub centroid: Vec<f32>,
    /// Members nearest the centroid, used as similar tickets and prompt examples.
    pub representatives: Vec<String>,
}

/// Everything classification needs from one snapshot.
#[derive(Debug, Clone)]
pub struct ClassifierView {
    pub snapshot_version: Option<SnapshotVersion>,
    pub model_version: Option<String>,
    /// Sorted by intent id, so a linear scan breaks distance ties deterministically.
    pub candidates: Vec<CandidateCentroid>,
    pub calibration: ConfidenceCurve,
    pub dimensions: usize,
}

impl ClassifierView {
    /// No snapshot published yet: every classification returns the empty result.
    pub fn empty() -> Self {
        Self {
            snapshot_version: None,
            model_version: None,
            candidates: Vec::new(),
            calibration: ConfidenceCurve::default(),
            dimensions: 0,
        }
    }

    /// Keep intents that are active, bound, and bound against this very snapshot.
    pub fn build(snapshot: &ClusterSnapshot, intents: &[Intent], representatives: usize) -> Self {
        let mut candidates: Vec<CandidateCentroid> = intents
            .iter()
            .filter(|i| i.is_classifiable() && i.snapshot_version == Some(snapshot.version))
            .filter_map(|intent| {
                let cluster_id = intent.cluster_id?;
                let centroid = snapshot.centroid(cluster_id)?;
                Some(CandidateCentroid {
                    intent_id: intent.intent_id.clone(),
                    cluster_id,
                    centroid: centroid.vector.clone(),
                    representatives: snapshot.representatives(cluster_id, representatives),
                })
            })
            .collect();
        candidates.sort_by(|a, b| a.intent_id.cmp(&b.intent_id));

        Self {
            snapshot_version: Some(snapshot.version),
            model_version: Some(snapshot.model_version.clone()),
            candidates,
            calibration: snapshot.calibration,
            dimensions: snapshot.dimensions(),
        }
    }

    pub fn candidate(&self, intent_id: &str) -> Option<&CandidateCentroid> {
        self.candidates
            .binary_search_by(|c| c.intent_id.as_str().cmp(intent_id))
            .ok()
            .map(|idx| &self.candidates[idx])
    }
}
