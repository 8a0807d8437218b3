//! # sift-inference
//!
//! Inference Classifier. A [`ClassifierView`] is an immutable pairing of one
//! snapshot with the intents relinked against it; the [`InferenceClassifier`]
//! swaps views atomically, so a classification never sees a half-relinked catalog.

pub mod classifier;
pub mod view;

pub use classifier::InferenceClassifier;
pub use view::{CandidateCentroid, ClassifierView};
