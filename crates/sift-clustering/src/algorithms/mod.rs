//! Numeric building blocks of the projection and quality metrics.

pub mod distance;
pub mod fuzzy_graph;
pub mod knn;
pub mod layout;
pub mod silhouette;
