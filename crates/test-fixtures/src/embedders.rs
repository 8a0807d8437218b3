use sift_core::traits::IEmbeddingProvider;
use sift_core::SiftResult;

/// Hash-based embedder: identical text always yields the identical vector.
pub struct DeterministicEmbedder {
    dims: usize,
    model_version: String,
}

impl DeterministicEmbedder {
    pub fn new(dims: usize, model_version: &str) -> Self {
        Self {
            dims,
            model_version: model_version.to_string(),
        }
    }
}

impl IEmbeddingProvider for DeterministicEmbedder {
    fn embed(&self, text: &str) -> SiftResult<Vec<f32>> {
        Ok(text_to_embedding(text, self.dims))
    }
    fn embed_batch(&self, texts: &[String]) -> SiftResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| text_to_embedding(t, self.dims)).collect())
    }
    fn dimensions(&self) -> usize {
        self.dims
    }
    fn model_version(&self) -> &str {
        &self.model_version
    }
    fn name(&self) -> &str {
        "deterministic-test"
    }
    fn is_available(&self) -> bool {
        true
    }
}

/// Generate a deterministic embedding in [-1, 1] from text (hash-based).
pub fn text_to_embedding(text: &str, dims: usize) -> Vec<f32> {
    let hash = blake3::hash(text.as_bytes());
    let bytes = hash.as_bytes();
    (0..dims)
        .map(|i| {
            let byte = bytes[i % 32];
            (byte as f32 / 255.0) * 2.0 - 1.0
        })
        .collect()
}

/// Embedder that places texts mentioning a topic keyword near that topic's
/// axis, with a small hash-derived jitter. Texts with no keyword sit near the origin.
pub struct TopicEmbedder {
    topics: Vec<String>,
    dims: usize,
    jitter: f32,
    model_version: String,
}

impl TopicEmbedder {
    pub fn new(topics: &[&str], model_version: &str) -> Self {
        Self {
            topics: topics.iter().map(|t| t.to_lowercase()).collect(),
            dims: (topics.len() * 2).max(8),
            jitter: 0.08,
            model_version: model_version.to_string(),
        }
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut v: Vec<f32> = text_to_embedding(text, self.dims)
            .into_iter()
            .map(|x| x * self.jitter)
            .collect();
        if let Some(k) = self.topics.iter().position(|t| lower.contains(t.as_str())) {
            v[2 * k] += 1.0;
            v[2 * k + 1] += 1.0;
        }
        v
    }
}

impl IEmbeddingProvider for TopicEmbedder {
    fn embed(&self, text: &str) -> SiftResult<Vec<f32>> {
        Ok(self.vector(text))
    }
    fn embed_batch(&self, texts: &[String]) -> SiftResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
    fn dimensions(&self) -> usize {
        self.dims
    }
    fn model_version(&self) -> &str {
        &self.model_version
    }
    fn name(&self) -> &str {
        "topic-test"
    }
    fn is_available(&self) -> bool {
        true
    }
}
