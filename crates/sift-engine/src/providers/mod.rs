//! HTTP adapters for OpenAI-compatible embedding and chat-completion endpoints.

pub mod http_embedding;
pub mod http_generation;

pub use http_embedding::HttpEmbeddingProvider;
pub use http_generation::HttpGenerationService;

/// Read an API key from the named environment variable; unset or blank means none.
fn api_key_from_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|k| !k.trim().is_empty())
}
