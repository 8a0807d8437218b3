use async_trait::async_trait;

use crate::errors::SiftResult;
use crate::models::Prompt;

/// Text generation service. Fallible and rate limited; callers retry externally.
#[async_trait]
pub trait IGenerationService: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> SiftResult<String>;

    fn name(&self) -> &str;
}
