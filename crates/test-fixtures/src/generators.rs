use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sift_core::traits::IGenerationService;
use sift_core::{Prompt, SiftError, SiftResult};

/// Replies `"{reply} #{n}"` where `n` counts calls, after an optional delay.
///
/// The counter makes duplicate generations visible: two callers that share one
/// generation see the same `#n`. The last prompt is kept for assertions.
pub struct ScriptedGenerator {
    reply: String,
    numbered: bool,
    delay: Duration,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<Prompt>>,
}

impl ScriptedGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            numbered: true,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Replies exactly `reply` every time.
    pub fn verbatim(reply: &str) -> Self {
        Self {
            numbered: false,
            ..Self::new(reply)
        }
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.last_prompt.lock().unwrap().clone()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IGenerationService for ScriptedGenerator {
    async fn generate(&self, prompt: &Prompt) -> SiftResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_prompt.lock().unwrap() = Some(prompt.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.numbered {
            Ok(format!("{} #{}", self.reply, n))
        } else {
            Ok(self.reply.clone())
        }
    }

    fn name(&self) -> &str {
        "scripted-test"
    }
}

/// Always fails, counting attempts.
#[derive(Default)]
pub struct FailingGenerator {
    calls: AtomicUsize,
}

impl FailingGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IGenerationService for FailingGenerator {
    async fn generate(&self, _prompt: &Prompt) -> SiftResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SiftError::generation_unavailable("upstream returned 503"))
    }

    fn name(&self) -> &str {
        "failing-test"
    }
}
