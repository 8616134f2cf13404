use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::AiError;

/// Seam to the hosted LLM. The engine only ever needs prompt-in, text-out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, AiError>;
}

/// Scripted model for tests: replies are returned in order, and an exhausted
/// script (or `failing()`) surfaces as an error the same way a dead API would.
pub struct MockModel {
    replies: Mutex<VecDeque<String>>,
}

impl MockModel {
    pub fn new(replies: Vec<&str>) -> Self {
        MockModel {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
        }
    }

    pub fn failing() -> Self {
        MockModel {
            replies: Mutex::new(VecDeque::new()),
        }
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String, AiError> {
        self.replies
            .lock()
            .expect("mock model lock")
            .pop_front()
            .ok_or(AiError::ScriptExhausted)
    }
}
