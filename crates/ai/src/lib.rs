pub mod engine;
pub mod extract;
pub mod gemini;
pub mod model;
mod prompts;

pub use engine::{ChatEngine, Classification, ContextualParse, Intent, ParsedTransaction};
pub use gemini::{GeminiConfig, GeminiModel};
pub use model::{LanguageModel, MockModel};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("model output is not the expected JSON: {0}")]
    Unparseable(String),
    #[error("mock model script exhausted")]
    ScriptExhausted,
}
