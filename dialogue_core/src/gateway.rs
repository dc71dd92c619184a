//! Generation gateway port - the text-completion model as a black box.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling parameters handed to the model on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Length budget of the completion.
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub no_repeat_ngram_size: u32,
    pub sampling_enabled: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 80,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.85,
            repetition_penalty: 1.2,
            no_repeat_ngram_size: 3,
            sampling_enabled: true,
        }
    }
}

/// Failures reported by a gateway implementation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation backend failed: {0}")]
    Backend(String),

    #[error("malformed completion: {0}")]
    Malformed(String),
}

/// A blocking text-completion call.
///
/// Implementations strip any echoed prompt before returning (see
/// [`strip_echoed_prompt`]). Timeouts and cancellation belong to the caller.
pub trait GenerationGateway {
    fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, GenerationError>;
}

impl<F> GenerationGateway for F
where
    F: Fn(&str, &GenerationConfig) -> Result<String, GenerationError>,
{
    fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, GenerationError> {
        self(prompt, config)
    }
}

/// The completion without a leading copy of the prompt.
pub fn strip_echoed_prompt<'a>(prompt: &str, completion: &'a str) -> &'a str {
    completion
        .strip_prefix(prompt)
        .map(str::trim)
        .unwrap_or(completion)
}
