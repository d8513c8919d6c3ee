//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for text-generation backends so the caller can
//! work with any of them without code changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = GeminiProvider::from_env()?;
//! let completion = provider
//!     .prompt("You are terse.", "Summarise today.", &GenerationOptions::default())
//!     .await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Top-p nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Stop sequences
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

const fn default_temperature() -> f32 { 0.7 }
const fn default_max_tokens() -> u32 { 1024 }
const fn default_top_p() -> f32 { 0.9 }

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            stop_sequences: Vec::new(),
        }
    }
}

impl GenerationOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

/// Token usage statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    Other(String),
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name used in logs (e.g., "Gemini")
    fn name(&self) -> &str;

    /// Generate a completion from messages
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion>;

    /// Single request/response with a system instruction and one user turn
    async fn prompt(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let messages = [Message::system(system), Message::user(user)];
        self.complete(&messages, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    struct Echo;

    #[async_trait]
    impl LlmProvider for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> Result<Completion> {
            let roles: Vec<String> = messages.iter().map(|m| m.role.to_string()).collect();
            Ok(Completion {
                content: roles.join(","),
                model: options.model.clone(),
                usage: None,
                finish_reason: Some(FinishReason::Stop),
            })
        }
    }

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert!((opts.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, 1024);
        assert_eq!(opts.model, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_prompt_sends_system_then_user() {
        let opts = GenerationOptions::default().with_model("m1");
        let completion = Echo.prompt("sys", "usr", &opts).await.unwrap();

        assert_eq!(completion.content, format!("{},{}", Role::System, Role::User));
        assert_eq!(completion.model, "m1");
    }
}
