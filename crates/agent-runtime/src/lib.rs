//! # agent-runtime
//!
//! Runtime providers for the fund-flows narrative stage.
//!
//! ## Providers
//!
//! - **Gemini** (default): Google Generative Language REST API, keyed by
//!   `GEMINI_API_KEY`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::GeminiProvider;
//!
//! let provider = GeminiProvider::from_env();
//! let completion = provider.prompt(system, user, &options).await?;
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider};

// Re-export core types for convenience
pub use agent_core::{AgentError, Completion, GenerationOptions, LlmProvider, Message, Result, Role};
