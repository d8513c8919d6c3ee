//! # agent-core
//!
//! Provider-agnostic LLM abstraction for single-shot text generation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  caller (narrative stage)                            │
//! │     │  system + user prompt, GenerationOptions       │
//! │     ▼                                                │
//! │  ┌───────────────────┐      ┌─────────────────────┐  │
//! │  │   LlmProvider     │──────│ Gemini / test stub  │  │
//! │  │   (Strategy)      │      │                     │  │
//! │  └───────────────────┘      └─────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait lets the narrative stage swap backends without
//! touching prompt construction or error policy.

pub mod error;
pub mod message;
pub mod provider;

pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, FinishReason, GenerationOptions, LlmProvider, TokenUsage};
