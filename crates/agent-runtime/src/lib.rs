//! # agent-runtime
//!
//! Runtime providers for the support desk agent.
//!
//! ## Providers
//!
//! - **Ollama** (default feature): local inference via `ollama-rs`
//! - **OpenAI-compatible**: any `/chat/completions` endpoint, Groq by default
//! - **Scripted**: canned replies for tests and offline runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{provider_from_env, ProviderKind};
//!
//! let provider = provider_from_env(ProviderKind::Ollama)?;
//! let agent = AgentBuilder::new().provider(provider).build()?;
//! ```

pub mod config;
#[cfg(feature = "ollama")]
pub mod ollama;
pub mod openai_compat;
pub mod scripted;

pub use config::{ProviderKind, provider_from_env};
#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};
pub use openai_compat::{OpenAiCompatConfig, OpenAiCompatProvider};
pub use scripted::ScriptedProvider;

// Re-export core types for convenience
pub use agent_core::{AgentError, LlmProvider, Message, Result, Role};
