//! Provider selection
//!
//! Maps a provider name (CLI flag or `SUPPORT_PROVIDER`) to a configured
//! `LlmProvider`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use agent_core::{AgentError, LlmProvider, Result};

use crate::openai_compat::OpenAiCompatProvider;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProviderKind {
    /// Local Ollama daemon
    #[default]
    Ollama,
    /// OpenAI-compatible HTTP endpoint (Groq by default)
    OpenAi,
}

impl ProviderKind {
    /// Model used when none is configured
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Ollama => "llama3.2",
            Self::OpenAi => "llama-3.3-70b-versatile",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" | "openai-compat" | "groq" => Ok(Self::OpenAi),
            other => Err(AgentError::Config(format!(
                "unknown provider '{other}' (expected 'ollama' or 'openai')"
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

/// Build the provider for `kind` from environment configuration
pub fn provider_from_env(kind: ProviderKind) -> Result<Arc<dyn LlmProvider>> {
    match kind {
        #[cfg(feature = "ollama")]
        ProviderKind::Ollama => Ok(Arc::new(crate::ollama::OllamaProvider::from_env())),
        #[cfg(not(feature = "ollama"))]
        ProviderKind::Ollama => Err(AgentError::Config(
            "agent-runtime was built without the 'ollama' feature".into(),
        )),
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiCompatProvider::from_env()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_kind() {
        assert_eq!("Ollama".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert_eq!("groq".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" openai ".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert!("bedrock".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for kind in [ProviderKind::Ollama, ProviderKind::OpenAi] {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
    }
}
