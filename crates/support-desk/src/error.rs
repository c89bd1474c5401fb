//! Error Types for the Support Desk

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TriageError>;

/// Failures raised while a gateway turns a prompt into a response
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// Classify an agent failure; unusable output is reported as an invalid response
    pub fn from_agent(err: AgentError) -> Self {
        match err {
            AgentError::Parse(msg) => Self::InvalidResponse(msg),
            AgentError::ProviderUnavailable(msg) => Self::Unavailable(msg),
            other => Self::Agent(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_agent_classification() {
        assert!(matches!(
            GatewayError::from_agent(AgentError::Parse("no json".into())),
            GatewayError::InvalidResponse(_)
        ));
        assert!(matches!(
            GatewayError::from_agent(AgentError::ProviderUnavailable("down".into())),
            GatewayError::Unavailable(_)
        ));
        assert!(matches!(
            GatewayError::from_agent(AgentError::MaxIterations(3)),
            GatewayError::Agent(AgentError::MaxIterations(3))
        ));
    }

    #[test]
    fn test_triage_error_wraps_gateway() {
        let err: TriageError = GatewayError::InvalidResponse("priority_level 9".into()).into();
        assert_eq!(
            err.to_string(),
            "Gateway error: Invalid response: priority_level 9"
        );
    }
}
