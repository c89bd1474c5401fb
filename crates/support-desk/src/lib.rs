//! # support-desk
//!
//! Technical support triage agent: a customer issue goes in, a structured
//! resolution comes out.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   compose_prompt   ┌─────────────────┐
//! │ SupportQuery │ ─────────────────▶ │  AgentGateway   │
//! └──────────────┘                    │  (LLM/offline)  │
//!                                     └───────┬─────────┘
//!                        tool calls           │
//!          ┌──────────────────────────────────┤
//!          ▼                                  ▼
//! ┌───────────────────────┐      ┌────────────────────┐
//! │ search_knowledge_base │      │   check_severity   │
//! │   (KnowledgeBase)     │      │ (keyword heuristic)│
//! └───────────────────────┘      └────────────────────┘
//!                                             │
//!                                             ▼
//!                               SupportResponse (validated)
//! ```
//!
//! The gateway is injected, so the same handler runs against a local
//! Ollama model, an OpenAI-compatible endpoint, the rule-based
//! [`OfflineGateway`], or a closure in tests.

pub mod error;
pub mod gateway;
pub mod handler;
pub mod matcher;
pub mod model;
pub mod scorer;
pub mod svckit;

pub use error::{GatewayError, Result, TriageError};
pub use gateway::{AgentGateway, FnGateway, LlmGateway, OfflineGateway};
pub use handler::{compose_prompt, handle_support_query};
pub use matcher::{IssueMatches, search_known_issues};
pub use model::{KnowledgeBase, Severity, SeverityAssessment, SupportQuery, SupportResponse};
pub use scorer::check_severity;

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{KnowledgeSearchTool, SeverityCheckTool, support_tools};
}

/// System prompt for the support agent
pub const SUPPORT_AGENT_PROMPT: &str = r"You are an expert technical support AI agent. Your role is to:

1. Analyze customer issues using the provided tools
2. Search the knowledge base for known solutions
3. Provide clear, actionable solutions
4. Determine if escalation is needed
5. Estimate resolution time

Always use the available tools to verify information before responding.

## Tools Available

- `search_knowledge_base` - Find known issues and their fixes for a product
- `check_severity` - Get the priority level, escalation flag and time estimate";
