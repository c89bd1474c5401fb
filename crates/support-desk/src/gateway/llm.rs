//! LLM-backed gateway
//!
//! Runs the agent-core reasoning loop with the support prompt and parses the
//! final answer into a validated [`SupportResponse`].

use std::sync::Arc;

use agent_core::{AgentBuilder, AgentConfig, Conversation, LlmProvider, Message, ToolRegistry};
use async_trait::async_trait;

use super::AgentGateway;
use crate::SUPPORT_AGENT_PROMPT;
use crate::error::GatewayError;
use crate::model::SupportResponse;

const RESPONSE_FORMAT: &str = r#"## Response Format

When you have the information you need, reply with ONLY a JSON object:

```json
{
  "solution": "Clear, actionable fix for the customer",
  "next_steps": ["First step", "Second step"],
  "escalate": true,
  "priority_level": 3,
  "estimated_time": "6h"
}
```

- `priority_level` is an integer from 1 to 4; use the value from `check_severity`
- `escalate` is true exactly when `priority_level` is 3 or higher
- `estimated_time` is a whole number of hours followed by "h""#;

/// Support prompt plus the structured response format
pub fn support_system_prompt() -> String {
    format!("{SUPPORT_AGENT_PROMPT}\n\n{RESPONSE_FORMAT}")
}

pub struct LlmGateway {
    provider: Arc<dyn LlmProvider>,
    config: AgentConfig,
}

impl LlmGateway {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        let config = AgentConfig {
            system_prompt: support_system_prompt(),
            ..AgentConfig::default()
        };
        Self::with_config(provider, config)
    }

    pub const fn with_config(provider: Arc<dyn LlmProvider>, config: AgentConfig) -> Self {
        Self { provider, config }
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    #[must_use]
    pub const fn output_retries(mut self, retries: usize) -> Self {
        self.config.output_retries = retries;
        self
    }

    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

#[async_trait]
impl AgentGateway for LlmGateway {
    async fn solve(
        &self,
        prompt: &str,
        tools: Arc<ToolRegistry>,
    ) -> Result<SupportResponse, GatewayError> {
        let agent = AgentBuilder::new()
            .provider(Arc::clone(&self.provider))
            .tools(tools)
            .config(self.config.clone())
            .build()?;

        let mut conversation = Conversation::new();
        conversation.push(Message::user(prompt));

        agent
            .run_structured(&mut conversation, SupportResponse::validate)
            .await
            .map_err(GatewayError::from_agent)
    }
}
