//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern: the model either asks for a
//! tool, whose result is fed back, or produces its final answer. A
//! structured variant parses the final answer into a typed value and gives
//! the model a bounded number of chances to correct malformed output.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::structured::parse_structured;
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt
    pub system_prompt: String,

    /// Maximum model round trips per run before giving up
    pub max_iterations: usize,

    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to system prompt
    pub inject_tool_descriptions: bool,

    /// Extra attempts granted when a structured answer fails to parse or validate
    pub output_retries: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
            output_retries: 1,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r"You are a helpful AI assistant.

After receiving tool results, synthesize them into a helpful response.
If you can answer directly without tools, do so.
Be concise and accurate.";

pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    pub fn with_defaults(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Build the full system prompt including tool descriptions
    pub fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Run the loop until the model produces an answer without a tool call
    pub async fn run(&self, conversation: &mut Conversation) -> Result<String> {
        conversation.ensure_system_prompt(|| self.build_system_prompt());

        for iteration in 1..=self.config.max_iterations {
            conversation.truncate_to_fit();

            let completion = self
                .provider
                .complete(conversation.messages(), &self.config.generation)
                .await?;

            if completion.truncated() {
                tracing::warn!(iteration, "completion hit the token limit");
            }

            let content = completion.content;
            conversation.push(Message::assistant(&content));

            if let Some(call) = parse_tool_call(&content) {
                tracing::debug!(iteration, tool = %call.name, "executing tool");

                let result = self.execute_tool(&call).await;
                conversation.push(Message::tool(format_tool_result(&result), call.id.clone()));
                continue;
            }

            tracing::debug!(iteration, "final answer produced");
            return Ok(content);
        }

        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    /// Run the loop and parse the final answer into `T`.
    ///
    /// `check` validates the parsed value; a parse or validation failure is
    /// reported back to the model and the answer requested again, up to
    /// `output_retries` extra times.
    pub async fn run_structured<T, F>(&self, conversation: &mut Conversation, check: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> std::result::Result<(), String>,
    {
        let mut retries = 0;

        loop {
            let answer = self.run(conversation).await?;

            let outcome = parse_structured::<T>(&answer).and_then(|value| {
                check(&value)
                    .map(|()| value)
                    .map_err(|reason| AgentError::Parse(format!("answer failed validation: {reason}")))
            });

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if retries < self.config.output_retries => {
                    retries += 1;
                    tracing::warn!(error = %err, retry = retries, "structured answer rejected");
                    conversation.push(Message::user(format!(
                        "Your answer could not be used ({err}). \
                         Respond again with only the JSON object in the required format."
                    )));
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Run with a simple string input (creates temporary conversation)
    pub async fn ask(&self, question: &str) -> Result<String> {
        let mut conversation = Conversation::with_system_prompt(self.build_system_prompt());
        conversation.push(Message::user(question));
        self.run(&mut conversation).await
    }

    /// Execute a tool call; failures become failed results the model can see
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(call).await {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!(tool = %call.name, error = %e, "tool call failed");
                let mut result = ToolResult::failure(&call.name, format!("Error: {e}"));
                result.id.clone_from(&call.id);
                result
            }
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Parse a tool call from LLM response
fn parse_tool_call(content: &str) -> Option<ToolCall> {
    const TOOL_START: &str = "```tool";
    const TOOL_END: &str = "```";

    let mut call = if let Some(start_idx) = content.find(TOOL_START) {
        let after_marker = &content[start_idx + TOOL_START.len()..];
        let end_idx = after_marker.find(TOOL_END)?;
        serde_json::from_str::<ToolCall>(after_marker[..end_idx].trim()).ok()?
    } else {
        parse_inline_tool_call(content)?
    };

    if call.id.is_none() {
        call.id = Some(uuid::Uuid::new_v4().to_string());
    }
    Some(call)
}

/// Raw JSON object with a "tool" key, no fence
fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<ToolCall>(&content[start..=end]).ok()
}

fn format_tool_result(result: &ToolResult) -> String {
    if result.success {
        format!("[Tool '{}' returned]\n{}", result.name, result.output)
    } else {
        format!("[Tool '{}' failed]\n{}", result.name, result.output)
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: Arc::new(ToolRegistry::new()),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
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

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        if self.config.max_iterations == 0 {
            return Err(AgentError::Config("max_iterations must be at least 1".into()));
        }

        Ok(Agent::new(provider, self.tools, self.config))
    }
}
