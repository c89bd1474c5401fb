//! OpenAI-compatible LLM Provider
//!
//! Speaks the `/chat/completions` dialect shared by OpenAI, Groq, Together,
//! vLLM and friends. Defaults target Groq.

use std::fmt;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo, TokenUsage},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct OpenAiCompatConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for OpenAiCompatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OpenAiCompatConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 120,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read `OPENAI_COMPAT_API_KEY` (or `GROQ_API_KEY`), `OPENAI_COMPAT_BASE_URL`
    /// and `OPENAI_COMPAT_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("OPENAI_COMPAT_API_KEY")
            .or_else(|| lookup("GROQ_API_KEY"))
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AgentError::Config("set OPENAI_COMPAT_API_KEY or GROQ_API_KEY".into())
            })?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup("OPENAI_COMPAT_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(timeout) = lookup("OPENAI_COMPAT_TIMEOUT_SECS").and_then(|t| t.parse().ok()) {
            config.timeout_secs = timeout;
        }
        Ok(config)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: Option<String>,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
    #[serde(default)]
    context_window: Option<u32>,
}

const fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::Assistant => "assistant",
        // Tool results travel as plain user turns; tool calls are text-based
        Role::User | Role::Tool => "user",
    }
}

fn build_request<'a>(messages: &'a [Message], options: &'a GenerationOptions) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model: &options.model,
        messages: messages
            .iter()
            .map(|m| WireMessage {
                role: wire_role(m.role),
                content: &m.content,
            })
            .collect(),
        temperature: options.temperature,
        top_p: options.top_p,
        max_tokens: options.max_tokens,
        stop: &options.stop_sequences,
    }
}

fn convert_response(response: ChatCompletionResponse, requested_model: &str) -> Result<Completion> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AgentError::Provider("response contained no choices".into()))?;

    Ok(Completion {
        content: choice.message.content.unwrap_or_default(),
        model: response.model.unwrap_or_else(|| requested_model.to_string()),
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
        finish_reason: choice.finish_reason.as_deref().map(FinishReason::from_openai),
    })
}

fn status_error(status: StatusCode, body: &str) -> AgentError {
    let detail = format!("{status}: {}", body.chars().take(300).collect::<String>());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
        s if s.is_server_error() => AgentError::ProviderUnavailable(detail),
        _ => AgentError::Provider(detail),
    }
}

fn transport_error(err: &reqwest::Error) -> AgentError {
    if err.is_connect() || err.is_timeout() {
        AgentError::ProviderUnavailable(err.to_string())
    } else {
        AgentError::Provider(err.to_string())
    }
}

/// Provider for any OpenAI-compatible chat completions endpoint
pub struct OpenAiCompatProvider {
    client: Client,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatProvider {
    pub fn new(config: OpenAiCompatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiCompatConfig::from_env()?)
    }

    pub const fn config(&self) -> &OpenAiCompatConfig {
        &self.config
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        let models = self.list_models().await.unwrap_or_default();
        Ok(ProviderInfo {
            name: "OpenAI-compatible".into(),
            models,
            supports_tools: false,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(base_url = %self.config.base_url, "health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> Result<Completion> {
        let request = build_request(messages, options);
        tracing::debug!(model = %options.model, messages = messages.len(), "chat completion request");

        let response = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("malformed completion: {e}")))?;

        let completion = convert_response(body, &options.model)?;
        if let Some(usage) = completion.usage {
            tracing::debug!(total_tokens = usage.total_tokens, "completion usage");
        }
        Ok(completion)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(self.config.endpoint("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("malformed model list: {e}")))?;

        Ok(list
            .data
            .into_iter()
            .map(|m| ModelInfo {
                name: m.id.clone(),
                id: m.id,
                context_length: m.context_window,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_key() {
        let err = OpenAiCompatConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn test_config_falls_back_to_groq_key() {
        let config = OpenAiCompatConfig::from_lookup(|key| match key {
            "GROQ_API_KEY" => Some("gsk-test".into()),
            "OPENAI_COMPAT_TIMEOUT_SECS" => Some("30".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.api_key, "gsk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(!format!("{config:?}").contains("gsk-test"));
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let config = OpenAiCompatConfig::new("k").with_base_url("http://localhost:8000/v1/");
        assert_eq!(config.endpoint("chat/completions"), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_build_request_maps_roles() {
        let messages = vec![
            Message::system("sys"),
            Message::user("hi"),
            Message::assistant("calling tool"),
            Message::tool("result", Some("id".into())),
        ];
        let options = GenerationOptions::for_model("llama-3.3-70b-versatile");
        let json = serde_json::to_value(build_request(&messages, &options)).unwrap();

        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        let roles: Vec<&str> = json["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert!(json.get("stop").is_none());
    }

    #[test]
    fn test_convert_response() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{
                "model": "llama-3.3-70b-versatile",
                "choices": [{"message": {"role": "assistant", "content": "hello"}, "finish_reason": "length"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            }"#,
        )
        .unwrap();

        let completion = convert_response(body, "fallback").unwrap();
        assert_eq!(completion.content, "hello");
        assert!(completion.truncated());
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_empty_choices_is_error() {
        let body: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(convert_response(body, "m").is_err());
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status_error(StatusCode::UNAUTHORIZED, ""), AgentError::Auth(_)));
        assert!(matches!(status_error(StatusCode::TOO_MANY_REQUESTS, ""), AgentError::RateLimited(_)));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, ""),
            AgentError::ProviderUnavailable(_)
        ));
        assert!(matches!(status_error(StatusCode::BAD_REQUEST, ""), AgentError::Provider(_)));
    }
}
