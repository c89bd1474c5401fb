//! Scripted Provider
//!
//! For testing and offline demos. Replays a fixed list of replies in order
//! and records every message list it was sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use agent_core::{
    error::{AgentError, Result},
    message::Message,
    provider::{Completion, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo},
};
use async_trait::async_trait;

pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    transcript: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            transcript: Mutex::new(Vec::new()),
        }
    }

    /// Number of completions served so far
    pub fn calls(&self) -> usize {
        self.transcript.lock().map_or(0, |t| t.len())
    }

    /// The messages sent on the `n`th call (0-indexed)
    pub fn request(&self, n: usize) -> Option<Vec<Message>> {
        self.transcript.lock().ok()?.get(n).cloned()
    }

    /// Replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.lock().map_or(0, |r| r.len())
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        Ok(ProviderInfo {
            name: "Scripted".into(),
            models: self.list_models().await?,
            supports_tools: false,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(&self, messages: &[Message], options: &GenerationOptions) -> Result<Completion> {
        self.transcript
            .lock()
            .map_err(|_| AgentError::Other("scripted transcript poisoned".into()))?
            .push(messages.to_vec());

        let reply = self
            .replies
            .lock()
            .map_err(|_| AgentError::Other("scripted replies poisoned".into()))?
            .pop_front()
            .ok_or_else(|| AgentError::ProviderUnavailable("no more scripted replies".into()))?;

        Ok(Completion::text(reply, &options.model))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "scripted".into(),
            name: "scripted".into(),
            context_length: None,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_then_fails() {
        let provider = ScriptedProvider::new(["first", "second"]);
        let opts = GenerationOptions::default();
        let messages = [Message::user("hello")];

        assert_eq!(provider.complete(&messages, &opts).await.unwrap().content, "first");
        assert_eq!(provider.complete(&messages, &opts).await.unwrap().content, "second");
        let err = provider.complete(&messages, &opts).await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(provider.calls(), 3);
        assert_eq!(provider.remaining(), 0);
        assert_eq!(provider.request(0).unwrap()[0].content, "hello");
    }
}
