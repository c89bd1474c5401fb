//! Agent Gateways
//!
//! A gateway turns the composed customer prompt plus the per-query tool
//! registry into a [`SupportResponse`]. The handler only sees the trait, so
//! an LLM-backed agent, a rule-based offline solver and plain closures are
//! interchangeable.

mod llm;
mod offline;

use std::sync::Arc;

use agent_core::ToolRegistry;
use async_trait::async_trait;

use crate::error::GatewayError;
use crate::model::SupportResponse;

pub use llm::{LlmGateway, support_system_prompt};
pub use offline::OfflineGateway;

#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Produce a response for `prompt`, calling `tools` as needed
    async fn solve(
        &self,
        prompt: &str,
        tools: Arc<ToolRegistry>,
    ) -> Result<SupportResponse, GatewayError>;
}

/// Gateway backed by a synchronous closure
pub struct FnGateway<F> {
    f: F,
}

impl<F> FnGateway<F>
where
    F: Fn(&str, &ToolRegistry) -> Result<SupportResponse, GatewayError> + Send + Sync,
{
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> AgentGateway for FnGateway<F>
where
    F: Fn(&str, &ToolRegistry) -> Result<SupportResponse, GatewayError> + Send + Sync,
{
    async fn solve(
        &self,
        prompt: &str,
        tools: Arc<ToolRegistry>,
    ) -> Result<SupportResponse, GatewayError> {
        (self.f)(prompt, &tools)
    }
}

#[async_trait]
impl<G: AgentGateway + ?Sized> AgentGateway for Arc<G> {
    async fn solve(
        &self,
        prompt: &str,
        tools: Arc<ToolRegistry>,
    ) -> Result<SupportResponse, GatewayError> {
        (**self).solve(prompt, tools).await
    }
}
