//! Support Query Handler
//!
//! Composes the customer prompt, hands it to a gateway together with the
//! per-query tools, and re-checks whatever comes back.

use std::sync::Arc;

use tracing::Instrument;

use crate::error::{GatewayError, Result};
use crate::gateway::AgentGateway;
use crate::model::{KnowledgeBase, SupportQuery, SupportResponse};
use crate::svckit::support_tools;

// ============================================================================
// Prompt
// ============================================================================

/// The prompt sent to the gateway for `query`
pub fn compose_prompt(query: &SupportQuery) -> String {
    format!(
        "Customer Issue:\nProduct: {}\nSeverity: {}\nIssue: {}{ANALYZE_REQUEST}",
        query.product, query.severity, query.issue
    )
}

/// Closing request appended after the issue text
const ANALYZE_REQUEST: &str = "\n\nPlease analyze this issue and provide a solution.";

/// Customer fields read back out of a composed prompt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptFields {
    pub product: String,
    pub severity: String,
    pub issue: String,
}

impl PromptFields {
    pub fn parse(prompt: &str) -> Option<Self> {
        let field = |label: &str| {
            prompt
                .lines()
                .find_map(|line| line.trim_start().strip_prefix(label))
                .map(|value| value.trim_end().to_string())
        };

        // The issue may span lines; it runs up to the closing request
        let (_, rest) = prompt.split_once("\nIssue: ")?;
        let issue = rest.strip_suffix(ANALYZE_REQUEST).unwrap_or(rest);

        Some(Self {
            product: field("Product: ")?,
            severity: field("Severity: ")?,
            issue: issue.to_string(),
        })
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Answer one support query through `gateway`
pub async fn handle_support_query(
    query: &SupportQuery,
    kb: Arc<KnowledgeBase>,
    gateway: &dyn AgentGateway,
) -> Result<SupportResponse> {
    let span = tracing::info_span!(
        "support_query",
        user_id = %query.user_id,
        product = %query.product,
        severity = %query.severity,
    );

    async move {
        tracing::info!(issue = %query.issue, raised_at = %query.timestamp, "handling support query");

        let prompt = compose_prompt(query);
        let tools = Arc::new(support_tools(kb));

        let response = gateway.solve(&prompt, tools).await?;
        response.validate().map_err(GatewayError::InvalidResponse)?;

        tracing::info!(
            priority = response.priority_level,
            escalate = response.escalate,
            estimated_time = %response.estimated_time,
            "support query resolved"
        );
        Ok(response)
    }
    .instrument(span)
    .await
}
