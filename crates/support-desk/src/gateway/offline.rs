//! Rule-based gateway
//!
//! Answers without a model: reads the customer fields back out of the
//! prompt, calls both tools through the registry and assembles the response
//! from the knowledge base.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use agent_core::{ToolCall, ToolRegistry, ToolResult};
use async_trait::async_trait;

use super::AgentGateway;
use crate::error::GatewayError;
use crate::handler::PromptFields;
use crate::matcher::PRODUCT_NOT_FOUND;
use crate::model::{KnowledgeBase, SeverityAssessment, SupportResponse};

/// Words that point at a topic without naming it
const TOPIC_ALIASES: &[(&str, &str)] = &[
    ("connect", "connection"),
    ("slow", "performance"),
    ("latency", "performance"),
    ("crash", "crash"),
];

const FALLBACK_STEPS: [&str; 2] = ["Gather reproduction details", "Open a ticket with tier-2 support"];

pub struct OfflineGateway {
    kb: Arc<KnowledgeBase>,
}

impl OfflineGateway {
    pub const fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    /// Topics named in the issue, directly or through an alias
    fn detect_topics<'a>(&'a self, issue: &str) -> BTreeSet<&'a str> {
        let lowered = issue.to_lowercase();
        let mut topics: BTreeSet<&str> = self.kb.topics_in(issue).into_iter().collect();

        for (word, topic) in TOPIC_ALIASES {
            if lowered.contains(word) {
                if let Some((known, _)) = self.kb.solutions().get_key_value(*topic) {
                    topics.insert(known.as_str());
                }
            }
        }
        topics
    }

    /// Search with the full issue first, then with each alias word it contains
    async fn search(
        &self,
        tools: &ToolRegistry,
        issue: &str,
        product: &str,
    ) -> Result<Option<BTreeMap<String, String>>, GatewayError> {
        match checked(search_call(tools, issue, product).await?) {
            None => return Ok(None),
            Some(matches) if !matches.is_empty() => return Ok(Some(matches)),
            Some(_) => {}
        }

        let lowered = issue.to_lowercase();
        let mut combined = BTreeMap::new();
        for (word, _) in TOPIC_ALIASES {
            if lowered.contains(word) {
                combined.extend(search_call(tools, word, product).await?);
            }
        }
        Ok(checked(combined))
    }
}

#[async_trait]
impl AgentGateway for OfflineGateway {
    async fn solve(
        &self,
        prompt: &str,
        tools: Arc<ToolRegistry>,
    ) -> Result<SupportResponse, GatewayError> {
        let fields = PromptFields::parse(prompt)
            .ok_or_else(|| GatewayError::InvalidResponse("prompt lacks customer fields".into()))?;

        let severity_call = ToolCall::new("check_severity")
            .with_arg("issue", fields.issue.as_str())
            .with_arg("severity", fields.severity.as_str());
        let assessment: SeverityAssessment = decode(tools.execute(&severity_call).await?)?;

        let solution = match self.search(&tools, &fields.issue, &fields.product).await? {
            None => format!("{PRODUCT_NOT_FOUND}: '{}'", fields.product),
            Some(matches) if matches.is_empty() => {
                "No known issue matched; collect diagnostics for the support team".to_string()
            }
            Some(matches) => matches.into_values().collect::<Vec<_>>().join("; "),
        };

        let mut next_steps: Vec<String> = self
            .detect_topics(&fields.issue)
            .into_iter()
            .filter_map(|topic| self.kb.remediation_steps(topic))
            .flatten()
            .cloned()
            .collect();
        if next_steps.is_empty() {
            next_steps = FALLBACK_STEPS.iter().map(ToString::to_string).collect();
        }

        tracing::debug!(
            priority = assessment.priority_level,
            steps = next_steps.len(),
            "offline triage complete"
        );

        Ok(SupportResponse {
            solution,
            next_steps,
            escalate: assessment.needs_escalation,
            priority_level: assessment.priority_level,
            estimated_time: assessment.estimated_time,
        })
    }
}

async fn search_call(
    tools: &ToolRegistry,
    issue: &str,
    product: &str,
) -> Result<BTreeMap<String, String>, GatewayError> {
    let call = ToolCall::new("search_knowledge_base")
        .with_arg("issue", issue)
        .with_arg("product", product);
    decode(tools.execute(&call).await?)
}

/// `None` when the tool reported the product as unknown
fn checked(matches: BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    if matches.get("error").is_some_and(|e| e == PRODUCT_NOT_FOUND) {
        None
    } else {
        Some(matches)
    }
}

fn decode<T: serde::de::DeserializeOwned>(result: ToolResult) -> Result<T, GatewayError> {
    let data = result.data.ok_or_else(|| {
        GatewayError::InvalidResponse(format!("tool '{}' returned no data", result.name))
    })?;
    serde_json::from_value(data).map_err(|e| {
        GatewayError::InvalidResponse(format!("tool '{}' returned unexpected data: {e}", result.name))
    })
}
