//! Knowledge Search Tool
//!
//! Looks up known issues for a product in the shared knowledge base.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::matcher::search_known_issues;
use crate::model::KnowledgeBase;

pub const TOOL_NAME: &str = "search_knowledge_base";

pub struct KnowledgeSearchTool {
    kb: Arc<KnowledgeBase>,
}

impl KnowledgeSearchTool {
    pub const fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }
}

#[async_trait]
impl Tool for KnowledgeSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Search the knowledge base for known issues and solutions".into(),
            parameters: vec![
                ParameterSchema::required_string(
                    "issue",
                    "Issue text to look for, e.g. 'connect to database'",
                ),
                ParameterSchema::required_string("product", "Exact product name, e.g. 'CloudDB'"),
            ],
            category: Some("knowledge".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let issue = call.required_str("issue")?;
        let product = call.required_str("product")?;

        let matches = search_known_issues(&self.kb, issue, product);
        tracing::debug!(issue, product, matched = matches.len(), "knowledge base search");

        Ok(ToolResult::json(TOOL_NAME, matches.to_json()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::AgentError;

    fn tool() -> KnowledgeSearchTool {
        KnowledgeSearchTool::new(Arc::new(KnowledgeBase::clouddb()))
    }

    #[tokio::test]
    async fn test_returns_matches_as_json() {
        let call = ToolCall::new(TOOL_NAME)
            .with_arg("issue", "connect")
            .with_arg("product", "CloudDB");
        let result = tool().execute(&call).await.unwrap();

        assert!(result.success);
        assert_eq!(
            result.data.unwrap(),
            serde_json::json!({"Can't connect to database": "Check connection string and firewall rules"})
        );
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_a_failure() {
        let call = ToolCall::new(TOOL_NAME)
            .with_arg("issue", "crash")
            .with_arg("product", "OtherDB");
        let result = tool().execute(&call).await.unwrap();

        assert!(result.success);
        assert!(result.output.contains("Product not found in knowledge base"));
    }

    #[tokio::test]
    async fn test_non_string_argument_rejected() {
        let call = ToolCall::new(TOOL_NAME)
            .with_arg("issue", 42)
            .with_arg("product", "CloudDB");
        let err = tool().execute(&call).await.unwrap_err();

        assert!(matches!(err, AgentError::ToolValidation(_)));
    }
}
