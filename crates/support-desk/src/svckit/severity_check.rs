//! Severity Check Tool

use async_trait::async_trait;

use agent_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::scorer::check_severity;

pub const TOOL_NAME: &str = "check_severity";

/// Stateless wrapper over [`check_severity`]
pub struct SeverityCheckTool;

#[async_trait]
impl Tool for SeverityCheckTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Analyze issue severity and recommend priority level".into(),
            parameters: vec![
                ParameterSchema::required_string("issue", "The customer's issue description"),
                ParameterSchema::required_string("severity", "Severity reported by the customer")
                    .with_enum(&["low", "medium", "high", "critical"]),
            ],
            category: Some("triage".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let issue = call.required_str("issue")?;
        let severity = call.required_str("severity")?;

        let assessment = check_severity(issue, severity);
        let data = serde_json::to_value(&assessment)?;

        Ok(ToolResult::json(TOOL_NAME, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_assessment() {
        let call = ToolCall::new(TOOL_NAME)
            .with_arg("issue", "Nightly job crash")
            .with_arg("severity", "medium");
        let result = SeverityCheckTool.execute(&call).await.unwrap();

        assert!(result.success);
        assert_eq!(
            result.data.unwrap(),
            serde_json::json!({
                "priority_level": 3,
                "needs_escalation": true,
                "estimated_time": "6h",
            })
        );
    }

    #[test]
    fn test_schema_requires_both_arguments() {
        let call = ToolCall::new(TOOL_NAME).with_arg("issue", "slow");
        assert!(SeverityCheckTool.validate(&call).is_err());
    }
}
