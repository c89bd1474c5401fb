//! Service Kit - Agent Tools
//!
//! Domain-specific tools that implement `agent_core::Tool` for the support desk.

mod knowledge_search;
mod severity_check;

use std::sync::Arc;

use agent_core::ToolRegistry;

use crate::model::KnowledgeBase;

pub use knowledge_search::KnowledgeSearchTool;
pub use severity_check::SeverityCheckTool;

/// The two tools handed to the gateway for a single query
pub fn support_tools(kb: Arc<KnowledgeBase>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(KnowledgeSearchTool::new(kb));
    registry.register(SeverityCheckTool);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_tools_registers_both() {
        let registry = support_tools(Arc::new(KnowledgeBase::clouddb()));
        assert_eq!(registry.names(), ["check_severity", "search_knowledge_base"]);
    }
}
