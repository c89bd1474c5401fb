//! Known-issue matching
//!
//! An issue text matches a known issue when it appears, case-insensitively,
//! inside the known issue's description. A product other than the knowledge
//! base's own is reported as a distinguished not-found result.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::model::KnowledgeBase;

/// Message carried by a product mismatch
pub const PRODUCT_NOT_FOUND: &str = "Product not found in knowledge base";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueMatches {
    /// Known issue description to remedy; may be empty
    Found(BTreeMap<String, String>),
    ProductNotFound,
}

impl IssueMatches {
    pub const fn is_product_not_found(&self) -> bool {
        matches!(self, Self::ProductNotFound)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Found(matches) => matches.len(),
            Self::ProductNotFound => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat mapping as handed to the model; a mismatch becomes `{"error": ...}`
    pub fn to_map(&self) -> BTreeMap<String, String> {
        match self {
            Self::Found(matches) => matches.clone(),
            Self::ProductNotFound => {
                BTreeMap::from([("error".to_string(), PRODUCT_NOT_FOUND.to_string())])
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self.to_map())
    }
}

impl Serialize for IssueMatches {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

/// Find known issues whose description contains `issue`
///
/// The product name must equal the knowledge base's exactly. An empty issue
/// text matches every known issue.
pub fn search_known_issues(kb: &KnowledgeBase, issue: &str, product: &str) -> IssueMatches {
    if product != kb.product() {
        return IssueMatches::ProductNotFound;
    }

    let needle = issue.to_lowercase();
    let matches = kb
        .known_issues()
        .iter()
        .filter(|(known, _)| known.to_lowercase().contains(&needle))
        .map(|(known, remedy)| (known.clone(), remedy.clone()))
        .collect();

    IssueMatches::Found(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_match_is_case_insensitive() {
        let kb = KnowledgeBase::clouddb();
        let matches = search_known_issues(&kb, "DATABASE", "CloudDB");

        let IssueMatches::Found(found) = matches else {
            panic!("expected matches");
        };
        assert_eq!(found.len(), 2);
        assert_eq!(
            found["Database crash"],
            "Verify system resources and restart service"
        );
        assert!(found.contains_key("Can't connect to database"));
    }

    #[test]
    fn test_connect_example() {
        let kb = KnowledgeBase::clouddb();
        assert_eq!(
            search_known_issues(&kb, "connect", "CloudDB").to_json(),
            serde_json::json!({"Can't connect to database": "Check connection string and firewall rules"})
        );
    }

    #[test]
    fn test_issue_must_be_contained_in_known_issue() {
        let kb = KnowledgeBase::clouddb();
        let matches = search_known_issues(&kb, "Can't connect to database after restart", "CloudDB");
        assert_eq!(matches, IssueMatches::Found(BTreeMap::new()));
        assert!(matches.is_empty());
    }

    #[test]
    fn test_empty_issue_matches_everything() {
        let kb = KnowledgeBase::clouddb();
        assert_eq!(search_known_issues(&kb, "", "CloudDB").len(), 3);
    }

    #[test]
    fn test_product_must_match_exactly() {
        let kb = KnowledgeBase::clouddb();
        let matches = search_known_issues(&kb, "crash", "clouddb");

        assert!(matches.is_product_not_found());
        assert_eq!(
            matches.to_json(),
            serde_json::json!({"error": "Product not found in knowledge base"})
        );
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let kb = KnowledgeBase::clouddb();
        let json = serde_json::to_value(search_known_issues(&kb, "slow", "CloudDB")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Slow queries": "Analyze query performance and optimize indexes"})
        );
    }
}
