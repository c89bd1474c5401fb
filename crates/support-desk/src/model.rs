//! Domain Models
//!
//! Knowledge base, incoming support queries and the structured response the
//! gateway must produce.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Static knowledge for one product: known issues with their remedy, and
/// topic keywords with ordered remediation steps.
///
/// Immutable once built; share it through `Arc` across tools and queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    product: String,
    known_issues: BTreeMap<String, String>,
    solutions: BTreeMap<String, Vec<String>>,
}

impl KnowledgeBase {
    pub fn new(
        product: impl Into<String>,
        known_issues: BTreeMap<String, String>,
        solutions: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            product: product.into(),
            known_issues,
            solutions,
        }
    }

    /// The canonical CloudDB knowledge base
    pub fn clouddb() -> Self {
        let known_issues = [
            ("Can't connect to database", "Check connection string and firewall rules"),
            ("Database crash", "Verify system resources and restart service"),
            ("Slow queries", "Analyze query performance and optimize indexes"),
        ]
        .into_iter()
        .map(|(issue, remedy)| (issue.to_string(), remedy.to_string()))
        .collect();

        let solutions = [
            ("connection", ["Check credentials", "Verify network access", "Test port availability"]),
            ("performance", ["Run diagnostics", "Check resource usage", "Optimize queries"]),
            ("crash", ["Collect logs", "Check error messages", "Restart service"]),
        ]
        .into_iter()
        .map(|(topic, steps)| (topic.to_string(), steps.iter().map(ToString::to_string).collect()))
        .collect();

        Self::new("CloudDB", known_issues, solutions)
    }

    /// Parse a knowledge base from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let kb: Self = serde_json::from_str(json)?;
        if kb.product.trim().is_empty() {
            return Err(TriageError::KnowledgeBase("product name is empty".into()));
        }
        Ok(kb)
    }

    /// Load a knowledge base from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
            .map_err(|e| TriageError::KnowledgeBase(format!("{}: {e}", path.display())))
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub const fn known_issues(&self) -> &BTreeMap<String, String> {
        &self.known_issues
    }

    pub const fn solutions(&self) -> &BTreeMap<String, Vec<String>> {
        &self.solutions
    }

    /// Ordered remediation steps for an exact topic keyword
    pub fn remediation_steps(&self, topic: &str) -> Option<&[String]> {
        self.solutions.get(topic).map(Vec::as_slice)
    }

    /// Topic keywords mentioned (case-insensitively) in `text`, sorted
    pub fn topics_in(&self, text: &str) -> Vec<&str> {
        let text = text.to_lowercase();
        self.solutions
            .keys()
            .filter(|topic| text.contains(&topic.to_lowercase()))
            .map(String::as_str)
            .collect()
    }
}

/// Severity label attached to a query
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Case-insensitive parse; anything unrecognized is `Low`
    pub fn parse(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "medium" => Self::Medium,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Low,
        }
    }

    pub const fn base_priority(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incoming support request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportQuery {
    pub issue: String,

    /// Raw severity label as reported; see [`SupportQuery::severity_level`]
    pub severity: String,

    pub product: String,

    pub user_id: String,

    /// When the request was raised; always supplied by the caller
    pub timestamp: DateTime<Utc>,
}

impl SupportQuery {
    pub fn new(
        issue: impl Into<String>,
        severity: impl Into<String>,
        product: impl Into<String>,
        user_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            issue: issue.into(),
            severity: severity.into(),
            product: product.into(),
            user_id: user_id.into(),
            timestamp,
        }
    }

    pub fn severity_level(&self) -> Severity {
        Severity::parse(&self.severity)
    }
}

/// Result of the severity heuristic
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityAssessment {
    pub priority_level: u8,
    pub needs_escalation: bool,
    pub estimated_time: String,
}

impl SeverityAssessment {
    /// Derive escalation and time estimate from a priority level
    pub fn from_priority(priority_level: u8) -> Self {
        Self {
            priority_level,
            needs_escalation: priority_level >= ESCALATION_THRESHOLD,
            estimated_time: estimated_time(priority_level),
        }
    }
}

/// Priority at or above which a request is escalated
pub const ESCALATION_THRESHOLD: u8 = 3;

/// Two hours per priority level, rendered as `"{N}h"`
pub fn estimated_time(priority_level: u8) -> String {
    format!("{}h", u32::from(priority_level) * 2)
}

/// The structured answer produced for one query
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportResponse {
    pub solution: String,
    pub next_steps: Vec<String>,
    pub escalate: bool,
    pub priority_level: u8,
    pub estimated_time: String,
}

impl SupportResponse {
    /// Check the response invariants; the error names the first violation
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.solution.trim().is_empty() {
            return Err("solution is empty".into());
        }
        if !(1..=4).contains(&self.priority_level) {
            return Err(format!("priority_level {} is outside 1-4", self.priority_level));
        }
        let should_escalate = self.priority_level >= ESCALATION_THRESHOLD;
        if self.escalate != should_escalate {
            return Err(format!(
                "escalate must be {should_escalate} for priority_level {}",
                self.priority_level
            ));
        }
        let well_formed = self
            .estimated_time
            .strip_suffix('h')
            .is_some_and(|hours| !hours.is_empty() && hours.bytes().all(|b| b.is_ascii_digit()));
        if !well_formed {
            return Err(format!(
                "estimated_time '{}' must look like \"6h\"",
                self.estimated_time
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn response(priority_level: u8, escalate: bool, estimated_time: &str) -> SupportResponse {
        SupportResponse {
            solution: "Check connection string and firewall rules".into(),
            next_steps: vec!["Check credentials".into()],
            escalate,
            priority_level,
            estimated_time: estimated_time.into(),
        }
    }

    #[test]
    fn test_clouddb_contents() {
        let kb = KnowledgeBase::clouddb();
        assert_eq!(kb.product(), "CloudDB");
        assert_eq!(kb.known_issues().len(), 3);
        assert_eq!(
            kb.remediation_steps("crash").unwrap(),
            ["Collect logs", "Check error messages", "Restart service"]
        );
        assert!(kb.remediation_steps("Crash").is_none());
    }

    #[test]
    fn test_topics_in() {
        let kb = KnowledgeBase::clouddb();
        assert_eq!(kb.topics_in("Server CRASH after connection reset"), ["connection", "crash"]);
        assert!(kb.topics_in("Can't connect").is_empty());
    }

    #[test]
    fn test_knowledge_base_json() {
        let kb = KnowledgeBase::from_json(
            r#"{"product": "Queue", "known_issues": {"Messages stuck": "Restart consumer"}, "solutions": {}}"#,
        )
        .unwrap();
        assert_eq!(kb.product(), "Queue");

        let empty = KnowledgeBase::from_json(r#"{"product": " ", "known_issues": {}, "solutions": {}}"#);
        assert!(matches!(empty, Err(TriageError::KnowledgeBase(_))));
        assert!(matches!(KnowledgeBase::from_json("{"), Err(TriageError::Json(_))));
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("HIGH"), Severity::High);
        assert_eq!(Severity::parse("Critical"), Severity::Critical);
        assert_eq!(Severity::parse("urgent"), Severity::Low);
        assert_eq!(Severity::parse(""), Severity::Low);
        assert_eq!(Severity::Medium.base_priority(), 2);
    }

    #[test]
    fn test_query_keeps_injected_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let query = SupportQuery::new("Slow queries", "Medium", "CloudDB", "user123", at);
        assert_eq!(query.timestamp, at);
        assert_eq!(query.severity, "Medium");
        assert_eq!(query.severity_level(), Severity::Medium);
    }

    #[test]
    fn test_assessment_from_priority() {
        let a = SeverityAssessment::from_priority(3);
        assert!(a.needs_escalation);
        assert_eq!(a.estimated_time, "6h");
        assert!(!SeverityAssessment::from_priority(2).needs_escalation);
    }

    #[test]
    fn test_validate_accepts_consistent_response() {
        assert!(response(3, true, "6h").validate().is_ok());
        assert!(response(1, false, "2h").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_violations() {
        assert!(response(0, false, "0h").validate().is_err());
        assert!(response(5, true, "10h").validate().is_err());
        assert!(response(3, false, "6h").validate().unwrap_err().contains("escalate"));
        assert!(response(2, false, "4 hours").validate().is_err());
        assert!(response(2, false, "h").validate().is_err());

        let mut blank = response(2, false, "4h");
        blank.solution = "  ".into();
        assert!(blank.validate().is_err());
    }
}
