//! Severity scoring
//!
//! Maps a severity label to a base priority, raising it to at least 3 when
//! the issue text mentions a critical keyword.

use crate::model::{ESCALATION_THRESHOLD, Severity, SeverityAssessment};

/// Keywords that force at least high priority, matched case-insensitively
pub const CRITICAL_KEYWORDS: [&str; 4] = ["crash", "data loss", "security", "breach"];

pub fn check_severity(issue: &str, severity: &str) -> SeverityAssessment {
    let mut priority = Severity::parse(severity).base_priority();

    if mentions_critical_keyword(issue) {
        priority = priority.max(ESCALATION_THRESHOLD);
    }

    SeverityAssessment::from_priority(priority)
}

pub fn mentions_critical_keyword(issue: &str) -> bool {
    let issue = issue.to_lowercase();
    CRITICAL_KEYWORDS.iter().any(|kw| issue.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_priorities() {
        assert_eq!(check_severity("Slow queries", "low").priority_level, 1);
        assert_eq!(check_severity("Slow queries", "Medium").priority_level, 2);
        assert_eq!(check_severity("Slow queries", "HIGH").priority_level, 3);
        assert_eq!(check_severity("Slow queries", "critical").priority_level, 4);
    }

    #[test]
    fn test_unknown_label_is_low() {
        let assessment = check_severity("Dashboard typo", "urgent");
        assert_eq!(assessment.priority_level, 1);
        assert!(!assessment.needs_escalation);
        assert_eq!(assessment.estimated_time, "2h");
    }

    #[test]
    fn test_keyword_raises_to_three() {
        let assessment = check_severity("Possible DATA LOSS after upgrade", "low");
        assert_eq!(assessment.priority_level, 3);
        assert!(assessment.needs_escalation);
        assert_eq!(assessment.estimated_time, "6h");
    }

    #[test]
    fn test_keyword_never_lowers_critical() {
        let assessment = check_severity("Security breach", "critical");
        assert_eq!(assessment.priority_level, 4);
        assert_eq!(assessment.estimated_time, "8h");
    }

    #[test]
    fn test_database_crash_low() {
        assert_eq!(
            check_severity("Database crash", "low"),
            SeverityAssessment {
                priority_level: 3,
                needs_escalation: true,
                estimated_time: "6h".into(),
            }
        );
    }

    #[test]
    fn test_invariants_hold_for_any_input() {
        let issues = ["", "Slow queries", "CRASH loop", "security audit", "ünïcödé breach", "data  loss"];
        let labels = ["low", "medium", "high", "critical", "CRITICAL", "", "sev1"];

        for issue in issues {
            for label in labels {
                let a = check_severity(issue, label);
                assert!((1..=4).contains(&a.priority_level));
                assert_eq!(a.needs_escalation, a.priority_level >= 3);
                assert_eq!(a.estimated_time, format!("{}h", a.priority_level * 2));
            }
            let expected_low = if mentions_critical_keyword(issue) { 3 } else { 1 };
            assert_eq!(check_severity(issue, "low").priority_level, expected_low);
            assert_eq!(check_severity(issue, "critical").priority_level, 4);
        }
        assert!(!mentions_critical_keyword("data  loss"));
    }

    #[test]
    fn test_medium_without_keyword() {
        let assessment = check_severity("Slow dashboard", "medium");
        assert_eq!(assessment.priority_level, 2);
        assert!(!assessment.needs_escalation);
        assert_eq!(assessment.estimated_time, "4h");
    }
}
