// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::types::{Finding, ScanSummary, Severity};

/// Order findings by severity and compute the per-bucket summary.
///
/// The sort is stable: findings of equal severity keep the order their
/// checks emitted them in, so re-running the reducer on its own output is a
/// no-op.
pub fn reduce(mut findings: Vec<Finding>) -> (Vec<Finding>, ScanSummary) {
    findings.sort_by_key(|f| f.severity.rank());
    let summary = summarize(&findings);
    (findings, summary)
}

/// Count findings per severity bucket. Each finding lands in exactly one
/// bucket, so the buckets always partition the input.
pub fn summarize(findings: &[Finding]) -> ScanSummary {
    let mut summary = ScanSummary::default();
    for finding in findings {
        match finding.severity {
            Severity::Critical => summary.critical += 1,
            Severity::High => summary.high += 1,
            Severity::Medium => summary.medium += 1,
            Severity::Low => summary.low += 1,
            Severity::Info => summary.info += 1,
        }
        summary.total += 1;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(id: &str, title: &str, severity: Severity) -> Finding {
        Finding {
            id: id.to_string(),
            title: title.to_string(),
            severity,
            category: "Test".to_string(),
            description: String::new(),
            evidence: None,
            risk_impact: String::new(),
            explanation: String::new(),
            fix_steps: Vec::new(),
            code_examples: Vec::new(),
        }
    }

    #[test]
    fn test_sorted_by_severity_rank() {
        let input = vec![
            finding("a", "Low thing", Severity::Low),
            finding("b", "Critical thing", Severity::Critical),
            finding("c", "Info thing", Severity::Info),
            finding("d", "High thing", Severity::High),
            finding("e", "Medium thing", Severity::Medium),
        ];

        let (ordered, summary) = reduce(input);

        let ranks: Vec<u8> = ordered.iter().map(|f| f.severity.rank()).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(summary.total, ordered.len());
    }

    #[test]
    fn test_summary_partitions_input() {
        let input = vec![
            finding("a", "x", Severity::High),
            finding("b", "y", Severity::High),
            finding("c", "z", Severity::Info),
        ];

        let (_, summary) = reduce(input);

        assert_eq!(summary.critical, 0);
        assert_eq!(summary.high, 2);
        assert_eq!(summary.medium, 0);
        assert_eq!(summary.low, 0);
        assert_eq!(summary.info, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(
            summary.critical + summary.high + summary.medium + summary.low + summary.info,
            summary.total
        );
    }

    #[test]
    fn test_stable_within_equal_severity() {
        let input = vec![
            finding("first", "first emitted", Severity::Medium),
            finding("second", "second emitted", Severity::Medium),
            finding("third", "third emitted", Severity::Medium),
        ];

        let (ordered, _) = reduce(input);

        let ids: Vec<&str> = ordered.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let input = vec![
            finding("a", "x", Severity::Low),
            finding("b", "y", Severity::Critical),
            finding("c", "z", Severity::Critical),
        ];

        let (once, summary_once) = reduce(input);
        let (twice, summary_twice) = reduce(once.clone());

        let once_ids: Vec<&str> = once.iter().map(|f| f.id.as_str()).collect();
        let twice_ids: Vec<&str> = twice.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(once_ids, twice_ids);
        assert_eq!(summary_once, summary_twice);
    }

    #[test]
    fn test_empty_input() {
        let (ordered, summary) = reduce(Vec::new());
        assert!(ordered.is_empty());
        assert_eq!(summary.total, 0);
    }
}
