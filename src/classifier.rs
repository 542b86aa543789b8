// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Safety Classifier
 * Tiered safe/caution/unsafe rating derived from finding titles
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::types::{Finding, SafetyRating, Severity};
use regex::RegexBuilder;
use tracing::debug;

/// Titles in these families describe an attack someone can actually run.
const EXPLOITABLE_PATTERNS: &[&str] = &[
    "sql injection",
    "cross-site scripting",
    "command injection",
    "code injection",
    "template injection",
    "xml external entity",
    "exposed secret",
    "api key",
    "private key",
    "credential",
    "cleartext",
    "unencrypted",
    "permissive cors",
    "directory listing",
    r"exposed \.(git|env|svn)",
    "open redirect",
    "subdomain takeover",
    "remote code execution",
    "path traversal",
    "authentication bypass",
    "mixed content",
    "invalid tls certificate",
    "expired tls certificate",
];

/// Defensive posture gaps: worth fixing, rarely attackable on their own.
const HARDENING_PATTERNS: &[&str] = &[
    r"missing .* header",
    "content-security-policy",
    "content security policy",
    "x-frame-options",
    "x-content-type-options",
    "strict-transport-security",
    "referrer-policy",
    "permissions-policy",
    "clickjacking",
    "cookie",
    "samesite",
    "httponly",
    "weak",
    "deprecated",
    "self-signed",
    "certificate expir",
    "https available but not enforced",
];

/// Observations that never affect the rating, whatever severity a check
/// assigned them.
const INFORMATIONAL_PATTERNS: &[&str] = &[
    "fingerprint",
    "technology disclosure",
    "developer comments",
    "html comment",
    "source map",
    "server version disclosure",
];

#[derive(Debug, PartialEq, Eq)]
enum Tier {
    Informational,
    Exploitable,
    Hardening,
    Unclassified,
}

/// Reduce a finding set to a three-tier display rating.
///
/// Raw severity counts overstate risk for sites that merely lack optional
/// hardening headers, so the rating is driven by what the findings *are*,
/// with severity as the tie-breaker for unrecognized titles.
pub fn classify(findings: &[Finding]) -> SafetyRating {
    let mut exploitable_critical = 0usize;
    let mut exploitable_high = 0usize;
    let mut exploitable_medium = 0usize;
    let mut hardening_serious = 0usize;

    for finding in findings {
        if finding.severity == Severity::Info {
            continue;
        }

        match tier_of(finding) {
            Tier::Informational | Tier::Unclassified => {}
            Tier::Exploitable => match finding.severity {
                Severity::Critical => exploitable_critical += 1,
                Severity::High => exploitable_high += 1,
                Severity::Medium => exploitable_medium += 1,
                _ => {}
            },
            Tier::Hardening => {
                if matches!(finding.severity, Severity::Critical | Severity::High) {
                    hardening_serious += 1;
                }
            }
        }
    }

    if exploitable_critical >= 1 {
        return SafetyRating::Unsafe;
    }
    if exploitable_high >= 2 {
        return SafetyRating::Unsafe;
    }
    if exploitable_high == 1 {
        return SafetyRating::Caution;
    }
    if exploitable_medium >= 3 {
        return SafetyRating::Caution;
    }
    if hardening_serious >= 5 {
        return SafetyRating::Caution;
    }
    SafetyRating::Safe
}

fn tier_of(finding: &Finding) -> Tier {
    let title = finding.title.as_str();

    if matches_any(title, INFORMATIONAL_PATTERNS) {
        return Tier::Informational;
    }
    if matches_any(title, EXPLOITABLE_PATTERNS) {
        return Tier::Exploitable;
    }
    if matches_any(title, HARDENING_PATTERNS) {
        return Tier::Hardening;
    }

    // Unrecognized titles fall back to severity
    match finding.severity {
        Severity::Critical => Tier::Exploitable,
        Severity::High => Tier::Hardening,
        _ => Tier::Unclassified,
    }
}

/// Try each pattern as a regular expression first; a pattern that does not
/// compile degrades to case-insensitive substring containment. Pattern lists
/// are operator-maintained, and classification must never panic over one
/// malformed entry.
fn matches_any(title: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| matches_pattern(title, pattern))
}

fn matches_pattern(title: &str, pattern: &str) -> bool {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => re.is_match(title),
        Err(e) => {
            debug!("Pattern '{}' is not a valid expression ({}), using containment", pattern, e);
            title.to_lowercase().contains(&pattern.to_lowercase())
        }
    }
}
