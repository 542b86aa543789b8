// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::checks::{finding_id, PageSnapshot, PassiveCheck};
use crate::types::{Finding, Severity};

/// Flags session-looking cookies set without Secure, HttpOnly, or SameSite.
pub struct CookieAttributesCheck;

impl PassiveCheck for CookieAttributesCheck {
    fn name(&self) -> &'static str {
        "cookie_attributes"
    }

    fn inspect(&self, page: &PageSnapshot) -> Option<Finding> {
        let mut weak: Vec<String> = Vec::new();

        for (key, value) in &page.headers {
            if !key.eq_ignore_ascii_case("set-cookie") {
                continue;
            }

            let cookie_name = value.split('=').next().unwrap_or("").trim();
            if cookie_name.is_empty() {
                continue;
            }

            let lower = value.to_lowercase();
            let mut missing: Vec<&str> = Vec::new();

            if page.is_https() && !lower.contains("secure") {
                missing.push("Secure");
            }
            if !lower.contains("httponly") && looks_like_session_cookie(cookie_name) {
                missing.push("HttpOnly");
            }
            if !lower.contains("samesite") {
                missing.push("SameSite");
            }

            if !missing.is_empty() {
                weak.push(format!("{} (missing {})", cookie_name, missing.join(", ")));
            }
        }

        if weak.is_empty() {
            return None;
        }

        Some(Finding {
            id: finding_id(self.name()),
            title: "Cookie Set Without Security Attributes".to_string(),
            severity: Severity::Medium,
            category: "Session".to_string(),
            description: format!(
                "{} cookie(s) are set without standard protective attributes.",
                weak.len()
            ),
            evidence: Some(weak.join("; ")),
            risk_impact: "Cookies without Secure can leak over cleartext requests; without HttpOnly they are readable by injected script; without SameSite they ride along on cross-site requests.".to_string(),
            explanation: "Cookie attributes are the browser-side containment for session material; each missing attribute removes one containment layer.".to_string(),
            fix_steps: vec![
                "Add Secure to every cookie on HTTPS sites".to_string(),
                "Add HttpOnly to cookies not needed by client-side script".to_string(),
                "Set SameSite=Lax or Strict explicitly".to_string(),
            ],
            code_examples: vec![
                "Set-Cookie: session=abc123; Secure; HttpOnly; SameSite=Lax".to_string(),
            ],
        })
    }
}

fn looks_like_session_cookie(name: &str) -> bool {
    let lower = name.to_lowercase();
    ["sess", "auth", "token", "sid", "login", "identity"]
        .iter()
        .any(|hint| lower.contains(hint))
}
