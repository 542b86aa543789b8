// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::checks::{finding_id, PageSnapshot, PassiveCheck};
use crate::types::{Finding, Severity};

/// The scanned page itself was served over plain HTTP.
pub struct CleartextTransportCheck;

impl PassiveCheck for CleartextTransportCheck {
    fn name(&self) -> &'static str {
        "cleartext_transport"
    }

    fn inspect(&self, page: &PageSnapshot) -> Option<Finding> {
        if page.is_https() {
            return None;
        }
        if !page.url.to_lowercase().starts_with("http://") {
            return None;
        }

        Some(Finding {
            id: finding_id(self.name()),
            title: "Cleartext HTTP Transport".to_string(),
            severity: Severity::High,
            category: "Transport".to_string(),
            description: "The page is served over unencrypted HTTP.".to_string(),
            evidence: Some(page.url.clone()),
            risk_impact: "Everything exchanged with the site, including any credentials or cookies, is readable and modifiable by anyone on the network path.".to_string(),
            explanation: "Cleartext transport offers no confidentiality or integrity; interception requires no vulnerability at all, only network position.".to_string(),
            fix_steps: vec![
                "Provision a TLS certificate and serve the site over HTTPS".to_string(),
                "Redirect all HTTP requests to HTTPS with a 301".to_string(),
                "Add Strict-Transport-Security once HTTPS is stable".to_string(),
            ],
            code_examples: Vec::new(),
        })
    }
}
