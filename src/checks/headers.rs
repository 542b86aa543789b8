// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Header Posture Checks
 * Passive detectors for missing or misconfigured HTTP response headers
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::checks::{finding_id, PageSnapshot, PassiveCheck};
use crate::types::{Finding, Severity};

fn finding(
    check: &str,
    title: &str,
    severity: Severity,
    category: &str,
    description: String,
    evidence: Option<String>,
    risk_impact: &str,
    explanation: &str,
    fix_steps: Vec<&str>,
    code_examples: Vec<&str>,
) -> Finding {
    Finding {
        id: finding_id(check),
        title: title.to_string(),
        severity,
        category: category.to_string(),
        description,
        evidence,
        risk_impact: risk_impact.to_string(),
        explanation: explanation.to_string(),
        fix_steps: fix_steps.into_iter().map(String::from).collect(),
        code_examples: code_examples.into_iter().map(String::from).collect(),
    }
}

/// Browser policy headers are only meaningful on pages a browser renders.
/// Reporting them on JSON/XML/asset responses is a false positive.
fn is_browser_rendered(page: &PageSnapshot) -> bool {
    if !page.is_html() {
        return false;
    }

    let body_trimmed = page.body.trim();
    if (body_trimmed.starts_with('{') && body_trimmed.ends_with('}'))
        || (body_trimmed.starts_with('[') && body_trimmed.ends_with(']'))
        || (body_trimmed.starts_with("<?xml") && body_trimmed.contains("?>"))
    {
        return false;
    }

    page.status_code < 400
}

pub struct ContentSecurityPolicyCheck;

impl PassiveCheck for ContentSecurityPolicyCheck {
    fn name(&self) -> &'static str {
        "csp"
    }

    fn inspect(&self, page: &PageSnapshot) -> Option<Finding> {
        if !is_browser_rendered(page) {
            return None;
        }

        if let Some(csp) = page.header("content-security-policy") {
            // Present but defeated by unsafe directives
            let lower = csp.to_lowercase();
            if lower.contains("unsafe-inline") && lower.contains("script-src") {
                return Some(finding(
                    self.name(),
                    "Content-Security-Policy Allows Inline Scripts",
                    Severity::Low,
                    "Security Headers",
                    "The Content-Security-Policy permits 'unsafe-inline' in script-src, which disables most of the XSS protection CSP exists to provide.".to_string(),
                    Some(format!("Content-Security-Policy: {}", truncate(csp, 200))),
                    "Injected script tags execute despite the policy being present.",
                    "CSP whitelisting is only effective when inline script execution is blocked; 'unsafe-inline' reopens the primary XSS vector.",
                    vec![
                        "Remove 'unsafe-inline' from script-src",
                        "Move inline scripts to external files or use nonces/hashes",
                        "Validate the policy with a CSP evaluator before deploying",
                    ],
                    vec!["Content-Security-Policy: script-src 'self' 'nonce-{random}'"],
                ));
            }
            return None;
        }

        Some(finding(
            self.name(),
            "Missing Content-Security-Policy Header",
            Severity::Medium,
            "Security Headers",
            "No Content-Security-Policy header was returned. The page has no declarative defence against injected scripts, frames, or remote content.".to_string(),
            Some("Content-Security-Policy: MISSING".to_string()),
            "Successful HTML injection escalates directly to script execution; there is no second layer to contain it.",
            "CSP restricts which sources the browser may load scripts, styles, and frames from, containing the blast radius of any markup injection.",
            vec![
                "Define a policy starting from default-src 'self'",
                "Add explicit source lists for scripts, styles, and images",
                "Deploy in Content-Security-Policy-Report-Only mode first, then enforce",
            ],
            vec!["Content-Security-Policy: default-src 'self'; script-src 'self'"],
        ))
    }
}

pub struct FrameOptionsCheck;

impl PassiveCheck for FrameOptionsCheck {
    fn name(&self) -> &'static str {
        "frame_options"
    }

    fn inspect(&self, page: &PageSnapshot) -> Option<Finding> {
        if !is_browser_rendered(page) {
            return None;
        }

        let xfo = page.header("x-frame-options");
        let csp_covers_framing = page
            .header("content-security-policy")
            .map(|csp| csp.to_lowercase().contains("frame-ancestors"))
            .unwrap_or(false);

        match xfo {
            Some(value) => {
                let upper = value.to_uppercase();
                if upper == "DENY" || upper == "SAMEORIGIN" {
                    return None;
                }
                Some(finding(
                    self.name(),
                    "Misconfigured X-Frame-Options Header",
                    Severity::Medium,
                    "Security Headers",
                    format!("X-Frame-Options is set to '{}', which browsers do not honor. The page can still be framed by any origin.", value),
                    Some(format!("X-Frame-Options: {}", value)),
                    "An attacker page can frame this site and overlay deceptive UI on top of real controls (clickjacking).",
                    "Only DENY and SAMEORIGIN are valid values; anything else is silently ignored by browsers.",
                    vec![
                        "Set X-Frame-Options to DENY or SAMEORIGIN",
                        "Prefer CSP frame-ancestors for fine-grained control",
                    ],
                    vec!["X-Frame-Options: SAMEORIGIN"],
                ))
            }
            None if csp_covers_framing => None,
            None => Some(finding(
                self.name(),
                "Missing Clickjacking Protection Headers",
                Severity::Medium,
                "Security Headers",
                "Neither X-Frame-Options nor a CSP frame-ancestors directive is present; any site can embed this page in a frame.".to_string(),
                Some("X-Frame-Options: MISSING, frame-ancestors: MISSING".to_string()),
                "Attackers can frame the page invisibly and trick signed-in users into clicking actions they cannot see.",
                "Frame protection headers tell browsers to refuse rendering the page inside a third-party frame.",
                vec![
                    "Add X-Frame-Options: DENY or SAMEORIGIN",
                    "Or add frame-ancestors 'none'/'self' to the CSP",
                    "Cover every route, not just the landing page",
                ],
                vec!["Content-Security-Policy: frame-ancestors 'self'"],
            )),
        }
    }
}

pub struct ContentTypeOptionsCheck;

impl PassiveCheck for ContentTypeOptionsCheck {
    fn name(&self) -> &'static str {
        "content_type_options"
    }

    fn inspect(&self, page: &PageSnapshot) -> Option<Finding> {
        if !is_browser_rendered(page) {
            return None;
        }

        match page.header("x-content-type-options") {
            Some(value) if value.trim().eq_ignore_ascii_case("nosniff") => None,
            Some(value) => Some(finding(
                self.name(),
                "Misconfigured X-Content-Type-Options Header",
                Severity::Low,
                "Security Headers",
                format!("X-Content-Type-Options is set to '{}' instead of 'nosniff'.", value),
                Some(format!("X-Content-Type-Options: {}", value)),
                "Browsers may MIME-sniff responses into executable types.",
                "The only meaningful value for this header is 'nosniff'.",
                vec!["Set X-Content-Type-Options: nosniff on all responses"],
                vec![],
            )),
            None => Some(finding(
                self.name(),
                "Missing X-Content-Type-Options Header",
                Severity::Low,
                "Security Headers",
                "Responses do not opt out of MIME sniffing.".to_string(),
                Some("X-Content-Type-Options: MISSING".to_string()),
                "Uploaded or injected content served with a benign content type may be sniffed into HTML or script by older browsers.",
                "nosniff forces browsers to trust the declared content type, closing content-sniffing XSS vectors.",
                vec!["Add X-Content-Type-Options: nosniff to every response"],
                vec![],
            )),
        }
    }
}

pub struct StrictTransportSecurityCheck;

impl PassiveCheck for StrictTransportSecurityCheck {
    fn name(&self) -> &'static str {
        "hsts"
    }

    fn inspect(&self, page: &PageSnapshot) -> Option<Finding> {
        // HSTS is only delivered meaningfully over HTTPS
        if !page.is_https() {
            return None;
        }

        match page.header("strict-transport-security") {
            Some(value) => {
                let max_age = parse_max_age(value);
                // Six months is the commonly accepted floor
                if max_age.unwrap_or(0) < 15_768_000 {
                    return Some(finding(
                        self.name(),
                        "Weak Strict-Transport-Security Max-Age",
                        Severity::Low,
                        "Security Headers",
                        format!(
                            "Strict-Transport-Security is present but its max-age ({}) is below six months, so the pin expires quickly.",
                            max_age.map(|v| v.to_string()).unwrap_or_else(|| "unparseable".to_string())
                        ),
                        Some(format!("Strict-Transport-Security: {}", value)),
                        "Returning visitors lose HTTPS enforcement soon after their last visit, reopening the SSL-stripping window.",
                        "HSTS only protects while the browser remembers it; short max-age values defeat the mechanism.",
                        vec![
                            "Raise max-age to at least 15768000 (six months)",
                            "Add includeSubDomains once all subdomains serve HTTPS",
                        ],
                        vec!["Strict-Transport-Security: max-age=31536000; includeSubDomains"],
                    ));
                }
                None
            }
            None => Some(finding(
                self.name(),
                "Missing Strict-Transport-Security Header",
                Severity::Medium,
                "Security Headers",
                "The HTTPS response carries no Strict-Transport-Security header; browsers will still attempt plain HTTP on future visits.".to_string(),
                Some("Strict-Transport-Security: MISSING".to_string()),
                "A network attacker can downgrade a returning visitor's first request to cleartext and intercept it (SSL stripping).",
                "HSTS instructs browsers to refuse plain-HTTP connections to this host for the pinned period.",
                vec![
                    "Add Strict-Transport-Security with max-age of at least six months",
                    "Consider includeSubDomains and preload once rollout is complete",
                ],
                vec!["Strict-Transport-Security: max-age=31536000; includeSubDomains"],
            )),
        }
    }
}

pub struct ReferrerPolicyCheck;

impl PassiveCheck for ReferrerPolicyCheck {
    fn name(&self) -> &'static str {
        "referrer_policy"
    }

    fn inspect(&self, page: &PageSnapshot) -> Option<Finding> {
        if !is_browser_rendered(page) {
            return None;
        }

        if page.header("referrer-policy").is_some() {
            return None;
        }

        Some(finding(
            self.name(),
            "Missing Referrer-Policy Header",
            Severity::Low,
            "Security Headers",
            "No Referrer-Policy header is set; browsers fall back to their default and may leak full URLs to third-party destinations.".to_string(),
            Some("Referrer-Policy: MISSING".to_string()),
            "URLs often carry session tokens, document ids, or search terms; outbound links and embedded resources receive them in the Referer header.",
            "An explicit policy limits what portion of the current URL leaves the origin.",
            vec!["Set Referrer-Policy: strict-origin-when-cross-origin or stricter"],
            vec![],
        ))
    }
}

pub struct PermissionsPolicyCheck;

impl PassiveCheck for PermissionsPolicyCheck {
    fn name(&self) -> &'static str {
        "permissions_policy"
    }

    fn inspect(&self, page: &PageSnapshot) -> Option<Finding> {
        if !is_browser_rendered(page) {
            return None;
        }

        if page.header("permissions-policy").is_some()
            || page.header("feature-policy").is_some()
        {
            return None;
        }

        Some(finding(
            self.name(),
            "Missing Permissions-Policy Header",
            Severity::Info,
            "Security Headers",
            "No Permissions-Policy header is set; embedded third-party content inherits access to powerful browser features.".to_string(),
            Some("Permissions-Policy: MISSING".to_string()),
            "Framed or injected content can request camera, microphone, or geolocation access under this origin's identity.",
            "The header lets a site disable browser features it never uses, shrinking what a compromise can reach.",
            vec!["Declare an explicit allowlist, disabling unused features"],
            vec!["Permissions-Policy: camera=(), microphone=(), geolocation=()"],
        ))
    }
}

pub struct CorsPolicyCheck;

impl PassiveCheck for CorsPolicyCheck {
    fn name(&self) -> &'static str {
        "cors"
    }

    fn inspect(&self, page: &PageSnapshot) -> Option<Finding> {
        let allow_origin = page.header("access-control-allow-origin")?;
        let allow_credentials = page
            .header("access-control-allow-credentials")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        if allow_origin.trim() == "*" && allow_credentials {
            // Browsers reject this exact combination, but its presence means
            // the origin check is generated, and generated reflection is the
            // usual next step.
            return Some(finding(
                self.name(),
                "Permissive CORS Policy With Credentials",
                Severity::High,
                "Configuration",
                "Access-Control-Allow-Origin is a wildcard while Access-Control-Allow-Credentials is true. Cross-origin reads of authenticated responses are being offered to every origin.".to_string(),
                Some(format!(
                    "Access-Control-Allow-Origin: {}, Access-Control-Allow-Credentials: true",
                    allow_origin
                )),
                "Any website a victim visits can issue credentialed requests to this origin and read the responses, including private account data.",
                "Credentialed CORS must name a trusted origin explicitly; wildcard plus credentials signals the server trusts everyone.",
                vec![
                    "Replace the wildcard with an explicit allowlist of origins",
                    "Only send Access-Control-Allow-Credentials to allowlisted origins",
                    "Re-verify the Origin header server-side on every request",
                ],
                vec![],
            ));
        }

        if allow_origin.trim() == "*" {
            return Some(finding(
                self.name(),
                "CORS Wildcard Origin",
                Severity::Low,
                "Configuration",
                "Access-Control-Allow-Origin is a wildcard; every origin may read non-credentialed responses.".to_string(),
                Some(format!("Access-Control-Allow-Origin: {}", allow_origin)),
                "Public for all origins is fine for genuinely public data, and a liability for anything else served on this host.",
                "A wildcard disables the same-origin read boundary for this resource.",
                vec![
                    "Confirm the resource is intentionally world-readable",
                    "Otherwise restrict Access-Control-Allow-Origin to known origins",
                ],
                vec![],
            ));
        }

        None
    }
}

pub struct ServerBannerCheck;

impl PassiveCheck for ServerBannerCheck {
    fn name(&self) -> &'static str {
        "server_banner"
    }

    fn inspect(&self, page: &PageSnapshot) -> Option<Finding> {
        let mut disclosed: Vec<String> = Vec::new();

        for header in ["server", "x-powered-by", "x-aspnet-version", "x-generator"] {
            if let Some(value) = page.header(header) {
                // A bare product name is routine; a version number is the signal
                if value.chars().any(|c| c.is_ascii_digit()) {
                    disclosed.push(format!("{}: {}", header, value));
                }
            }
        }

        if disclosed.is_empty() {
            return None;
        }

        Some(finding(
            self.name(),
            "Server Version Disclosure",
            Severity::Low,
            "Information Disclosure",
            "Response headers reveal exact server or framework versions.".to_string(),
            Some(disclosed.join(", ")),
            "Version numbers let attackers select known CVEs for the exact software in use instead of probing blindly.",
            "Banner headers are informational only; removing the version costs nothing and removes free reconnaissance.",
            vec![
                "Strip version numbers from Server and X-Powered-By headers",
                "Remove framework version headers at the proxy or application layer",
            ],
            vec![],
        ))
    }
}

fn parse_max_age(value: &str) -> Option<u64> {
    value
        .split(';')
        .map(|part| part.trim())
        .find_map(|part| part.strip_prefix("max-age="))
        .and_then(|age| age.trim_matches('"').parse::<u64>().ok())
}

fn truncate(value: &str, max: usize) -> String {
    if value.len() <= max {
        value.to_string()
    } else {
        format!("{}...", &value[..max])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn html_page(headers: &[(&str, &str)]) -> PageSnapshot {
        let mut map = HashMap::new();
        map.insert("content-type".to_string(), "text/html".to_string());
        for (k, v) in headers {
            map.insert(k.to_string(), v.to_string());
        }
        PageSnapshot {
            url: "https://example.com/".to_string(),
            status_code: 200,
            headers: map,
            body: "<html><body>hello</body></html>".to_string(),
        }
    }

    #[test]
    fn test_missing_csp_reported() {
        let page = html_page(&[]);
        let finding = ContentSecurityPolicyCheck.inspect(&page).unwrap();
        assert_eq!(finding.title, "Missing Content-Security-Policy Header");
        assert_eq!(finding.severity, Severity::Medium);
    }

    #[test]
    fn test_strict_csp_passes() {
        let page = html_page(&[("content-security-policy", "default-src 'self'")]);
        assert!(ContentSecurityPolicyCheck.inspect(&page).is_none());
    }

    #[test]
    fn test_unsafe_inline_csp_reported() {
        let page = html_page(&[(
            "content-security-policy",
            "script-src 'self' 'unsafe-inline'",
        )]);
        let finding = ContentSecurityPolicyCheck.inspect(&page).unwrap();
        assert_eq!(finding.severity, Severity::Low);
    }

    #[test]
    fn test_no_header_checks_on_json_response() {
        let mut map = HashMap::new();
        map.insert("content-type".to_string(), "application/json".to_string());
        let page = PageSnapshot {
            url: "https://example.com/api".to_string(),
            status_code: 200,
            headers: map,
            body: "{\"ok\":true}".to_string(),
        };

        assert!(ContentSecurityPolicyCheck.inspect(&page).is_none());
        assert!(FrameOptionsCheck.inspect(&page).is_none());
        assert!(ContentTypeOptionsCheck.inspect(&page).is_none());
    }

    #[test]
    fn test_frame_options_sameorigin_passes() {
        let page = html_page(&[("x-frame-options", "SAMEORIGIN")]);
        assert!(FrameOptionsCheck.inspect(&page).is_none());
    }

    #[test]
    fn test_frame_ancestors_satisfies_frame_check() {
        let page = html_page(&[(
            "content-security-policy",
            "frame-ancestors 'self'",
        )]);
        assert!(FrameOptionsCheck.inspect(&page).is_none());
    }

    #[test]
    fn test_invalid_frame_options_reported() {
        let page = html_page(&[("x-frame-options", "ALLOW-FROM https://partner.example")]);
        let finding = FrameOptionsCheck.inspect(&page).unwrap();
        assert_eq!(finding.title, "Misconfigured X-Frame-Options Header");
    }

    #[test]
    fn test_hsts_missing_on_https() {
        let page = html_page(&[]);
        let finding = StrictTransportSecurityCheck.inspect(&page).unwrap();
        assert_eq!(finding.title, "Missing Strict-Transport-Security Header");
    }

    #[test]
    fn test_hsts_not_expected_on_http() {
        let mut page = html_page(&[]);
        page.url = "http://example.com/".to_string();
        assert!(StrictTransportSecurityCheck.inspect(&page).is_none());
    }

    #[test]
    fn test_hsts_short_max_age_reported() {
        let page = html_page(&[("strict-transport-security", "max-age=3600")]);
        let finding = StrictTransportSecurityCheck.inspect(&page).unwrap();
        assert_eq!(finding.title, "Weak Strict-Transport-Security Max-Age");
    }

    #[test]
    fn test_hsts_long_max_age_passes() {
        let page = html_page(&[(
            "strict-transport-security",
            "max-age=31536000; includeSubDomains",
        )]);
        assert!(StrictTransportSecurityCheck.inspect(&page).is_none());
    }

    #[test]
    fn test_cors_wildcard_with_credentials_is_high() {
        let page = html_page(&[
            ("access-control-allow-origin", "*"),
            ("access-control-allow-credentials", "true"),
        ]);
        let finding = CorsPolicyCheck.inspect(&page).unwrap();
        assert_eq!(finding.severity, Severity::High);
    }

    #[test]
    fn test_cors_wildcard_alone_is_low() {
        let page = html_page(&[("access-control-allow-origin", "*")]);
        let finding = CorsPolicyCheck.inspect(&page).unwrap();
        assert_eq!(finding.severity, Severity::Low);
    }

    #[test]
    fn test_cors_explicit_origin_passes() {
        let page = html_page(&[("access-control-allow-origin", "https://app.example.com")]);
        assert!(CorsPolicyCheck.inspect(&page).is_none());
    }

    #[test]
    fn test_server_banner_with_version_reported() {
        let page = html_page(&[("server", "nginx/1.18.0"), ("x-powered-by", "PHP/7.4.3")]);
        let finding = ServerBannerCheck.inspect(&page).unwrap();
        let evidence = finding.evidence.unwrap();
        assert!(evidence.contains("nginx/1.18.0"));
        assert!(evidence.contains("PHP/7.4.3"));
    }

    #[test]
    fn test_bare_server_name_passes() {
        let page = html_page(&[("server", "nginx")]);
        assert!(ServerBannerCheck.inspect(&page).is_none());
    }

    #[test]
    fn test_parse_max_age() {
        assert_eq!(parse_max_age("max-age=31536000"), Some(31536000));
        assert_eq!(
            parse_max_age("max-age=15768000; includeSubDomains; preload"),
            Some(15768000)
        );
        assert_eq!(parse_max_age("includeSubDomains"), None);
    }
}
