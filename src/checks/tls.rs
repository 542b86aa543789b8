// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - TLS Probes
 * Network-capable checks for certificate and HTTPS-enforcement posture
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::checks::{finding_id, ActiveCheck};
use crate::types::{Finding, Severity};
use futures::future::BoxFuture;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

const PROBE_TIMEOUT: Duration = Duration::from_secs(8);

/// Probes the target's certificate by performing a fully validating TLS
/// request. A handshake the default trust store rejects is reported; the
/// error text distinguishes expiry and self-signed chains where possible.
pub struct TlsCertificateCheck {
    probe_timeout: Duration,
}

impl TlsCertificateCheck {
    pub fn new() -> Self {
        Self {
            probe_timeout: PROBE_TIMEOUT,
        }
    }
}

impl Default for TlsCertificateCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveCheck for TlsCertificateCheck {
    fn name(&self) -> &'static str {
        "tls_certificate"
    }

    fn run(&self, url: &str) -> BoxFuture<'static, Vec<Finding>> {
        let url = url.to_string();
        let probe_timeout = self.probe_timeout;

        Box::pin(async move {
            let parsed = match Url::parse(&url) {
                Ok(parsed) => parsed,
                Err(_) => return Vec::new(),
            };
            if parsed.scheme() != "https" {
                return Vec::new();
            }
            let host = match parsed.host_str() {
                Some(host) => host.to_string(),
                None => return Vec::new(),
            };
            let port = parsed.port().unwrap_or(443);

            // TLS reachability first; a closed port is not a certificate issue.
            let addr = format!("{}:{}", host, port);
            match timeout(probe_timeout, TcpStream::connect(&addr)).await {
                Ok(Ok(_)) => {}
                _ => {
                    debug!("[tls_certificate] {} not reachable, skipping probe", addr);
                    return Vec::new();
                }
            }

            let client = match reqwest::Client::builder()
                .timeout(probe_timeout)
                .redirect(reqwest::redirect::Policy::none())
                .build()
            {
                Ok(client) => client,
                Err(_) => return Vec::new(),
            };

            match client.get(parsed.as_str()).send().await {
                Ok(_) => Vec::new(),
                Err(err) => classify_tls_error(&url, &err)
                    .map(|finding| vec![finding])
                    .unwrap_or_default(),
            }
        })
    }
}

fn classify_tls_error(url: &str, err: &reqwest::Error) -> Option<Finding> {
    let chain = error_chain_text(err);
    if !chain.contains("certificate") && !chain.contains("tls") && !chain.contains("ssl") {
        return None;
    }

    let (title, description) = if chain.contains("expired") {
        (
            "Expired TLS Certificate",
            "The certificate presented by the server is past its validity period.",
        )
    } else if chain.contains("self-signed") || chain.contains("self signed") {
        (
            "Self-Signed TLS Certificate",
            "The server presents a self-signed certificate that no public authority vouches for.",
        )
    } else {
        (
            "Invalid TLS Certificate",
            "The certificate presented by the server fails standard validation.",
        )
    };

    Some(Finding {
        id: finding_id("tls_certificate"),
        title: title.to_string(),
        severity: Severity::High,
        category: "Transport".to_string(),
        description: description.to_string(),
        evidence: Some(snippet(&chain, 200)),
        risk_impact: "Browsers warn users away, and clients trained to bypass the warning lose all man-in-the-middle protection on this host.".to_string(),
        explanation: "A certificate the platform trust store rejects gives visitors no way to distinguish the real site from an interceptor.".to_string(),
        fix_steps: vec![
            "Install a certificate from a trusted authority".to_string(),
            "Automate renewal so expiry cannot recur".to_string(),
            "Serve the full intermediate chain".to_string(),
        ],
        code_examples: Vec::new(),
    })
}

/// For plain-HTTP targets, probes whether the host serves HTTPS at all.
/// A host that answers on HTTPS while content is consumed over HTTP has an
/// enforcement gap rather than a capability gap.
pub struct HttpsEnforcementCheck {
    probe_timeout: Duration,
}

impl HttpsEnforcementCheck {
    pub fn new() -> Self {
        Self {
            probe_timeout: PROBE_TIMEOUT,
        }
    }
}

impl Default for HttpsEnforcementCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveCheck for HttpsEnforcementCheck {
    fn name(&self) -> &'static str {
        "https_enforcement"
    }

    fn run(&self, url: &str) -> BoxFuture<'static, Vec<Finding>> {
        let url = url.to_string();
        let probe_timeout = self.probe_timeout;

        Box::pin(async move {
            let parsed = match Url::parse(&url) {
                Ok(parsed) => parsed,
                Err(_) => return Vec::new(),
            };
            if parsed.scheme() != "http" {
                return Vec::new();
            }
            let host = match parsed.host_str() {
                Some(host) => host.to_string(),
                None => return Vec::new(),
            };

            let client = match reqwest::Client::builder()
                .timeout(probe_timeout)
                .redirect(reqwest::redirect::Policy::none())
                .build()
            {
                Ok(client) => client,
                Err(_) => return Vec::new(),
            };

            let https_url = format!("https://{}{}", host, parsed.path());
            match client.get(&https_url).send().await {
                Ok(response) if response.status().as_u16() < 500 => {
                    vec![Finding {
                        id: finding_id("https_enforcement"),
                        title: "HTTPS Available But Not Enforced".to_string(),
                        severity: Severity::Medium,
                        category: "Transport".to_string(),
                        description: "The host serves HTTPS, yet the scanned page was reached over plain HTTP without an upgrade.".to_string(),
                        evidence: Some(format!("{} answers while {} was served", https_url, url)),
                        risk_impact: "Visitors who type or follow http:// links stay on cleartext even though the secure channel exists.".to_string(),
                        explanation: "Serving both schemes without redirecting leaves the insecure one in active use indefinitely.".to_string(),
                        fix_steps: vec![
                            "Redirect all HTTP traffic to HTTPS with a 301".to_string(),
                            "Add Strict-Transport-Security on the HTTPS responses".to_string(),
                        ],
                        code_examples: Vec::new(),
                    }]
                }
                Ok(_) => Vec::new(),
                Err(err) => {
                    debug!("[https_enforcement] probe of {} failed: {}", https_url, err);
                    Vec::new()
                }
            }
        })
    }
}

fn error_chain_text(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text.to_lowercase()
}

fn snippet(value: &str, max: usize) -> String {
    if value.len() <= max {
        value.to_string()
    } else {
        format!("{}...", &value[..max])
    }
}
