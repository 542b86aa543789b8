// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Check Framework
 * Detector traits, registry, and fault-isolating executor
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::types::Finding;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

pub mod content;
pub mod cookies;
pub mod headers;
pub mod tls;
pub mod transport;

/// Everything a passive check may look at: the captured snapshot of one
/// response. Passive checks never perform I/O of their own.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: String,
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl PageSnapshot {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == wanted)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_html(&self) -> bool {
        self.header("content-type")
            .map(|ct| ct.to_lowercase().contains("text/html"))
            .unwrap_or(false)
    }

    pub fn is_https(&self) -> bool {
        self.url.to_lowercase().starts_with("https://")
    }
}

/// A pure detector: inspects the captured snapshot and reports at most one
/// finding. Must complete quickly and must not reach the network.
pub trait PassiveCheck: Send + Sync {
    fn name(&self) -> &'static str;
    fn inspect(&self, page: &PageSnapshot) -> Option<Finding>;
}

/// A network-capable detector. May issue its own probes against the target
/// and report any number of findings. The executor races the whole active
/// set against one aggregate deadline; a check must tolerate being dropped
/// mid-flight when that deadline fires.
pub trait ActiveCheck: Send + Sync {
    fn name(&self) -> &'static str;
    fn run(&self, url: &str) -> BoxFuture<'static, Vec<Finding>>;
}

/// Holds the two disjoint detector sets. Assembled explicitly at startup and
/// read-only for the lifetime of the registry, so scans never race on it.
pub struct CheckRegistry {
    passive: Vec<Box<dyn PassiveCheck>>,
    active: Vec<Box<dyn ActiveCheck>>,
}

impl CheckRegistry {
    pub fn empty() -> Self {
        Self {
            passive: Vec::new(),
            active: Vec::new(),
        }
    }

    /// Registry with the built-in detector set.
    pub fn with_default_checks() -> Self {
        let mut registry = Self::empty();

        // Header posture
        registry.register_passive(Box::new(headers::ContentSecurityPolicyCheck));
        registry.register_passive(Box::new(headers::FrameOptionsCheck));
        registry.register_passive(Box::new(headers::ContentTypeOptionsCheck));
        registry.register_passive(Box::new(headers::StrictTransportSecurityCheck));
        registry.register_passive(Box::new(headers::ReferrerPolicyCheck));
        registry.register_passive(Box::new(headers::PermissionsPolicyCheck));
        registry.register_passive(Box::new(headers::CorsPolicyCheck));
        registry.register_passive(Box::new(headers::ServerBannerCheck));

        // Cookies
        registry.register_passive(Box::new(cookies::CookieAttributesCheck));

        // Body content
        registry.register_passive(Box::new(content::SecretMaterialCheck));
        registry.register_passive(Box::new(content::MixedContentCheck));
        registry.register_passive(Box::new(content::SourceMapCheck));
        registry.register_passive(Box::new(content::DeveloperCommentCheck));
        registry.register_passive(Box::new(content::FrameworkFingerprintCheck));

        // Transport
        registry.register_passive(Box::new(transport::CleartextTransportCheck));

        // Network-capable
        registry.register_active(Box::new(tls::TlsCertificateCheck::new()));
        registry.register_active(Box::new(tls::HttpsEnforcementCheck::new()));

        registry
    }

    pub fn register_passive(&mut self, check: Box<dyn PassiveCheck>) {
        self.passive.push(check);
    }

    pub fn register_active(&mut self, check: Box<dyn ActiveCheck>) {
        self.active.push(check);
    }

    pub fn passive_count(&self) -> usize {
        self.passive.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

/// Runs a registry's detectors against one target.
pub struct CheckExecutor {
    registry: Arc<CheckRegistry>,
}

impl CheckExecutor {
    pub fn new(registry: Arc<CheckRegistry>) -> Self {
        Self { registry }
    }

    /// Run every passive check against the snapshot.
    ///
    /// One misbehaving detector must never take the scan down or starve its
    /// peers: a panic is caught, logged, and contributes zero findings.
    pub fn run_passive(&self, page: &PageSnapshot) -> Vec<Finding> {
        let mut findings = Vec::new();

        for check in &self.registry.passive {
            match catch_unwind(AssertUnwindSafe(|| check.inspect(page))) {
                Ok(Some(finding)) => {
                    debug!("[{}] reported: {}", check.name(), finding.title);
                    findings.push(finding);
                }
                Ok(None) => {}
                Err(_) => {
                    warn!("[{}] panicked, skipping its output", check.name());
                }
            }
        }

        findings
    }

    /// Run the active set under one aggregate deadline.
    ///
    /// This is a race between the fan-out completing and the timer firing.
    /// When the timer wins, in-flight probes are abandoned (dropped, not
    /// force-stopped) and the phase contributes nothing; the scan still
    /// succeeds on passive signal alone.
    pub async fn run_active(&self, url: &str, deadline: Duration) -> Vec<Finding> {
        match timeout(deadline, self.collect_active(url)).await {
            Ok(findings) => findings,
            Err(_) => {
                warn!(
                    "Active checks for {} exceeded {:?} deadline, discarding phase",
                    url, deadline
                );
                Vec::new()
            }
        }
    }

    async fn collect_active(&self, url: &str) -> Vec<Finding> {
        let probes = self.registry.active.iter().map(|check| check.run(url));
        futures::future::join_all(probes)
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Random hex id for one finding, prefixed with the reporting check's name.
pub(crate) fn finding_id(prefix: &str) -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    format!(
        "{}_{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
        prefix,
        rng.random::<u32>(),
        rng.random::<u16>(),
        rng.random::<u16>(),
        rng.random::<u16>(),
        rng.random::<u64>() & 0xffffffffffff
    )
}
