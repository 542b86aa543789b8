// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scan Pipeline
 * Fetch, check, reduce: the orchestration path for one target
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::checks::{finding_id, CheckExecutor, CheckRegistry, PageSnapshot};
use crate::config::ScanProfile;
use crate::discovery::{parse_page_url, registrable_domain};
use crate::errors::ScanError;
use crate::findings;
use crate::http_client::HttpClient;
use crate::rate_limit::RateLimiter;
use crate::store::{ScanRecord, ScanStore};
use crate::types::ScanResult;
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Window applied to the injected rate limiter.
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Runs the scan path for one target: bounded fetch, passive checks over the
/// captured snapshot, active checks under their own deadline, then the
/// severity-ordered result.
///
/// Holds no mutable state across runs; one pipeline instance serves any
/// number of sequential or concurrent scans.
pub struct ScanPipeline {
    http_client: HttpClient,
    executor: CheckExecutor,
    profile: ScanProfile,
    owner: Option<String>,
    limiter: Option<Arc<dyn RateLimiter>>,
    store: Option<Arc<dyn ScanStore>>,
}

impl ScanPipeline {
    pub fn new(profile: ScanProfile) -> Result<Self> {
        Self::with_registry(profile, CheckRegistry::with_default_checks())
    }

    pub fn with_registry(profile: ScanProfile, registry: CheckRegistry) -> Result<Self> {
        let http_client = HttpClient::new(profile.fetch_timeout(), profile.max_body_bytes)?;
        Ok(Self {
            http_client,
            executor: CheckExecutor::new(Arc::new(registry)),
            profile,
            owner: None,
            limiter: None,
            store: None,
        })
    }

    pub fn single() -> Result<Self> {
        Self::new(ScanProfile::single())
    }

    pub fn bulk() -> Result<Self> {
        Self::new(ScanProfile::bulk())
    }

    pub fn demo() -> Result<Self> {
        Self::new(ScanProfile::demo())
    }

    /// Identity the rate limiter and persistence sink key scans under.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ScanStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Scan one target.
    ///
    /// The primary fetch failing is the only fatal path. Detector faults and
    /// the active phase timing out degrade the finding set silently; the
    /// persistence hand-off happens after the result is complete and cannot
    /// delay or fail it.
    pub async fn run(&self, url: &str) -> Result<ScanResult, ScanError> {
        let target = parse_page_url(url)?;

        if let Some(limiter) = &self.limiter {
            let key = self
                .owner
                .clone()
                .or_else(|| registrable_domain(&target))
                .unwrap_or_else(|| url.to_string());
            if !limiter.allow(&key, RATE_LIMIT_WINDOW) {
                return Err(ScanError::RateLimited { key });
            }
        }

        info!("[Scan] Starting scan of {}", url);
        let started = Instant::now();
        let scanned_at = chrono::Utc::now().to_rfc3339();

        let response = self
            .http_client
            .get(url)
            .await
            .map_err(|e| ScanError::from_fetch(url, self.profile.fetch_timeout(), e))?;

        let snapshot = PageSnapshot {
            url: response.final_url.clone(),
            status_code: response.status_code,
            headers: response.headers.clone(),
            body: response.body,
        };

        let mut collected = self.executor.run_passive(&snapshot);
        let active = self
            .executor
            .run_active(&snapshot.url, self.profile.active_deadline())
            .await;
        collected.extend(active);

        let (ordered, summary) = findings::reduce(collected);

        let result = ScanResult {
            url: url.to_string(),
            scanned_at,
            duration_ms: started.elapsed().as_millis() as u64,
            findings: ordered,
            summary,
            response_headers: response.headers,
        };

        info!(
            "[Scan] Completed {} in {}ms: {} findings",
            url, result.duration_ms, result.summary.total
        );

        self.persist(&result);

        Ok(result)
    }

    /// Scan many targets strictly one after another, returning one outcome
    /// per input in input order.
    ///
    /// Sequential on purpose: fanning out across third-party hosts multiplies
    /// outbound pressure and trips their anti-abuse defences.
    pub async fn run_many(&self, urls: &[String]) -> Vec<Result<ScanResult, ScanError>> {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            results.push(self.run(url).await);
        }
        results
    }

    fn persist(&self, result: &ScanResult) {
        let store = match &self.store {
            Some(store) => Arc::clone(store),
            None => return,
        };

        let record = ScanRecord {
            owner: self.owner.clone().unwrap_or_else(|| "anonymous".to_string()),
            scan_id: finding_id("scan"),
            recorded_at: chrono::Utc::now().to_rfc3339(),
            result: result.clone(),
        };
        let url = record.result.url.clone();

        tokio::spawn(async move {
            if let Err(e) = store.record(record).await {
                warn!("Recording scan of {} failed: {}", url, e);
            }
        });
    }
}
