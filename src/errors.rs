// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scan Engine Error Types
 * User-facing error taxonomy for the scan pipeline
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to callers of the scan pipeline.
///
/// Only two classes ever reach a caller: the primary target could not be
/// fetched or validated, or the caller is rate limited. Everything else
/// (individual check failures, active-phase timeouts, crawl probe failures)
/// is absorbed inside the pipeline and degrades result completeness instead.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The submitted target is not a well-formed http/https URL.
    #[error("Invalid target URL '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    /// The primary fetch failed (DNS, connection, TLS handshake, reset).
    #[error("Target unreachable: {url}: {reason}")]
    TargetUnreachable { url: String, reason: String },

    /// The primary fetch exceeded its wall-clock budget.
    #[error("Fetch timed out after {timeout:?} for {url}")]
    FetchTimeout { url: String, timeout: Duration },

    /// The injected rate limiter denied this request.
    #[error("Rate limit exceeded for {key}")]
    RateLimited { key: String },
}

impl ScanError {
    /// Whether a caller could reasonably retry the same scan later.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScanError::InvalidTarget { .. } => false,
            ScanError::TargetUnreachable { .. } => true,
            ScanError::FetchTimeout { .. } => true,
            ScanError::RateLimited { .. } => true,
        }
    }

    /// Classify a failed primary fetch into the user-facing taxonomy.
    pub fn from_fetch(url: &str, timeout: Duration, err: anyhow::Error) -> Self {
        if let Some(req_err) = err.downcast_ref::<reqwest::Error>() {
            if req_err.is_timeout() {
                return ScanError::FetchTimeout {
                    url: url.to_string(),
                    timeout,
                };
            }
        }
        ScanError::TargetUnreachable {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}
