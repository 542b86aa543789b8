// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resource budget for one pipeline run.
///
/// Three stock profiles exist: `single` for interactive scans, `bulk` for
/// multi-target batches (tighter active-phase deadline so one slow target
/// cannot stall the batch), and `demo` for unauthenticated try-it scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProfile {
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default = "default_active_deadline_secs")]
    pub active_deadline_secs: u64,
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_active_deadline_secs() -> u64 {
    20
}

impl Default for ScanProfile {
    fn default() -> Self {
        Self::single()
    }
}

impl ScanProfile {
    pub fn single() -> Self {
        Self {
            fetch_timeout_secs: 15,
            max_body_bytes: 1024 * 1024,
            active_deadline_secs: 20,
        }
    }

    pub fn bulk() -> Self {
        Self {
            fetch_timeout_secs: 15,
            max_body_bytes: 1024 * 1024,
            active_deadline_secs: 15,
        }
    }

    pub fn demo() -> Self {
        Self {
            fetch_timeout_secs: 10,
            max_body_bytes: 512 * 1024,
            active_deadline_secs: 10,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn active_deadline(&self) -> Duration {
        Duration::from_secs(self.active_deadline_secs)
    }
}

/// Bounds for same-site page discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSettings {
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    #[serde(default = "default_probe_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_pages() -> usize {
    5
}

fn default_probe_timeout_secs() -> u64 {
    8
}

fn default_probe_body_bytes() -> usize {
    512 * 1024
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            probe_timeout_secs: default_probe_timeout_secs(),
            max_body_bytes: default_probe_body_bytes(),
        }
    }
}

impl CrawlSettings {
    pub fn with_max_pages(max_pages: usize) -> Self {
        Self {
            max_pages,
            ..Self::default()
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
