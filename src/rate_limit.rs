// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Injected admission capability for scan entry points.
///
/// The pipeline only ever asks "may this key proceed for this window"; how
/// the decision is stored - memory, Redis, a billing service - is the
/// implementation's business.
pub trait RateLimiter: Send + Sync {
    fn allow(&self, key: &str, window: Duration) -> bool;
}

/// In-memory fixed-window counter. Suitable for a single process; swap the
/// trait object for a shared backend when scans are served from a fleet.
pub struct FixedWindowLimiter {
    max_per_window: u32,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl FixedWindowLimiter {
    pub fn new(max_per_window: u32) -> Self {
        Self {
            max_per_window,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn allow(&self, key: &str, window: Duration) -> bool {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let now = Instant::now();
        let entry = windows.entry(key.to_string()).or_insert((now, 0));

        if now.duration_since(entry.0) >= window {
            *entry = (now, 0);
        }

        if entry.1 >= self.max_per_window {
            debug!("Rate limit hit for {} ({} in window)", key, entry.1);
            return false;
        }

        entry.1 += 1;
        true
    }
}

/// Limiter that admits everything. Default for library embedders that do
/// their own admission control upstream.
pub struct UnlimitedLimiter;

impl RateLimiter for UnlimitedLimiter {
    fn allow(&self, _key: &str, _window: Duration) -> bool {
        true
    }
}
