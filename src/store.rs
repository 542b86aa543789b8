// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use crate::types::ScanResult;
use anyhow::Result;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};

/// One persisted scan, keyed by the requesting identity and the scan id.
#[derive(Debug, Clone)]
pub struct ScanRecord {
    pub owner: String,
    pub scan_id: String,
    pub recorded_at: String,
    pub result: ScanResult,
}

/// Persistence sink for completed scans.
///
/// The pipeline records fire-and-continue: a slow or failing store must
/// never delay or fail the scan whose result it is archiving.
pub trait ScanStore: Send + Sync {
    fn record(&self, record: ScanRecord) -> BoxFuture<'static, Result<()>>;
}

/// Keeps records in process memory. Used by tests and the demo surface.
#[derive(Clone, Default)]
pub struct InMemoryScanStore {
    records: Arc<Mutex<Vec<ScanRecord>>>,
}

impl InMemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<ScanRecord> {
        match self.records.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.recorded().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScanStore for InMemoryScanStore {
    fn record(&self, record: ScanRecord) -> BoxFuture<'static, Result<()>> {
        let records = Arc::clone(&self.records);
        Box::pin(async move {
            match records.lock() {
                Ok(mut guard) => guard.push(record),
                Err(poisoned) => poisoned.into_inner().push(record),
            }
            Ok(())
        })
    }
}
