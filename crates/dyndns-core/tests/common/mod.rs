//! Test doubles and common utilities for contract tests
//!
//! `MemoryDirectory` covers record state and the call log. The wrapper here
//! adds concurrency tracking so tests can assert that a request never has two
//! directory calls in flight.

#![allow(dead_code)]

use dyndns_core::directory::MemoryDirectory;
use dyndns_core::error::Result;
use dyndns_core::traits::{DnsDirectory, DnsRecord, RecordType};
use dyndns_core::{UpdateConfig, UpdateService};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const ZONE: &str = "example.com";
pub const HOST: &str = "home.example.com";

/// Directory that delays every call and records peak concurrency
pub struct TrackingDirectory {
    inner: MemoryDirectory,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl TrackingDirectory {
    pub fn new(inner: MemoryDirectory, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Highest number of calls observed in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> InFlightGuard {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        InFlightGuard(Arc::clone(&self.in_flight))
    }
}

struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl DnsDirectory for TrackingDirectory {
    async fn resolve_zone(&self, zone_name: &str) -> Result<String> {
        let _guard = self.enter().await;
        self.inner.resolve_zone(zone_name).await
    }

    async fn list_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>> {
        let _guard = self.enter().await;
        self.inner.list_records(zone_id, name).await
    }

    async fn create_record(
        &self,
        zone_id: &str,
        record_type: RecordType,
        name: &str,
        content: &str,
    ) -> Result<DnsRecord> {
        let _guard = self.enter().await;
        self.inner.create_record(zone_id, record_type, name, content).await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record_type: RecordType,
        name: &str,
        content: &str,
    ) -> Result<DnsRecord> {
        let _guard = self.enter().await;
        self.inner
            .update_record(zone_id, record_id, record_type, name, content)
            .await
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let _guard = self.enter().await;
        self.inner.delete_record(zone_id, record_id).await
    }

    fn provider_name(&self) -> &'static str {
        "tracking"
    }
}

/// Service over a fresh memory directory for `ZONE`
pub fn memory_service(config: UpdateConfig) -> (UpdateService, MemoryDirectory) {
    let directory = MemoryDirectory::new(ZONE);
    let service = UpdateService::new(Arc::new(directory.clone()), config)
        .expect("service construction succeeds");
    (service, directory)
}

/// Contents of `name`'s records of one type, in listing order
pub async fn contents(directory: &MemoryDirectory, name: &str, record_type: RecordType) -> Vec<String> {
    directory
        .records()
        .await
        .into_iter()
        .filter(|r| r.is_named(name) && r.record_type == record_type)
        .map(|r| r.content)
        .collect()
}
