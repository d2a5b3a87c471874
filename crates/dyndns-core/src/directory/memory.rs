// # Memory Directory
//
// In-process implementation of DnsDirectory.
//
// ## Purpose
//
// Holds a single zone's address records in memory. Useful for local runs of
// the daemon without provider credentials, and as the directory double in
// tests.
//
// ## Crash Behavior
//
// - All records are lost on restart/crash
// - The first update after a restart recreates the records
//
// ## Test Hooks
//
// - Every call is appended to a call log (`calls()`)
// - `fail_on()` makes one kind of call fail from then on

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::traits::{DnsDirectory, DnsRecord, RecordType};
use crate::Error;

const PROVIDER_NAME: &str = "memory";

/// Kind of directory call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryOperation {
    ResolveZone,
    List,
    Create,
    Update,
    Delete,
}

/// A call observed by the memory directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryCall {
    /// Kind of call
    pub operation: DirectoryOperation,
    /// Record name, record id, or zone name depending on the call
    pub target: String,
    /// Content sent with creates and updates
    pub content: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<DnsRecord>,
    calls: Vec<DirectoryCall>,
    fail_on: Option<DirectoryOperation>,
    next_id: u64,
}

/// In-memory directory implementation
///
/// Records are kept in insertion order, which is also the listing order.
///
/// # Example
///
/// ```rust,no_run
/// use dyndns_core::directory::MemoryDirectory;
/// use dyndns_core::traits::{DnsDirectory, RecordType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let directory = MemoryDirectory::new("example.com");
///     let zone_id = directory.resolve_zone("example.com").await?;
///
///     directory
///         .create_record(&zone_id, RecordType::A, "home.example.com", "192.0.2.1")
///         .await?;
///
///     let records = directory.list_records(&zone_id, "home.example.com").await?;
///     assert_eq!(records.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    zone_name: String,
    zone_id: String,
    inner: Arc<RwLock<Inner>>,
}

impl MemoryDirectory {
    /// Create an empty directory serving `zone_name`
    pub fn new(zone_name: impl Into<String>) -> Self {
        let zone_name = zone_name.into();
        Self {
            zone_id: format!("memory-{}", zone_name),
            zone_name,
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    /// Identifier `resolve_zone` hands out for the served zone
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Insert a record directly, bypassing the call log
    pub async fn seed(
        &self,
        record_type: RecordType,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> DnsRecord {
        let mut guard = self.inner.write().await;
        let record = new_record(&mut guard, record_type, name.into(), content.into());
        guard.records.push(record.clone());
        record
    }

    /// Snapshot of all records
    pub async fn records(&self) -> Vec<DnsRecord> {
        self.inner.read().await.records.clone()
    }

    /// Snapshot of the call log
    pub async fn calls(&self) -> Vec<DirectoryCall> {
        self.inner.read().await.calls.clone()
    }

    /// Number of calls made so far
    pub async fn call_count(&self) -> usize {
        self.inner.read().await.calls.len()
    }

    /// Make every future call of kind `operation` fail
    pub async fn fail_on(&self, operation: DirectoryOperation) {
        self.inner.write().await.fail_on = Some(operation);
    }

    /// Clear any injected failure
    pub async fn clear_failure(&self) {
        self.inner.write().await.fail_on = None;
    }

    fn check_zone(&self, zone_id: &str) -> Result<(), Error> {
        if zone_id == self.zone_id {
            Ok(())
        } else {
            Err(Error::provider(
                PROVIDER_NAME,
                format!("Unknown zone ID: {}", zone_id),
            ))
        }
    }
}

fn new_record(inner: &mut Inner, record_type: RecordType, name: String, content: String) -> DnsRecord {
    inner.next_id += 1;
    let mut record = DnsRecord::new(inner.next_id.to_string(), record_type, name, content);
    record.ttl = Some(1);
    record.modified_on = Some(Utc::now());
    record
}

fn log_call(
    inner: &mut Inner,
    operation: DirectoryOperation,
    target: &str,
    content: Option<&str>,
) -> Result<(), Error> {
    inner.calls.push(DirectoryCall {
        operation,
        target: target.to_string(),
        content: content.map(str::to_string),
    });

    if inner.fail_on == Some(operation) {
        return Err(Error::provider(
            PROVIDER_NAME,
            format!("Injected failure for {:?} on {}", operation, target),
        ));
    }

    Ok(())
}

#[async_trait]
impl DnsDirectory for MemoryDirectory {
    async fn resolve_zone(&self, zone_name: &str) -> Result<String, Error> {
        let mut guard = self.inner.write().await;
        log_call(&mut guard, DirectoryOperation::ResolveZone, zone_name, None)?;

        if zone_name.eq_ignore_ascii_case(&self.zone_name) {
            Ok(self.zone_id.clone())
        } else {
            Err(Error::zone_not_found(zone_name))
        }
    }

    async fn list_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>, Error> {
        let mut guard = self.inner.write().await;
        log_call(&mut guard, DirectoryOperation::List, name, None)?;
        self.check_zone(zone_id)?;

        Ok(guard
            .records
            .iter()
            .filter(|r| r.is_named(name))
            .cloned()
            .collect())
    }

    async fn create_record(
        &self,
        zone_id: &str,
        record_type: RecordType,
        name: &str,
        content: &str,
    ) -> Result<DnsRecord, Error> {
        let mut guard = self.inner.write().await;
        log_call(&mut guard, DirectoryOperation::Create, name, Some(content))?;
        self.check_zone(zone_id)?;

        let record = new_record(&mut guard, record_type, name.to_string(), content.to_string());
        guard.records.push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record_type: RecordType,
        name: &str,
        content: &str,
    ) -> Result<DnsRecord, Error> {
        let mut guard = self.inner.write().await;
        log_call(&mut guard, DirectoryOperation::Update, record_id, Some(content))?;
        self.check_zone(zone_id)?;

        let record = guard
            .records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| {
                Error::provider(PROVIDER_NAME, format!("Record not found: {}", record_id))
            })?;

        record.record_type = record_type;
        record.name = name.to_string();
        record.content = content.to_string();
        record.modified_on = Some(Utc::now());
        Ok(record.clone())
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        log_call(&mut guard, DirectoryOperation::Delete, record_id, None)?;
        self.check_zone(zone_id)?;

        let before = guard.records.len();
        guard.records.retain(|r| r.id != record_id);
        if guard.records.len() == before {
            return Err(Error::provider(
                PROVIDER_NAME,
                format!("Record not found: {}", record_id),
            ));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
