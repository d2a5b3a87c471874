// # DNS Directory Trait
//
// Defines the interface the reconciler uses to read and mutate a provider's
// record set.
//
// ## Implementations
//
// - Cloudflare: `dyndns-provider-cloudflare` crate
// - In-process: `MemoryDirectory` (local runs and tests)
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::{DnsDirectory, RecordType};
//
// let zone_id = directory.resolve_zone("example.com").await?;
// let records = directory.list_records(&zone_id, "home.example.com").await?;
// directory
//     .create_record(&zone_id, RecordType::A, "home.example.com", "203.0.113.7")
//     .await?;
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    #[serde(rename = "A")]
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }

    /// Parse a wire name; returns `None` for anything but A/AAAA
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(RecordType::A),
            "AAAA" => Some(RecordType::Aaaa),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider-held address record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// The record ID (provider-specific)
    pub id: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Fully qualified record name
    pub name: String,
    /// Address the record points at
    pub content: String,
    /// Time-to-live, if reported
    #[serde(default)]
    pub ttl: Option<u32>,
    /// Proxy flag, if the provider has one
    #[serde(default)]
    pub proxied: Option<bool>,
    /// Last modification time, if reported
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
}

impl DnsRecord {
    /// Create a record with no optional metadata
    pub fn new(
        id: impl Into<String>,
        record_type: RecordType,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            record_type,
            name: name.into(),
            content: content.into(),
            ttl: None,
            proxied: None,
            modified_on: None,
        }
    }

    /// Check whether this record belongs to `hostname`
    ///
    /// Comparison ignores ASCII case and a single trailing dot on the record
    /// name. `hostname` is expected in the validated form, without the dot.
    pub fn is_named(&self, hostname: &str) -> bool {
        let ours = self.name.strip_suffix('.').unwrap_or(&self.name);
        ours.eq_ignore_ascii_case(hostname)
    }
}

/// Trait for record directory implementations
///
/// The directory is the only shared resource between concurrent update
/// requests. Implementations must be thread-safe and usable across async
/// tasks.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - Perform API calls to their own endpoints
/// - Parse provider-specific responses
/// - Return success or failure
///
/// ## Forbidden Capabilities
/// - Spawn tasks or threads
/// - Retry or back off (a failed call aborts the request)
/// - Cache records between calls
/// - Decide which records should change (owned by the reconciler)
#[async_trait]
pub trait DnsDirectory: Send + Sync {
    /// Resolve a zone name to the provider's zone identifier
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The zone ID
    /// - `Err(Error::ZoneNotFound)`: No zone with that name
    /// - `Err(Error)`: The lookup failed
    async fn resolve_zone(&self, zone_name: &str) -> Result<String, crate::Error>;

    /// List the A/AAAA records named `name` in a zone
    ///
    /// Records of other types are not returned. Order is the provider's
    /// listing order.
    async fn list_records(&self, zone_id: &str, name: &str)
    -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a record
    async fn create_record(
        &self,
        zone_id: &str,
        record_type: RecordType,
        name: &str,
        content: &str,
    ) -> Result<DnsRecord, crate::Error>;

    /// Overwrite the record `record_id`
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record_type: RecordType,
        name: &str,
        content: &str,
    ) -> Result<DnsRecord, crate::Error>;

    /// Delete the record `record_id`
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
