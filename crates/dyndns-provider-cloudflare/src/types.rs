//! Cloudflare API v4 wire types

use chrono::{DateTime, Utc};
use dyndns_core::{DnsRecord, RecordType};
use serde::{Deserialize, Serialize};

/// Envelope wrapping every Cloudflare API response
#[derive(Debug, Deserialize)]
pub struct CloudflareResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<CloudflareError>,
    pub result: Option<T>,
}

impl<T> CloudflareResponse<T> {
    /// First API error as `"<code>: <message>"`, if any
    pub fn first_error(&self) -> Option<String> {
        self.errors
            .first()
            .map(|e| format!("{}: {}", e.code, e.message))
    }
}

#[derive(Debug, Deserialize)]
pub struct CloudflareError {
    pub code: i64,
    pub message: String,
}

/// Zone as returned by `GET /zones`
#[derive(Debug, Deserialize)]
pub struct CloudflareZone {
    pub id: String,
    pub name: String,
}

/// DNS record as returned by the `dns_records` endpoints
#[derive(Debug, Deserialize)]
pub struct CloudflareDnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub proxied: Option<bool>,
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
}

impl CloudflareDnsRecord {
    /// Convert to a core record; `None` for types other than A/AAAA
    pub fn into_record(self) -> Option<DnsRecord> {
        let record_type = RecordType::parse(&self.record_type)?;
        Some(DnsRecord {
            id: self.id,
            record_type,
            name: self.name,
            content: self.content,
            ttl: self.ttl,
            proxied: self.proxied,
            modified_on: self.modified_on,
        })
    }
}

/// Result of `DELETE /zones/:zone_id/dns_records/:record_id`
#[derive(Debug, Deserialize)]
pub struct DeletedRecord {
    pub id: String,
}

/// Body of create and update requests
#[derive(Debug, Serialize)]
pub struct RecordPayload<'a> {
    #[serde(rename = "type")]
    pub record_type: &'static str,
    pub name: &'a str,
    pub content: &'a str,
}
