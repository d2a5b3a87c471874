// # Cloudflare DNS Directory
//
// This crate provides the Cloudflare API v4 implementation of the
// `DnsDirectory` trait for the dyndns update endpoint.
//
// ## Behavior
//
// - One HTTP request per directory call
// - Full error propagation (no retry, no backoff; a failed call ends the request)
// - HTTP timeout configured (30 seconds)
// - Specific error messages for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - Dry-run mode: reads are performed, mutations are only logged
// - Zone lookup by name (a configured zone ID is applied by `UpdateService`)
// - Only A and AAAA records are surfaced to the core
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Construction fails if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

pub mod types;

use async_trait::async_trait;
use dyndns_core::config::ProviderConfig;
use dyndns_core::{DnsDirectory, DnsRecord, Error, RecordType, Result};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::types::{
    CloudflareDnsRecord, CloudflareResponse, CloudflareZone, DeletedRecord, RecordPayload,
};

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Records requested per listing page
const RECORDS_PER_PAGE: &str = "100";

const PROVIDER_NAME: &str = "cloudflare";

/// Cloudflare record directory
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the directory will:
/// - Perform all GET requests (zone lookup, record listing)
/// - Log the intended POST/PUT/DELETE
/// - **NOT** actually modify DNS records
pub struct CloudflareDirectory {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip mutations
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareDirectory")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareDirectory {
    /// Create a new Cloudflare directory
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `dry_run`: If true, perform GET requests but skip mutations
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the token is empty or the HTTP client
    /// cannot be built.
    pub fn new(api_token: impl Into<String>, dry_run: bool) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Create a new Cloudflare directory (production/live mode)
    pub fn new_live(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, false)
    }

    /// Create a new Cloudflare directory (dry-run mode)
    pub fn new_dry_run(api_token: impl Into<String>) -> Result<Self> {
        Self::new(api_token, true)
    }

    /// Create a directory from provider configuration
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare { api_token, dry_run } => {
                if *dry_run {
                    tracing::warn!(
                        "Cloudflare directory running in DRY-RUN mode - no changes will be made"
                    );
                }
                Self::new(api_token.clone(), *dry_run)
            }
            _ => Err(Error::config("Invalid config for Cloudflare directory")),
        }
    }

    /// Point the directory at another API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether mutations are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Send one API request and unwrap the response envelope
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&RecordPayload<'_>>,
        action: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{}: request failed: {}", action, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::http(format!("{}: failed to read response: {}", action, e)))?;

        let envelope = serde_json::from_str::<CloudflareResponse<T>>(&text);

        if !status.is_success() {
            let detail = match &envelope {
                Ok(envelope) => envelope.first_error().unwrap_or_else(|| text.clone()),
                Err(_) => text,
            };
            return Err(status_error(status, action, &detail));
        }

        let envelope = envelope.map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("{}: failed to parse response: {}", action, e))
        })?;

        if !envelope.success {
            let detail = envelope
                .first_error()
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(Error::provider(PROVIDER_NAME, format!("{}: {}", action, detail)));
        }

        envelope.result.ok_or_else(|| {
            Error::provider(
                PROVIDER_NAME,
                format!("{}: invalid response format: missing result", action),
            )
        })
    }
}

/// Map a non-2xx status to an error
fn status_error(status: StatusCode, action: &str, detail: &str) -> Error {
    let message = match status.as_u16() {
        401 | 403 => format!(
            "{}: authentication failed: invalid API token or insufficient permissions. Status: {}",
            action, status
        ),
        404 => format!("{}: not found. Status: {} - {}", action, status, detail),
        409 => format!(
            "{}: conflict: record is being updated by another process. Status: {}",
            action, status
        ),
        429 => format!("{}: rate limit exceeded. Status: {}", action, status),
        500..=599 => format!(
            "{}: Cloudflare server error (transient): {} - {}",
            action, status, detail
        ),
        _ => format!("{}: {} - {}", action, status, detail),
    };
    Error::provider(PROVIDER_NAME, message)
}

#[async_trait]
impl DnsDirectory for CloudflareDirectory {
    /// ```http
    /// GET /zones?name=example.com
    /// ```
    async fn resolve_zone(&self, zone_name: &str) -> Result<String> {
        tracing::debug!("Looking up zone ID for: {}", zone_name);

        let zones: Vec<CloudflareZone> = self
            .request(Method::GET, "/zones", &[("name", zone_name)], None, "zone lookup")
            .await?;

        let zone = zones
            .into_iter()
            .next()
            .ok_or_else(|| Error::zone_not_found(zone_name))?;

        tracing::debug!("Found zone ID for {}: {}", zone.name, zone.id);
        Ok(zone.id)
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com
    /// ```
    async fn list_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>> {
        let records: Vec<CloudflareDnsRecord> = self
            .request(
                Method::GET,
                &format!("/zones/{}/dns_records", zone_id),
                &[("name", name), ("per_page", RECORDS_PER_PAGE)],
                None,
                "record listing",
            )
            .await?;

        let records: Vec<DnsRecord> = records
            .into_iter()
            .filter_map(|record| {
                let record_type = record.record_type.clone();
                let converted = record.into_record();
                if converted.is_none() {
                    tracing::debug!("Skipping {} record for {}", record_type, name);
                }
                converted
            })
            .collect();

        tracing::debug!("Found {} address record(s) for {}", records.len(), name);
        Ok(records)
    }

    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// {"type": "A", "name": "home.example.com", "content": "203.0.113.7"}
    /// ```
    async fn create_record(
        &self,
        zone_id: &str,
        record_type: RecordType,
        name: &str,
        content: &str,
    ) -> Result<DnsRecord> {
        tracing::info!("Creating {} record for {} with {}", record_type, name, content);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST /zones/{}/dns_records for {} {}",
                zone_id,
                record_type,
                name
            );
            return Ok(DnsRecord::new("dry-run", record_type, name, content));
        }

        let payload = RecordPayload {
            record_type: record_type.as_str(),
            name,
            content,
        };

        let record: CloudflareDnsRecord = self
            .request(
                Method::POST,
                &format!("/zones/{}/dns_records", zone_id),
                &[],
                Some(&payload),
                &format!("create {} record", record_type),
            )
            .await?;

        record.into_record().ok_or_else(|| {
            Error::provider(PROVIDER_NAME, "Created record has unexpected type")
        })
    }

    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {"type": "A", "name": "home.example.com", "content": "203.0.113.7"}
    /// ```
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record_type: RecordType,
        name: &str,
        content: &str,
    ) -> Result<DnsRecord> {
        tracing::info!("Updating record with ID {} to {}", record_id, content);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT /zones/{}/dns_records/{} for {} {}",
                zone_id,
                record_id,
                record_type,
                name
            );
            return Ok(DnsRecord::new(record_id, record_type, name, content));
        }

        let payload = RecordPayload {
            record_type: record_type.as_str(),
            name,
            content,
        };

        let record: CloudflareDnsRecord = self
            .request(
                Method::PUT,
                &format!("/zones/{}/dns_records/{}", zone_id, record_id),
                &[],
                Some(&payload),
                &format!("update {} record", record_type),
            )
            .await?;

        record.into_record().ok_or_else(|| {
            Error::provider(PROVIDER_NAME, "Updated record has unexpected type")
        })
    }

    /// ```http
    /// DELETE /zones/:zone_id/dns_records/:record_id
    /// ```
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()> {
        tracing::info!("Deleting record with ID {}", record_id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send DELETE /zones/{}/dns_records/{}",
                zone_id,
                record_id
            );
            return Ok(());
        }

        let deleted: DeletedRecord = self
            .request(
                Method::DELETE,
                &format!("/zones/{}/dns_records/{}", zone_id, record_id),
                &[],
                None,
                "delete record",
            )
            .await?;

        tracing::debug!("Deleted record with ID {}", deleted.id);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
