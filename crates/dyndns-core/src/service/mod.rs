//! Update service
//!
//! The `UpdateService` runs one dyndns update request end to end:
//!
//! ```text
//!  hostname, myip
//!       │
//!       ▼
//! ┌──────────────┐   MissingFields, InvalidInput
//! │ input checks │──────────────────▶
//! └──────────────┘
//!       │          HostnameNotAllowed
//!       ├─ allow-list (before|after) ─▶
//!       ▼
//! ┌──────────────┐   NoValidAddress
//! │  classify()  │──────────────────▶
//! └──────────────┘
//!       │
//!       ▼
//! ┌──────────────┐   resolve_zone ─▶ list_records
//! │ DnsDirectory │◀────────────────────────────────┐
//! └──────────────┘                                  │
//!       │                                           │
//!       ▼                                           │
//! ┌──────────────┐        ┌──────────────┐          │
//! │ reconcile()  │───────▶│   apply()    │──────────┘
//! └──────────────┘        └──────────────┘
//! ```
//!
//! Input and policy checks use local state only; no directory call is made
//! for a request they reject. Directory calls for one request are strictly
//! sequential. Concurrent requests share nothing but the directory.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::classify::{classify, ClassifiedAddresses};
use crate::config::{validate_domain_name, AllowListOrder, UpdateConfig};
use crate::error::{DirectoryStage, Error, Result};
use crate::reconcile::{apply, reconcile, AppliedOperation};
use crate::traits::DnsDirectory;

/// Successful outcome of an update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Hostname that was reconciled
    pub hostname: String,
    /// Addresses selected from the request
    pub addresses: ClassifiedAddresses,
    /// Operations the directory accepted, in execution order
    pub applied: Vec<AppliedOperation>,
}

/// Request-level dyndns update use case
///
/// Cheap to clone; clones share the directory.
#[derive(Clone)]
pub struct UpdateService {
    directory: Arc<dyn DnsDirectory>,
    config: Arc<UpdateConfig>,
}

impl std::fmt::Debug for UpdateService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateService")
            .field("provider", &self.directory.provider_name())
            .field("config", &self.config)
            .finish()
    }
}

impl UpdateService {
    /// Create a new update service
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn new(directory: Arc<dyn DnsDirectory>, config: UpdateConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            directory,
            config: Arc::new(config),
        })
    }

    /// The service configuration
    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// Name of the backing directory
    pub fn provider_name(&self) -> &'static str {
        self.directory.provider_name()
    }

    /// Reconcile `hostname` against the comma-separated `raw_addresses`
    ///
    /// # Errors
    ///
    /// - `MissingFields` / `InvalidInput` / `NoValidAddress`: rejected before
    ///   any directory call
    /// - `HostnameNotAllowed`: rejected before any directory call
    /// - `ZoneNotFound`: the configured zone does not resolve
    /// - `HostnameNotManaged`: no record exists and creation is disabled
    /// - `Directory`: a directory call failed, tagged with its stage; earlier
    ///   mutations in the same request stay applied
    pub async fn update(&self, hostname: &str, raw_addresses: &str) -> Result<UpdateOutcome> {
        if hostname.is_empty() || raw_addresses.is_empty() {
            return Err(Error::MissingFields);
        }
        validate_domain_name(hostname)?;

        if self.config.allow_list_order == AllowListOrder::BeforeAddressValidation {
            self.check_allowed(hostname)?;
        }

        let addresses = classify(raw_addresses).inspect_err(|_| {
            error!("Invalid IPv4/6 address list for {}: {}", hostname, raw_addresses);
        })?;

        if self.config.allow_list_order == AllowListOrder::AfterAddressValidation {
            self.check_allowed(hostname)?;
        }

        debug!(
            "Selected addresses for {}: v4={:?} v6={:?}",
            hostname,
            addresses.v4.as_ref().map(|c| c.value()),
            addresses.v6.as_ref().map(|c| c.value())
        );

        let zone_id = self.zone_id().await?;

        let existing = self
            .directory
            .list_records(&zone_id, hostname)
            .await
            .map_err(|e| e.at_stage(DirectoryStage::Listing))
            .inspect_err(|e| error!("Error fetching DNS records for {}: {}", hostname, e))?;

        let plan = reconcile(hostname, &addresses, &existing);

        if plan.existing_records() == 0 && !self.config.create_missing {
            info!("No A/AAAA record for {}, creation disabled", hostname);
            return Err(Error::hostname_not_managed(hostname));
        }

        debug!("Plan for {}: {} operation(s)", hostname, plan.len());

        let applied = apply(self.directory.as_ref(), &zone_id, &plan)
            .await
            .map_err(|e| {
                error!("Error updating records for {}: {}", hostname, e);
                e.into_inner().at_stage(DirectoryStage::Mutation)
            })?;

        info!("Record(s) updated for {}: {} operation(s)", hostname, applied.len());

        Ok(UpdateOutcome {
            hostname: hostname.to_string(),
            addresses,
            applied,
        })
    }

    fn check_allowed(&self, hostname: &str) -> Result<()> {
        if self.config.is_allowed(hostname) {
            Ok(())
        } else {
            info!("Rejected update for {}: not in allow-list", hostname);
            Err(Error::hostname_not_allowed(hostname))
        }
    }

    async fn zone_id(&self) -> Result<String> {
        if let Some(zone_id) = &self.config.zone_id {
            debug!("Using pre-configured zone ID");
            return Ok(zone_id.clone());
        }

        self.directory
            .resolve_zone(&self.config.zone_name)
            .await
            .map_err(|e| e.at_stage(DirectoryStage::ZoneLookup))
            .inspect_err(|e| error!("Error fetching zone ID for {}: {}", self.config.zone_name, e))
    }
}
