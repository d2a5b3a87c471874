//! Configuration types for the dyndns update endpoint
//!
//! These structs are built once at startup and passed explicitly into the
//! [`UpdateService`](crate::UpdateService) and the HTTP adapter. The core reads
//! no environment variables itself.

use serde::{Deserialize, Serialize};

/// Update service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Zone the managed hostnames live in (e.g., "example.com")
    pub zone_name: String,

    /// Pre-resolved zone identifier; skips the zone lookup when set
    #[serde(default)]
    pub zone_id: Option<String>,

    /// Hostnames the service may act on (empty = unrestricted)
    #[serde(default)]
    pub allowed_hostnames: Vec<String>,

    /// Where the allow-list check sits relative to address validation
    #[serde(default)]
    pub allow_list_order: AllowListOrder,

    /// Create records for families with no existing record
    ///
    /// When false, a hostname without any A/AAAA record is rejected with
    /// `HostnameNotManaged` instead.
    #[serde(default = "default_create_missing")]
    pub create_missing: bool,
}

impl UpdateConfig {
    /// Create a configuration for the given zone with defaults
    pub fn new(zone_name: impl Into<String>) -> Self {
        Self {
            zone_name: zone_name.into(),
            zone_id: None,
            allowed_hostnames: Vec::new(),
            allow_list_order: AllowListOrder::default(),
            create_missing: default_create_missing(),
        }
    }

    /// Set the pre-resolved zone identifier
    pub fn with_zone_id(mut self, zone_id: impl Into<String>) -> Self {
        self.zone_id = Some(zone_id.into());
        self
    }

    /// Set the hostname allow-list
    pub fn with_allowed_hostnames<I, S>(mut self, hostnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_hostnames = hostnames.into_iter().map(Into::into).collect();
        self
    }

    /// Set the allow-list check order
    pub fn with_allow_list_order(mut self, order: AllowListOrder) -> Self {
        self.allow_list_order = order;
        self
    }

    /// Enable or disable creation of missing records
    pub fn with_create_missing(mut self, create_missing: bool) -> Self {
        self.create_missing = create_missing;
        self
    }

    /// Check whether the allow-list permits `hostname`
    pub fn is_allowed(&self, hostname: &str) -> bool {
        self.allowed_hostnames.is_empty()
            || self.allowed_hostnames.iter().any(|allowed| allowed == hostname)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_name.trim().is_empty() {
            return Err(crate::Error::config("Zone name cannot be empty"));
        }

        if let Some(zone_id) = &self.zone_id
            && zone_id.trim().is_empty()
        {
            return Err(crate::Error::config("Zone ID cannot be empty when set"));
        }

        if self.allowed_hostnames.iter().any(|h| h.trim().is_empty()) {
            return Err(crate::Error::config(
                "Allowed hostnames cannot contain empty entries",
            ));
        }

        for hostname in &self.allowed_hostnames {
            validate_domain_name(hostname)
                .map_err(|e| crate::Error::config(format!("Allowed hostname: {}", e)))?;
        }

        Ok(())
    }
}

/// Validate that a string is a plausible DNS name
///
/// Basic RFC 1035 shape checks: total length, label length, and
/// alphanumeric/hyphen labels that do not start or end with a hyphen.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::invalid_input("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::invalid_input(format!(
            "Domain name too long: {} chars (max 253)",
            domain.len()
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::invalid_input(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::invalid_input(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::invalid_input(format!(
                "Domain label contains invalid characters: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::invalid_input(format!(
                "Domain label cannot start or end with hyphen: '{}'",
                label
            )));
        }
    }

    Ok(())
}

/// Position of the allow-list check in request handling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllowListOrder {
    /// Classify addresses first; a request with no valid address is reported
    /// as such even for a forbidden hostname
    #[default]
    AfterAddressValidation,
    /// Reject forbidden hostnames before looking at the address list
    BeforeAddressValidation,
}

impl std::str::FromStr for AllowListOrder {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "after-validation" | "after-address-validation" => {
                Ok(AllowListOrder::AfterAddressValidation)
            }
            "before-validation" | "before-address-validation" => {
                Ok(AllowListOrder::BeforeAddressValidation)
            }
            other => Err(crate::Error::config(format!(
                "Unknown allow-list order '{}'. Valid: after-validation, before-validation",
                other
            ))),
        }
    }
}

/// Record directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare API v4
    Cloudflare {
        /// Cloudflare API token
        api_token: String,
        /// Log mutations instead of sending them
        #[serde(default)]
        dry_run: bool,
    },

    /// In-process directory (not persistent)
    Memory,
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare { api_token, .. } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                Ok(())
            }
            ProviderConfig::Memory => Ok(()),
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
            ProviderConfig::Memory => "memory",
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Cloudflare {
            api_token: String::new(),
            dry_run: false,
        }
    }
}

fn default_create_missing() -> bool {
    true
}
