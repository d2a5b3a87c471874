//! Daemon configuration from environment variables

use anyhow::{Context, Result};
use dyndns_core::config::validate_domain_name;
use dyndns_core::{AllowListOrder, ProviderConfig, UpdateConfig};
use std::env;
use std::net::{IpAddr, SocketAddr};
use tracing::Level;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Daemon configuration
///
/// Built with [`Config::from_env`], checked with [`Config::validate`], then
/// turned into the core's [`UpdateConfig`] and [`ProviderConfig`].
#[derive(Clone)]
pub struct Config {
    pub listen_addr: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub provider_type: String,
    pub api_token: String,
    pub zone: String,
    pub zone_id: Option<String>,
    pub allowed_hostnames: Vec<String>,
    pub allow_list_order: String,
    pub create_missing: bool,
    pub dry_run: bool,
    pub log_level: String,
}

// Secrets stay out of Debug output
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("provider_type", &self.provider_type)
            .field("api_token", &"<REDACTED>")
            .field("zone", &self.zone)
            .field("zone_id", &self.zone_id)
            .field("allowed_hostnames", &self.allowed_hostnames)
            .field("allow_list_order", &self.allow_list_order)
            .field("create_missing", &self.create_missing)
            .field("dry_run", &self.dry_run)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Each `DDNS_*` variable wins over its legacy fallback name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |primary: &str, fallback: Option<&str>| {
            lookup(primary)
                .or_else(|| fallback.and_then(&lookup))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("DDNS_PORT", Some("PORT")) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("DDNS_PORT must be a port number. Got: {}", raw))?,
            None => DEFAULT_PORT,
        };

        let create_missing = match var("DDNS_CREATE_MISSING", None) {
            Some(raw) => parse_bool(&raw).with_context(|| {
                format!("DDNS_CREATE_MISSING must be true or false. Got: {}", raw)
            })?,
            None => true,
        };

        let dry_run = match var("DDNS_MODE", None) {
            Some(mode) => match mode.to_lowercase().as_str() {
                "dry-run" => true,
                "live" => false,
                _ => anyhow::bail!(
                    "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                    mode
                ),
            },
            None => false,
        };

        Ok(Self {
            listen_addr: var("DDNS_LISTEN_ADDR", None)
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            port,
            username: var("DDNS_USERNAME", None).unwrap_or_default(),
            password: var("DDNS_PASSWORD", None).unwrap_or_default(),
            provider_type: var("DDNS_PROVIDER_TYPE", None)
                .unwrap_or_else(|| "cloudflare".to_string())
                .to_lowercase(),
            api_token: var("DDNS_PROVIDER_API_TOKEN", Some("CLOUDFLARE_API_KEY"))
                .unwrap_or_default(),
            zone: var("DDNS_ZONE", Some("CLOUDFLARE_ZONE")).unwrap_or_default(),
            zone_id: var("DDNS_ZONE_ID", None),
            allowed_hostnames: var("DDNS_ALLOWED_HOSTNAMES", Some("ALLOWED_HOSTNAMES"))
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            allow_list_order: var("DDNS_ALLOW_LIST_ORDER", None)
                .unwrap_or_else(|| "after-validation".to_string()),
            create_missing,
            dry_run,
            log_level: var("DDNS_LOG_LEVEL", None).unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Checks required fields, rejects placeholder credentials, and runs the
    /// core's own validation on the derived configs.
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() || self.password.is_empty() {
            anyhow::bail!(
                "DDNS_USERNAME and DDNS_PASSWORD are required. \
                Set them via: export DDNS_USERNAME=... DDNS_PASSWORD=..."
            );
        }

        if is_placeholder(&self.username) || is_placeholder(&self.password) {
            anyhow::bail!(
                "DDNS_USERNAME/DDNS_PASSWORD appear to be placeholders. \
                Choose real credentials for the update endpoint."
            );
        }

        if self.zone.is_empty() {
            anyhow::bail!(
                "DDNS_ZONE is required. Set it via: export DDNS_ZONE=example.com"
            );
        }
        validate_domain_name(&self.zone).context("DDNS_ZONE is not a valid domain name")?;

        match self.provider_type.as_str() {
            "cloudflare" => {
                if self.api_token.is_empty() {
                    anyhow::bail!(
                        "DDNS_PROVIDER_API_TOKEN is required for the cloudflare provider. \
                        Set it via: export DDNS_PROVIDER_API_TOKEN=your_token"
                    );
                }

                let token_lower = self.api_token.to_lowercase();
                if token_lower.contains("your_token")
                    || token_lower.contains("your_cloudflare_api_key")
                    || token_lower.contains("replace_me")
                    || token_lower == "token"
                {
                    anyhow::bail!(
                        "DDNS_PROVIDER_API_TOKEN appears to be a placeholder. \
                        Use an actual API token from Cloudflare."
                    );
                }
            }
            "memory" => {}
            _ => anyhow::bail!(
                "DDNS_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: cloudflare, memory",
                self.provider_type
            ),
        }

        self.socket_addr()?;
        self.update_config()?.validate()?;
        self.provider_config().validate()?;
        self.tracing_level()?;

        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.listen_addr.parse().with_context(|| {
            format!("DDNS_LISTEN_ADDR must be an IP address. Got: {}", self.listen_addr)
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Core update configuration
    pub fn update_config(&self) -> Result<UpdateConfig> {
        let order: AllowListOrder = self.allow_list_order.parse()?;

        let mut config = UpdateConfig::new(&self.zone)
            .with_allowed_hostnames(self.allowed_hostnames.iter().cloned())
            .with_allow_list_order(order)
            .with_create_missing(self.create_missing);
        if let Some(zone_id) = &self.zone_id {
            config = config.with_zone_id(zone_id);
        }
        Ok(config)
    }

    /// Directory configuration
    pub fn provider_config(&self) -> ProviderConfig {
        match self.provider_type.as_str() {
            "memory" => ProviderConfig::Memory,
            _ => ProviderConfig::Cloudflare {
                api_token: self.api_token.clone(),
                dry_run: self.dry_run,
            },
        }
    }

    /// Maximum tracing level
    pub fn tracing_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn is_placeholder(value: &str) -> bool {
    let lower = value.to_lowercase();
    matches!(
        lower.as_str(),
        "your_username" | "your_password" | "username" | "password" | "changeme"
    ) || lower.contains("replace_me")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DDNS_USERNAME", "router"),
            ("DDNS_PASSWORD", "s3cret-pass"),
            ("DDNS_PROVIDER_API_TOKEN", "abcdefghijklmnopqrstuvwxyz0123456789ABCD"),
            ("DDNS_ZONE", "example.com"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&base()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
        assert_eq!(config.provider_type, "cloudflare");
        assert!(config.create_missing);
        assert!(!config.dry_run);
        assert_eq!(config.tracing_level().unwrap(), Level::INFO);

        let update = config.update_config().unwrap();
        assert_eq!(update.allow_list_order, AllowListOrder::AfterAddressValidation);
        assert!(update.allowed_hostnames.is_empty());
    }

    #[test]
    fn test_legacy_fallbacks() {
        let config = config_from(&[
            ("DDNS_USERNAME", "router"),
            ("DDNS_PASSWORD", "s3cret-pass"),
            ("CLOUDFLARE_API_KEY", "abcdefghijklmnopqrstuvwxyz0123456789ABCD"),
            ("CLOUDFLARE_ZONE", "example.com"),
            ("ALLOWED_HOSTNAMES", "home.example.com, nas.example.com"),
            ("PORT", "8080"),
        ])
        .unwrap();
        config.validate().unwrap();

        assert_eq!(config.zone, "example.com");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.allowed_hostnames,
            vec!["home.example.com", "nas.example.com"]
        );
    }

    #[test]
    fn test_primary_wins_over_fallback() {
        let mut vars = base();
        vars.push(("DDNS_PORT", "9000"));
        vars.push(("PORT", "8080"));
        assert_eq!(config_from(&vars).unwrap().port, 9000);
    }

    #[test]
    fn test_placeholder_credentials_rejected() {
        let config = config_from(&[
            ("DDNS_USERNAME", "your_username"),
            ("DDNS_PASSWORD", "your_password"),
            ("DDNS_PROVIDER_API_TOKEN", "abcdefghijklmnopqrstuvwxyz0123456789ABCD"),
            ("DDNS_ZONE", "example.com"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let config = config_from(&[("DDNS_ZONE", "example.com")]).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("DDNS_USERNAME"));
    }

    #[test]
    fn test_cloudflare_requires_token() {
        let config = config_from(&[
            ("DDNS_USERNAME", "router"),
            ("DDNS_PASSWORD", "s3cret-pass"),
            ("DDNS_ZONE", "example.com"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_provider_needs_no_token() {
        let config = config_from(&[
            ("DDNS_USERNAME", "router"),
            ("DDNS_PASSWORD", "s3cret-pass"),
            ("DDNS_ZONE", "example.com"),
            ("DDNS_PROVIDER_TYPE", "memory"),
        ])
        .unwrap();
        config.validate().unwrap();
        assert!(matches!(config.provider_config(), ProviderConfig::Memory));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            ("DDNS_PROVIDER_TYPE", "route53"),
            ("DDNS_ALLOW_LIST_ORDER", "sideways"),
            ("DDNS_LOG_LEVEL", "loud"),
            ("DDNS_LISTEN_ADDR", "localhost"),
            ("DDNS_ALLOWED_HOSTNAMES", "bad_host!.example.com"),
        ] {
            let mut vars = base();
            vars.push((key, value));
            let config = config_from(&vars).unwrap();
            assert!(config.validate().is_err(), "{}={} should be rejected", key, value);
        }

        let mut vars = base();
        vars.push(("DDNS_PORT", "seventy"));
        assert!(config_from(&vars).is_err());

        let mut vars = base();
        vars.push(("DDNS_MODE", "maybe"));
        assert!(config_from(&vars).is_err());
    }

    #[test]
    fn test_behavior_switches() {
        let mut vars = base();
        vars.push(("DDNS_MODE", "dry-run"));
        vars.push(("DDNS_CREATE_MISSING", "false"));
        vars.push(("DDNS_ALLOW_LIST_ORDER", "before-validation"));
        vars.push(("DDNS_ZONE_ID", "zone-123"));
        let config = config_from(&vars).unwrap();
        config.validate().unwrap();

        let update = config.update_config().unwrap();
        assert!(!update.create_missing);
        assert_eq!(update.allow_list_order, AllowListOrder::BeforeAddressValidation);
        assert_eq!(update.zone_id.as_deref(), Some("zone-123"));

        match config.provider_config() {
            ProviderConfig::Cloudflare { dry_run, .. } => assert!(dry_run),
            other => panic!("unexpected provider config: {:?}", other),
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = config_from(&base()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cret-pass"));
        assert!(!debug.contains("abcdefghij"));
    }
}
