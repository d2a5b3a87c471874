//! Error types for the dyndns update endpoint
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for dyndns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dyndns update endpoint
#[derive(Error, Debug)]
pub enum Error {
    /// Hostname or address list absent or empty
    #[error("Missing hostname or IP address")]
    MissingFields,

    /// Malformed hostname
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No element of the address list matched either address grammar
    #[error("No valid IPv4/IPv6 address in: {0}")]
    NoValidAddress(String),

    /// Hostname rejected by the allow-list
    #[error("Hostname not allowed: {0}")]
    HostnameNotAllowed(String),

    /// Zone could not be resolved to an identifier
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// No A/AAAA record exists for the hostname and creation is disabled
    #[error("Hostname not managed: {0}")]
    HostnameNotManaged(String),

    /// Directory call failed or returned an unsuccessful status
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Directory failure tagged with the step of the update that issued it
    #[error("{stage} failed: {source}")]
    Directory {
        /// Step of the update that failed
        stage: DirectoryStage,
        /// Underlying directory error
        #[source]
        source: Box<Error>,
    },

    /// HTTP transport errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Step of an update request that talks to the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryStage {
    /// Zone name to zone id
    ZoneLookup,
    /// Listing the hostname's records
    Listing,
    /// Executing the reconciliation plan
    Mutation,
}

impl std::fmt::Display for DirectoryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectoryStage::ZoneLookup => write!(f, "zone lookup"),
            DirectoryStage::Listing => write!(f, "record listing"),
            DirectoryStage::Mutation => write!(f, "record mutation"),
        }
    }
}

/// Coarse classification of an [`Error`]
///
/// `Input` and `Policy` errors are always raised from local state before any
/// directory call is made. `Provider` errors may leave the directory partially
/// updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied a missing or malformed field
    Input,
    /// Caller is not permitted to act on the hostname
    Policy,
    /// Zone or hostname record is absent
    NotFound,
    /// Directory call failed
    Provider,
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a "no valid address" error for the raw list
    pub fn no_valid_address(raw: impl Into<String>) -> Self {
        Self::NoValidAddress(raw.into())
    }

    /// Create an allow-list rejection
    pub fn hostname_not_allowed(hostname: impl Into<String>) -> Self {
        Self::HostnameNotAllowed(hostname.into())
    }

    /// Create a zone lookup failure
    pub fn zone_not_found(zone: impl Into<String>) -> Self {
        Self::ZoneNotFound(zone.into())
    }

    /// Create a "hostname not managed" error
    pub fn hostname_not_managed(hostname: impl Into<String>) -> Self {
        Self::HostnameNotManaged(hostname.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Tag a directory error with the stage that issued it
    ///
    /// `ZoneNotFound` is passed through untouched.
    pub fn at_stage(self, stage: DirectoryStage) -> Self {
        match self {
            Error::ZoneNotFound(_) | Error::Directory { .. } => self,
            other => Self::Directory {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage of a directory failure, if this is one
    pub fn stage(&self) -> Option<DirectoryStage> {
        match self {
            Error::Directory { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingFields | Error::InvalidInput(_) | Error::NoValidAddress(_) => {
                ErrorKind::Input
            }
            Error::HostnameNotAllowed(_) => ErrorKind::Policy,
            Error::ZoneNotFound(_) | Error::HostnameNotManaged(_) => ErrorKind::NotFound,
            Error::Directory { source, .. } => source.kind(),
            Error::Provider { .. } | Error::Http(_) | Error::Config(_) => ErrorKind::Provider,
        }
    }
}
