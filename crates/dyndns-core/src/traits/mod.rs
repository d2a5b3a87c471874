//! Core traits for the dyndns update endpoint
//!
//! - [`DnsDirectory`]: Read and mutate a provider's address records

pub mod dns_directory;

pub use dns_directory::{DnsDirectory, DnsRecord, RecordType};
