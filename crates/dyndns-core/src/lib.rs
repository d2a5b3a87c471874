// # dyndns-core
//
// Core library for the dyndns update endpoint.
//
// ## Architecture Overview
//
// A client reports a hostname and a comma-separated list of its current
// addresses. The core turns that report into the minimal set of record
// mutations at the DNS provider:
//
// - **classify**: Picks the first IPv4 and the first IPv6 address of the list
// - **reconcile**: Plans and applies create/update/delete operations
// - **DnsDirectory**: Trait over the provider's record set
// - **UpdateService**: Request-level use case (input checks, allow-list,
//   zone lookup, reconciliation)
// - **MemoryDirectory**: In-process directory for local runs and tests
//
// ## Design Principles
//
// 1. **Provider-agnostic**: The reconciler only sees the DnsDirectory trait
// 2. **Explicit configuration**: No environment or global state in the core
// 3. **Fail-fast**: The first failed directory call ends the request
// 4. **Library-First**: The HTTP daemon is a thin adapter over UpdateService

pub mod classify;
pub mod config;
pub mod directory;
pub mod error;
pub mod reconcile;
pub mod service;
pub mod traits;

// Re-export core types for convenience
pub use classify::{classify, AddressCandidate, AddressFamily, ClassifiedAddresses};
pub use config::{AllowListOrder, ProviderConfig, UpdateConfig};
pub use directory::MemoryDirectory;
pub use error::{DirectoryStage, Error, ErrorKind, Result};
pub use reconcile::{
    apply, reconcile, AppliedOperation, PlannedOperation, ReconcileError, ReconciliationPlan,
};
pub use service::{UpdateOutcome, UpdateService};
pub use traits::{DnsDirectory, DnsRecord, RecordType};
