// # Directory Implementations
//
// Implementations of the DnsDirectory trait that live in the core crate.
// Provider adapters backed by a remote API live in their own crates.

pub mod memory;

pub use memory::{DirectoryCall, DirectoryOperation, MemoryDirectory};
