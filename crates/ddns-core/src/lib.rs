// # ddns-core
//
// Core library for the Porkbun dynamic DNS synchronizer.
//
// ## Architecture Overview
//
// A run is a single reconciliation pass:
// - **IpSource**: Trait for resolving the current public address
// - **DnsProvider**: Trait for reading and writing A records via a provider API
// - **Reconciler**: Orchestrates resolve → read → (create | edit | nothing)
//
// Implementations live in their own crates (`ddns-ip-http`,
// `ddns-provider-porkbun`) and are injected into the reconciler by the
// `ddns-sync` binary.
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Fail Fast**: The first failed external call aborts the pass
// 3. **Library-First**: The pass can be embedded and tested without a process
// 4. **Idempotency**: A pass with no address change performs reads only

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, AddressRecord, ProviderResponse, ADDRESS_RECORD_TYPE};
pub use engine::{Reconciler, ReconcileReport, HostnameOutcome, Outcome, Plan};
pub use config::{SyncConfig, IpSourceConfig, ProviderConfig};
pub use error::{Error, Result};
