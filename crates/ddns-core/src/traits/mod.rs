//! Core traits for the DDNS synchronizer
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Resolve the current public address
//! - [`DnsProvider`]: Read, create and edit A records via a provider API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{AddressRecord, DnsProvider, ProviderResponse, ADDRESS_RECORD_TYPE};
