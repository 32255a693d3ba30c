//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles record every call so tests can assert on exactly which
//! provider operations a pass issued.

#![allow(dead_code)]

use ddns_core::config::{ProviderConfig, SyncConfig};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{AddressRecord, DnsProvider, IpSource, ProviderResponse};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that returns a fixed address (or fails)
pub struct FixedIpSource {
    address: Option<String>,
    call_count: Arc<AtomicUsize>,
}

impl FixedIpSource {
    pub fn new(address: &str) -> Self {
        Self {
            address: Some(address.to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose every call fails like an unreachable echo service
    pub fn failing() -> Self {
        Self {
            address: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times current() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new FixedIpSource that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            address: other.address.clone(),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.address
            .clone()
            .ok_or_else(|| Error::ip_source("Request failed: connection refused"))
    }

    fn source_name(&self) -> &'static str {
        "fixed"
    }
}

/// A provider call as observed by [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Retrieve {
        domain: String,
        hostname: String,
    },
    Create {
        domain: String,
        hostname: String,
        content: String,
        ttl: u32,
    },
    Edit {
        domain: String,
        record_id: String,
        hostname: String,
        content: String,
        ttl: u32,
    },
}

/// Which operation a [`MockDnsProvider`] should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOn {
    Retrieve,
    Create,
    Edit,
}

#[derive(Default)]
struct ProviderState {
    /// Records keyed by hostname
    records: HashMap<String, AddressRecord>,
    /// Hostname/operation pairs that fail
    failures: HashSet<(String, FailOn)>,
    /// Every call in order
    calls: Vec<ProviderCall>,
    next_id: u64,
}

/// An in-memory provider that behaves like a tiny DNS zone
///
/// Creates and edits are applied to the zone, so a second pass observes the
/// effects of the first.
#[derive(Clone)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState {
                next_id: 1000,
                ..Default::default()
            })),
        }
    }

    /// Seed an existing A record for `hostname`
    pub fn with_record(self, hostname: &str, id: &str, content: &str) -> Self {
        self.state.lock().unwrap().records.insert(
            hostname.to_string(),
            AddressRecord {
                id: id.to_string(),
                name: hostname.to_string(),
                record_type: "A".to_string(),
                content: content.to_string(),
                ttl: Some("300".to_string()),
            },
        );
        self
    }

    /// Make `operation` fail for `hostname`
    pub fn failing_on(self, hostname: &str, operation: FailOn) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((hostname.to_string(), operation));
        self
    }

    /// Every call in the order it was made
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Only the create/edit calls
    pub fn write_calls(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, ProviderCall::Retrieve { .. }))
            .collect()
    }

    /// Hostnames that were read, in order
    pub fn retrieved_hostnames(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ProviderCall::Retrieve { hostname, .. } => Some(hostname),
                _ => None,
            })
            .collect()
    }

    /// Current content stored for `hostname`
    pub fn content_of(&self, hostname: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .records
            .get(hostname)
            .map(|r| r.content.clone())
    }

    fn check_failure(state: &ProviderState, hostname: &str, operation: FailOn) -> Result<()> {
        if state.failures.contains(&(hostname.to_string(), operation)) {
            return Err(Error::provider("mock", "HTTP 500 Internal Server Error"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn retrieve_record(&self, domain: &str, hostname: &str) -> Result<Option<AddressRecord>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Retrieve {
            domain: domain.to_string(),
            hostname: hostname.to_string(),
        });
        Self::check_failure(&state, hostname, FailOn::Retrieve)?;
        Ok(state.records.get(hostname).cloned())
    }

    async fn create_record(
        &self,
        domain: &str,
        hostname: &str,
        content: &str,
        ttl: u32,
    ) -> Result<ProviderResponse> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Create {
            domain: domain.to_string(),
            hostname: hostname.to_string(),
            content: content.to_string(),
            ttl,
        });
        Self::check_failure(&state, hostname, FailOn::Create)?;

        state.next_id += 1;
        let id = state.next_id.to_string();
        state.records.insert(
            hostname.to_string(),
            AddressRecord {
                id: id.clone(),
                name: hostname.to_string(),
                record_type: "A".to_string(),
                content: content.to_string(),
                ttl: Some(ttl.to_string()),
            },
        );

        let mut response = ProviderResponse::with_status("SUCCESS");
        response.extra.insert("id".to_string(), serde_json::json!(id));
        Ok(response)
    }

    async fn edit_record(
        &self,
        domain: &str,
        record_id: &str,
        hostname: &str,
        content: &str,
        ttl: u32,
    ) -> Result<ProviderResponse> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ProviderCall::Edit {
            domain: domain.to_string(),
            record_id: record_id.to_string(),
            hostname: hostname.to_string(),
            content: content.to_string(),
            ttl,
        });
        Self::check_failure(&state, hostname, FailOn::Edit)?;

        if let Some(record) = state.records.get_mut(hostname) {
            record.content = content.to_string();
            record.ttl = Some(ttl.to_string());
        }
        Ok(ProviderResponse::with_status("SUCCESS"))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal SyncConfig for testing
pub fn minimal_config(hostnames: &[&str]) -> SyncConfig {
    SyncConfig::new(
        ProviderConfig::new("pk1_test", "sk1_test"),
        "example.com",
        hostnames.iter().map(|h| h.to_string()).collect(),
    )
}
