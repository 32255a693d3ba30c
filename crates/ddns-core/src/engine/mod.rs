//! Reconciliation engine
//!
//! The Reconciler is responsible for:
//! - Resolving the public address once per pass via IpSource
//! - Reading each configured hostname's A record via DnsProvider
//! - Issuing the minimal write (create, edit, or nothing)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  IpSource   │─── address (once) ───┐
//! └─────────────┘                      │
//!                                      ▼
//!                              ┌──────────────┐
//!                              │  Reconciler  │── per hostname ──┐
//!                              └──────────────┘                  │
//!                                                                ▼
//!                                                      ┌──────────────────┐
//!                                                      │   DnsProvider    │
//!                                                      │ retrieve → write │
//!                                                      └──────────────────┘
//! ```
//!
//! ## Per-hostname state machine
//!
//! `Unchecked → (read) → Absent | Matching | Stale → (write) → Created | Unchanged | Updated`
//!
//! The first failed call aborts the whole pass: hostnames after the failing
//! one are not processed and nothing already written is rolled back.

use crate::config::{SyncConfig, APEX_HOSTNAME};
use crate::error::Result;
use crate::traits::{AddressRecord, DnsProvider, IpSource};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// What a hostname needs after its record has been read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// No record exists
    Create,
    /// The record already holds the current address
    Keep,
    /// The record holds a different address
    Edit {
        /// Provider-assigned id of the record to edit
        record_id: String,
        /// Address currently stored
        previous: String,
    },
}

/// Decide what to do with a hostname given its current record
pub fn plan(existing: Option<&AddressRecord>, address: &str) -> Plan {
    match existing {
        None => Plan::Create,
        Some(record) if record.content == address => Plan::Keep,
        Some(record) => Plan::Edit {
            record_id: record.id.clone(),
            previous: record.content.clone(),
        },
    }
}

/// Terminal state of one hostname after a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Record was created (didn't exist before)
    Created {
        /// The stored address
        address: String,
    },
    /// Record already had the correct address (no-op)
    Unchanged {
        /// The current address
        address: String,
    },
    /// Record was edited
    Updated {
        /// The edited record's id
        record_id: String,
        /// The previous address
        previous: String,
        /// The new address
        address: String,
    },
}

impl Outcome {
    /// Short label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Created { .. } => "created",
            Outcome::Unchanged { .. } => "unchanged",
            Outcome::Updated { .. } => "updated",
        }
    }

    /// Whether this outcome required a provider write
    pub fn wrote(&self) -> bool {
        !matches!(self, Outcome::Unchanged { .. })
    }
}

/// Outcome for one configured hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostnameOutcome {
    /// The hostname as configured
    pub hostname: String,
    /// What happened to it
    pub outcome: Outcome,
}

/// Summary of a completed pass
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    /// Address resolved at the start of the pass
    pub address: String,
    /// When the pass started
    pub started_at: DateTime<Utc>,
    /// Per-hostname outcomes in configuration order
    pub outcomes: Vec<HostnameOutcome>,
}

impl ReconcileReport {
    /// Number of provider writes issued during the pass
    pub fn writes(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.wrote()).count()
    }
}

/// Single-pass reconciler
///
/// Holds the injected IP source and provider plus the immutable
/// configuration for the run.
///
/// ## Lifecycle
///
/// 1. Create with [`Reconciler::new()`]
/// 2. Call [`Reconciler::reconcile()`] once per scheduled invocation
pub struct Reconciler {
    /// Public address source
    ip_source: Box<dyn IpSource>,

    /// DNS provider for reading and writing records
    provider: Box<dyn DnsProvider>,

    /// Run configuration
    config: SyncConfig,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)`: If the configuration does not validate
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            config,
        })
    }

    /// Run one reconciliation pass
    ///
    /// # Returns
    ///
    /// - `Ok(ReconcileReport)`: Every hostname reached a terminal state
    /// - `Err(Error)`: The first failed external call; later hostnames were skipped
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let started_at = Utc::now();

        let address = self.ip_source.current().await?;
        info!(
            "Resolved public address {} via {}",
            address,
            self.ip_source.source_name()
        );

        let mut outcomes = Vec::with_capacity(self.config.hostnames.len());
        for hostname in &self.config.hostnames {
            let outcome = self.reconcile_hostname(hostname, &address).await?;
            outcomes.push(HostnameOutcome {
                hostname: hostname.clone(),
                outcome,
            });
        }

        let report = ReconcileReport {
            address,
            started_at,
            outcomes,
        };
        debug!(
            "Pass finished: {} hostname(s), {} write(s), {}ms",
            report.outcomes.len(),
            report.writes(),
            (Utc::now() - report.started_at).num_milliseconds()
        );

        Ok(report)
    }

    /// Bring one hostname's A record in line with `address`
    async fn reconcile_hostname(&self, hostname: &str, address: &str) -> Result<Outcome> {
        let domain = &self.config.domain;
        let fqdn = fqdn(hostname, domain);

        let existing = self.provider.retrieve_record(domain, hostname).await?;
        debug!(
            "Retrieved A record for {} from {}: {:?}",
            fqdn,
            self.provider.provider_name(),
            existing
        );

        let outcome = match plan(existing.as_ref(), address) {
            Plan::Create => {
                info!(
                    "{} - no A record found, creating via {}",
                    fqdn,
                    self.provider.provider_name()
                );
                let response = self
                    .provider
                    .create_record(domain, hostname, address, self.config.ttl)
                    .await?;
                debug!("{} create response: {}", fqdn, response);
                Outcome::Created {
                    address: address.to_string(),
                }
            }
            Plan::Keep => Outcome::Unchanged {
                address: address.to_string(),
            },
            Plan::Edit { record_id, previous } => {
                info!(
                    "{} - address changed from {}, editing record {} via {}",
                    fqdn,
                    previous,
                    record_id,
                    self.provider.provider_name()
                );
                let response = self
                    .provider
                    .edit_record(domain, &record_id, hostname, address, self.config.ttl)
                    .await?;
                debug!("{} edit response: {}", fqdn, response);
                Outcome::Updated {
                    record_id,
                    previous,
                    address: address.to_string(),
                }
            }
        };

        info!("{} - {} ({})", fqdn, outcome.label(), address);
        Ok(outcome)
    }
}

/// Fully qualified name for a configured hostname
pub fn fqdn(hostname: &str, domain: &str) -> String {
    if hostname == APEX_HOSTNAME {
        domain.to_string()
    } else {
        format!("{}.{}", hostname, domain)
    }
}
