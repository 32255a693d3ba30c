// # ddns-sync - Porkbun dynamic DNS synchronizer
//
// This binary is a THIN integration layer: all reconciliation logic lives in
// ddns-core. It is meant to be run periodically (cron, systemd timer); each
// invocation performs exactly one pass and exits.
//
// The binary is responsible for:
// 1. Reading configuration from environment variables (and an optional .env)
// 2. Initializing logging
// 3. Building the IP source and provider
// 4. Running one reconciliation pass and mapping the result to an exit code
//
// ## Configuration
//
// ### Provider
// - `DNS_PORKBUN_KEY`: Porkbun API key (required)
// - `DNS_PORKBUN_SECRET`: Porkbun secret API key (required)
// - `DNS_PORKBUN_API_BASE`: API base URL (optional)
// - `DNS_HTTP_TIMEOUT_SECS`: Provider request timeout (optional, default 30)
// - `DNS_MODE`: Set to `dry-run` to log writes instead of sending them
//
// ### Records
// - `DNS_DOMAIN`: Base domain (required)
// - `DNS_RECORDS`: Comma-separated hostname labels, `@` for the bare domain (required)
// - `DNS_TTL`: TTL in seconds (optional, default 300)
//
// ### IP Source
// - `DNS_IP_ECHO_URL`: Plain-text address echo URL (optional, default https://v4.ident.me/)
//
// ### Logging
// - `DNS_LOG_LEVEL`: trace, debug, info, warn, error (optional, default info)
//
// ## Example
//
// ```bash
// export DNS_PORKBUN_KEY=pk1_...
// export DNS_PORKBUN_SECRET=sk1_...
// export DNS_DOMAIN=example.com
// export DNS_RECORDS=home,vpn,@
//
// ddns-sync
// ```

use anyhow::{Context, Result};
use ddns_core::config::{IpSourceConfig, ProviderConfig, SyncConfig, APEX_HOSTNAME};
use ddns_core::Reconciler;
use ddns_ip_http::HttpIpSource;
use ddns_provider_porkbun::PorkbunProvider;
use std::env;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Pass completed
/// - 1: Configuration or startup error
/// - 2: Runtime error (an external call failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncExitCode {
    /// Every hostname reached a terminal state
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (IP lookup or provider call failed)
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    sync: SyncConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values (e.g. `DNS_TTL=` in a .env template) count as unset.
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| -> Result<String> {
            optional(key)
                .with_context(|| format!("{} is required. Set it via: export {}=...", key, key))
        };

        let api_key = required("DNS_PORKBUN_KEY")?;
        let secret_api_key = required("DNS_PORKBUN_SECRET")?;
        let domain = required("DNS_DOMAIN")?.trim().to_string();
        let hostnames = parse_hostnames(&required("DNS_RECORDS")?);

        let mut provider = ProviderConfig::new(api_key, secret_api_key).with_dry_run(
            optional("DNS_MODE")
                .unwrap_or_default()
                .eq_ignore_ascii_case("dry-run"),
        );
        if let Some(api_base) = optional("DNS_PORKBUN_API_BASE") {
            provider = provider.with_api_base(api_base);
        }
        if let Some(timeout) = optional("DNS_HTTP_TIMEOUT_SECS") {
            provider = provider.with_timeout_secs(parse_number("DNS_HTTP_TIMEOUT_SECS", &timeout)?);
        }

        let mut sync = SyncConfig::new(provider, domain, hostnames);
        if let Some(ttl) = optional("DNS_TTL") {
            sync = sync.with_ttl(parse_number("DNS_TTL", &ttl)?);
        }
        if let Some(url) = optional("DNS_IP_ECHO_URL") {
            sync = sync.with_ip_source(IpSourceConfig::new(url));
        }

        Ok(Self {
            sync,
            log_level: optional("DNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// This performs:
    /// - Structural validation of the sync configuration
    /// - Domain and hostname label validation
    /// - Log level enumeration validation
    fn validate(&self) -> Result<()> {
        self.sync.validate()?;

        validate_domain_name(&self.sync.domain)?;
        for hostname in &self.sync.hostnames {
            if hostname != APEX_HOSTNAME {
                validate_domain_name(hostname)
                    .with_context(|| format!("Invalid entry in DNS_RECORDS: '{}'", hostname))?;
            }
        }

        if self.sync.provider.dry_run {
            eprintln!("NOTE: DNS_MODE=dry-run, no DNS records will be modified.");
        }

        self.level()?;
        Ok(())
    }

    /// Parse the configured log level
    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

/// Split `DNS_RECORDS` into hostnames
///
/// Entries are trimmed; empty entries are dropped; order and duplicates are kept.
fn parse_hostnames(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("{} must be a positive integer. Got '{}': {}", key, raw, e))
}

/// Validate that a string is a valid domain name or hostname label sequence
///
/// Basic RFC 1035 checks; underscores are accepted since providers allow them.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("Domain name cannot be empty");
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for label in domain.split('.') {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric, hyphen and underscore only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}

/// Accept a missing .env file, reject an unreadable or malformed one
fn check_env_file<T>(loaded: dotenvy::Result<T>) -> Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(anyhow::Error::new(e).context("Failed to load .env file")),
    }
}

fn main() -> ExitCode {
    if let Err(e) = check_env_file(dotenvy::dotenv()) {
        eprintln!("Configuration error: {:#}", e);
        return SyncExitCode::ConfigError.into();
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return SyncExitCode::ConfigError.into();
    }

    let log_level = config.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    info!(
        "Starting ddns-sync: {} hostname(s) under {}",
        config.sync.hostnames.len(),
        config.sync.domain
    );

    // Passes are strictly sequential; a single-threaded runtime is enough.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    rt.block_on(run(config.sync)).into()
}

/// Build the components and run one pass
async fn run(sync: SyncConfig) -> SyncExitCode {
    let reconciler = match build_reconciler(sync) {
        Ok(reconciler) => reconciler,
        Err(e) => {
            error!("Startup error: {}", e);
            return SyncExitCode::ConfigError;
        }
    };

    match reconciler.reconcile().await {
        Ok(report) => {
            info!(
                "Reconciliation complete: {} hostname(s), {} write(s)",
                report.outcomes.len(),
                report.writes()
            );
            SyncExitCode::Success
        }
        Err(e) => {
            error!("Reconciliation aborted: {}", e);
            SyncExitCode::RuntimeError
        }
    }
}

fn build_reconciler(sync: SyncConfig) -> ddns_core::Result<Reconciler> {
    let ip_source = HttpIpSource::from_config(&sync.ip_source)?;
    let provider = PorkbunProvider::from_config(&sync.provider)?;
    Reconciler::new(Box::new(ip_source), Box::new(provider), sync)
}
