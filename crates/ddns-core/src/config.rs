//! Configuration types for the DDNS synchronizer
//!
//! The configuration is built once at startup (see `ddns-sync`) and handed to
//! the [`Reconciler`](crate::engine::Reconciler) by value. Nothing in the core
//! reads the process environment.

use serde::{Deserialize, Serialize};

/// Porkbun JSON API v3 base URL
pub const DEFAULT_API_BASE: &str = "https://api.porkbun.com/api/json/v3";

/// IPv4-only address echo service
pub const DEFAULT_IP_ECHO_URL: &str = "https://v4.ident.me/";

/// Hostname that addresses the bare domain
pub const APEX_HOSTNAME: &str = "@";

/// Main synchronizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Public address lookup configuration
    #[serde(default)]
    pub ip_source: IpSourceConfig,

    /// Base domain (e.g. "example.com")
    pub domain: String,

    /// Hostname labels to reconcile, in order
    ///
    /// Duplicates are kept; each entry is reconciled every time it appears.
    pub hostnames: Vec<String>,

    /// TTL for created and edited records (in seconds)
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl SyncConfig {
    /// Create a new configuration with the default TTL and IP source
    pub fn new(
        provider: ProviderConfig,
        domain: impl Into<String>,
        hostnames: Vec<String>,
    ) -> Self {
        Self {
            provider,
            ip_source: IpSourceConfig::default(),
            domain: domain.into(),
            hostnames,
            ttl: default_ttl(),
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the IP source configuration
    pub fn with_ip_source(mut self, ip_source: IpSourceConfig) -> Self {
        self.ip_source = ip_source;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.trim().is_empty() {
            return Err(crate::Error::config("Domain cannot be empty"));
        }

        if self.hostnames.is_empty() {
            return Err(crate::Error::config("No hostnames configured"));
        }

        if self.hostnames.iter().any(|h| h.trim().is_empty()) {
            return Err(crate::Error::config(
                "Hostnames cannot be empty (use \"@\" for the bare domain)",
            ));
        }

        if self.ttl == 0 {
            return Err(crate::Error::config("TTL must be > 0"));
        }

        self.provider.validate()?;
        self.ip_source.validate()?;

        Ok(())
    }
}

/// Map a configured hostname to the subdomain the provider expects
///
/// `@` selects the bare domain, which Porkbun addresses with an empty name.
pub fn subdomain_for(hostname: &str) -> &str {
    if hostname == APEX_HOSTNAME {
        ""
    } else {
        hostname
    }
}

/// DNS provider configuration
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose either key.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Porkbun API key
    pub api_key: String,

    /// Porkbun secret API key
    pub secret_api_key: String,

    /// API base URL (overridable for testing)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request timeout (in seconds)
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,

    /// Dry-run mode: perform reads but only log writes
    #[serde(default)]
    pub dry_run: bool,
}

impl ProviderConfig {
    /// Create a provider configuration with default endpoint and timeout
    pub fn new(api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
            api_base: default_api_base(),
            timeout_secs: default_provider_timeout_secs(),
            dry_run: false,
        }
    }

    /// Override the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Override the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.is_empty() {
            return Err(crate::Error::config("Porkbun API key cannot be empty"));
        }
        if self.secret_api_key.is_empty() {
            return Err(crate::Error::config("Porkbun secret API key cannot be empty"));
        }
        if !self.api_base.starts_with("https://") && !self.api_base.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Provider API base must use HTTP or HTTPS scheme. Got: {}",
                self.api_base
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Provider timeout must be > 0"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<REDACTED>")
            .field("secret_api_key", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Public address lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpSourceConfig {
    /// Plain-text address echo URL
    #[serde(default = "default_ip_echo_url")]
    pub url: String,

    /// Per-request timeout (in seconds)
    #[serde(default = "default_ip_source_timeout_secs")]
    pub timeout_secs: u64,
}

impl IpSourceConfig {
    /// Create an IP source configuration for the given echo URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_ip_source_timeout_secs(),
        }
    }

    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("IP echo URL cannot be empty"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "IP echo URL must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("IP echo timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_IP_ECHO_URL)
    }
}

fn default_ttl() -> u32 {
    300
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_ip_echo_url() -> String {
    DEFAULT_IP_ECHO_URL.to_string()
}

fn default_provider_timeout_secs() -> u64 {
    30
}

fn default_ip_source_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SyncConfig {
        SyncConfig::new(
            ProviderConfig::new("pk1_test", "sk1_test"),
            "example.com",
            vec!["home".to_string(), "vpn".to_string()],
        )
    }

    #[test]
    fn test_defaults() {
        let config = valid_config();
        assert_eq!(config.ttl, 300);
        assert_eq!(config.ip_source.url, DEFAULT_IP_ECHO_URL);
        assert_eq!(config.provider.api_base, DEFAULT_API_BASE);
        assert_eq!(config.provider.timeout_secs, 30);
        assert!(!config.provider.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: SyncConfig = serde_json::from_value(serde_json::json!({
            "provider": { "api_key": "pk1", "secret_api_key": "sk1" },
            "domain": "example.com",
            "hostnames": ["home", "home"]
        }))
        .unwrap();

        assert_eq!(config.ttl, 300);
        assert_eq!(config.hostnames, vec!["home", "home"]);
        assert_eq!(config.ip_source.timeout_secs, 10);
    }

    #[test]
    fn test_validate_rejects_missing_pieces() {
        let mut config = valid_config();
        config.hostnames.clear();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.domain = " ".to_string();
        assert!(config.validate().is_err());

        let config = valid_config().with_ttl(0);
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.provider.secret_api_key.clear();
        assert!(config.validate().is_err());

        let config = valid_config().with_ip_source(IpSourceConfig::new("ftp://ident.me"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_subdomain_for_apex() {
        assert_eq!(subdomain_for("@"), "");
        assert_eq!(subdomain_for("vpn"), "vpn");
    }

    #[test]
    fn test_keys_not_exposed_in_debug() {
        let provider = ProviderConfig::new("pk1_visible_key", "sk1_secret_value");
        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("pk1_visible_key"));
        assert!(!debug_str.contains("sk1_secret_value"));
        assert!(debug_str.contains("ProviderConfig"));
    }
}
