// # HTTP IP Source
//
// This crate provides the public-address lookup for the DDNS synchronizer.
//
// ## Architecture
//
// Issues one unauthenticated GET per call to a plain-text echo service
// (default: https://v4.ident.me/) and returns the body as the address.
// The body is treated as an opaque string: it is trimmed but not parsed,
// so whatever the echo service reports is what gets written to DNS.

use ddns_core::config::IpSourceConfig;
use ddns_core::traits::IpSource;
use ddns_core::{Error, Result};

use std::time::Duration;

/// HTTP-based IP source
///
/// The response body is trimmed of surrounding whitespace. An empty body is
/// rejected as an IP source error.
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: Echo URL returning the caller's address as plain text
    /// - `timeout`: Per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create an IP source from configuration
    pub fn from_config(config: &IpSourceConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs))
    }

    /// The echo URL this source queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<String> {
        tracing::debug!("Fetching public address from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        let address = body.trim();
        if address.is_empty() {
            return Err(Error::ip_source("Echo service returned an empty body"));
        }

        Ok(address.to_string())
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
