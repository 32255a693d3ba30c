// # Porkbun DNS Provider
//
// This crate provides a Porkbun DNS provider implementation for the DDNS
// synchronizer.
//
// ## Implementation Status
//
// - ✅ One HTTP request per trait call
// - ✅ Full error propagation to the reconciler (no retry, no backoff)
// - ✅ HTTP timeout configured (30 seconds by default)
// - ✅ Specific error messages for HTTP status codes (400, 401/403, 404, 429, 5xx)
// - ✅ Dry-run mode for safe testing
// - ✅ Apex records via the `@` hostname
// - ❌ NO record types other than A
// - ❌ NO caching (every pass reads fresh state)
//
// ## Security Requirements
//
// - API and secret keys NEVER appear in logs or error messages
// - Keys travel in the JSON body of every request, never in the URL
// - Provider MUST fail fast if either key is empty
//
// ## API Reference
//
// - Porkbun API v3: https://porkbun.com/api/json/v3/documentation
// - Retrieve: POST `/dns/retrieveByNameType/:domain/:type/:subdomain`
// - Create:   POST `/dns/create/:domain`
// - Edit:     POST `/dns/edit/:domain/:id`

use async_trait::async_trait;
use ddns_core::config::{subdomain_for, ProviderConfig};
use ddns_core::traits::{AddressRecord, DnsProvider, ProviderResponse, ADDRESS_RECORD_TYPE};
use ddns_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider name used in errors and logs
const PROVIDER_NAME: &str = "porkbun";

/// Status reported for writes skipped in dry-run mode
pub const DRY_RUN_STATUS: &str = "DRY-RUN";

/// Credentials embedded in every request body
#[derive(Serialize)]
struct AuthBody<'a> {
    apikey: &'a str,
    secretapikey: &'a str,
}

/// Body of create and edit requests
#[derive(Serialize)]
struct RecordBody<'a> {
    #[serde(flatten)]
    auth: AuthBody<'a>,
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: String,
}

/// Response of the retrieve endpoint
#[derive(Debug, Deserialize)]
struct RetrieveResponse {
    #[serde(default)]
    records: Vec<AddressRecord>,
}

/// Error payload Porkbun returns alongside non-success statuses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// Porkbun DNS provider
///
/// Stateless: every call is a single POST against the configured API base.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform retrieve requests
/// - Log the intended create/edit request
/// - **NOT** actually modify DNS records
pub struct PorkbunProvider {
    /// Porkbun API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Porkbun secret API key
    /// ⚠️ NEVER log this value
    secret_api_key: String,

    /// API base URL without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform reads but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides both keys
impl std::fmt::Debug for PorkbunProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PorkbunProvider")
            .field("api_key", &"<REDACTED>")
            .field("secret_api_key", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl PorkbunProvider {
    /// Create a new Porkbun provider
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration does not validate or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        if config.dry_run {
            tracing::warn!("Porkbun provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            api_key: config.api_key.clone(),
            secret_api_key: config.secret_api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
            dry_run: config.dry_run,
        })
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn auth(&self) -> AuthBody<'_> {
        AuthBody {
            apikey: &self.api_key,
            secretapikey: &self.secret_api_key,
        }
    }

    fn record_body<'a>(&'a self, hostname: &'a str, content: &'a str, ttl: u32) -> RecordBody<'a> {
        RecordBody {
            auth: self.auth(),
            record_type: ADDRESS_RECORD_TYPE,
            name: subdomain_for(hostname),
            content,
            ttl: ttl.to_string(),
        }
    }

    /// POST `body` to `path` and decode the JSON response
    ///
    /// `action` names the operation in error messages.
    async fn post<B, T>(&self, path: &str, body: &B, action: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.api_base, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                Error::provider(PROVIDER_NAME, format!("{}: HTTP request failed: {}", action, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(status_error(status, &error_text, action));
        }

        response.json::<T>().await.map_err(|e| {
            Error::provider(
                PROVIDER_NAME,
                format!("{}: Failed to parse response: {}", action, e),
            )
        })
    }
}

/// Map a non-success HTTP status to a provider error
fn status_error(status: reqwest::StatusCode, body: &str, action: &str) -> Error {
    // Porkbun explains most failures in a JSON `message`.
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.to_string());

    let message = match status.as_u16() {
        401 | 403 => format!(
            "{}: Authentication failed: Invalid API keys or API access not enabled for the domain. Status: {}",
            action, status
        ),
        404 => format!("{}: Not found: {} - {}", action, status, detail),
        429 => format!(
            "{}: Rate limit exceeded. Please retry later. Status: {}",
            action, status
        ),
        500..=599 => format!(
            "{}: Porkbun server error (transient): {} - {}",
            action, status, detail
        ),
        _ => format!("{}: {} - {}", action, status, detail),
    };

    Error::provider(PROVIDER_NAME, message)
}

fn require(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_input(format!("{} cannot be empty", what)));
    }
    Ok(())
}

#[async_trait]
impl DnsProvider for PorkbunProvider {
    /// Retrieve the A record for a hostname
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /dns/retrieveByNameType/example.com/A/home
    /// { "apikey": "...", "secretapikey": "..." }
    /// ```
    async fn retrieve_record(&self, domain: &str, hostname: &str) -> Result<Option<AddressRecord>> {
        require(domain, "Domain")?;

        let path = format!(
            "/dns/retrieveByNameType/{}/{}/{}",
            domain,
            ADDRESS_RECORD_TYPE,
            subdomain_for(hostname)
        );
        tracing::debug!("Retrieving A record: {} ({})", hostname, domain);

        let response: RetrieveResponse = self.post(&path, &self.auth(), "Retrieve record").await?;

        tracing::info!("Successfully retrieved DNS record for {}.{}", hostname, domain);
        Ok(response.records.into_iter().next())
    }

    /// Create an A record
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /dns/create/example.com
    /// { "apikey": "...", "secretapikey": "...", "type": "A",
    ///   "name": "home", "content": "203.0.113.5", "ttl": "300" }
    /// ```
    async fn create_record(
        &self,
        domain: &str,
        hostname: &str,
        content: &str,
        ttl: u32,
    ) -> Result<ProviderResponse> {
        require(domain, "Domain")?;
        require(content, "Record content")?;

        let path = format!("/dns/create/{}", domain);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST {} creating {} -> {} (ttl {})",
                path,
                hostname,
                content,
                ttl
            );
            return Ok(ProviderResponse::with_status(DRY_RUN_STATUS));
        }

        let body = self.record_body(hostname, content, ttl);
        let response: ProviderResponse = self.post(&path, &body, "Create record").await?;

        tracing::info!("Successfully created DNS record for {}.{}", hostname, domain);
        Ok(response)
    }

    /// Edit an existing A record by id
    ///
    /// # API Call
    ///
    /// ```http
    /// POST /dns/edit/example.com/106926659
    /// { "apikey": "...", "secretapikey": "...", "type": "A",
    ///   "name": "home", "content": "203.0.113.5", "ttl": "300" }
    /// ```
    async fn edit_record(
        &self,
        domain: &str,
        record_id: &str,
        hostname: &str,
        content: &str,
        ttl: u32,
    ) -> Result<ProviderResponse> {
        require(domain, "Domain")?;
        require(record_id, "Record id")?;
        require(content, "Record content")?;

        let path = format!("/dns/edit/{}/{}", domain, record_id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send POST {} setting {} -> {} (ttl {})",
                path,
                hostname,
                content,
                ttl
            );
            return Ok(ProviderResponse::with_status(DRY_RUN_STATUS));
        }

        let body = self.record_body(hostname, content, ttl);
        let response: ProviderResponse = self.post(&path, &body, "Edit record").await?;

        tracing::info!("Successfully edited DNS record for {}.{}", hostname, domain);
        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
