// # DNS Provider Trait
//
// Defines the interface for reading and writing A records via provider APIs.
//
// ## Implementations
//
// - Porkbun: `ddns-provider-porkbun` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     match provider.retrieve_record("example.com", "home").await? {
//         Some(record) => {
//             provider
//                 .edit_record("example.com", &record.id, "home", "203.0.113.5", 300)
//                 .await?;
//         }
//         None => {
//             provider
//                 .create_record("example.com", "home", "203.0.113.5", 300)
//                 .await?;
//         }
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// The only record type this system reads or writes
pub const ADDRESS_RECORD_TYPE: &str = "A";

/// An A record as stored by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Provider-assigned record identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Fully qualified record name
    #[serde(default)]
    pub name: String,

    /// Record type (always "A" for records returned to the reconciler)
    #[serde(rename = "type", default = "default_record_type")]
    pub record_type: String,

    /// Current record content (an address string)
    pub content: String,

    /// Time-to-live as reported by the provider
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub ttl: Option<String>,
}

fn default_record_type() -> String {
    ADDRESS_RECORD_TYPE.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

// Porkbun returns ids and ttls as strings; accept numbers as well.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(String::from))
}

/// Parsed payload of a successful create or edit call
///
/// The provider's `status` is surfaced; everything else (e.g. the id of a
/// newly created record) is preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Provider status string (e.g. "SUCCESS")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Remaining fields of the payload
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProviderResponse {
    /// Build a response carrying only a status
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            extra: serde_json::Map::new(),
        }
    }
}

impl std::fmt::Display for ProviderResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

/// Trait for DNS provider implementations
///
/// Providers expose record-level primitives. Whether a write is needed is
/// decided by the [`Reconciler`](crate::engine::Reconciler), never here.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS API calls to their endpoints only
/// - ✅ Parse provider-specific responses
/// - ✅ Return success or failure
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic or backoff
/// - ❌ Decide whether an update is needed (owned by `Reconciler`)
/// - ❌ Cache state beyond a single request
/// - ❌ Read or write record types other than [`ADDRESS_RECORD_TYPE`]
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up the A record for `hostname` under `domain`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: The first matching record
    /// - `Ok(None)`: The provider answered successfully with no records
    /// - `Err(Error)`: Transport failure or non-success status
    async fn retrieve_record(
        &self,
        domain: &str,
        hostname: &str,
    ) -> Result<Option<AddressRecord>, crate::Error>;

    /// Create an A record
    ///
    /// # Parameters
    ///
    /// - `domain`: The base domain
    /// - `hostname`: The hostname label (`@` for the bare domain)
    /// - `content`: The address to store
    /// - `ttl`: Time-to-live in seconds
    async fn create_record(
        &self,
        domain: &str,
        hostname: &str,
        content: &str,
        ttl: u32,
    ) -> Result<ProviderResponse, crate::Error>;

    /// Replace the content of an existing A record
    ///
    /// # Parameters
    ///
    /// - `domain`: The base domain
    /// - `record_id`: Provider-assigned id from [`retrieve_record`](Self::retrieve_record)
    /// - `hostname`: The hostname label (`@` for the bare domain)
    /// - `content`: The new address
    /// - `ttl`: Time-to-live in seconds
    async fn edit_record(
        &self,
        domain: &str,
        record_id: &str,
        hostname: &str,
        content: &str,
        ttl: u32,
    ) -> Result<ProviderResponse, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
