// # IP Source Trait
//
// Defines the interface for resolving the caller's public address.
//
// ## Implementations
//
// - HTTP echo service: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let address = source.current().await?;
//     println!("public address: {}", address);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for IP source implementations
///
/// # Trust Level: Semi-Trusted
///
/// ## Allowed Capabilities
/// - ✅ Perform one request per call to its configured endpoint
///
/// ## Forbidden Capabilities
/// - ❌ Perform DNS updates (use `DnsProvider`)
/// - ❌ Implement retry logic (the external scheduler re-invokes the pass)
/// - ❌ Cache the address between calls
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public address
    ///
    /// The address is returned as an opaque string, exactly as the source
    /// reports it (surrounding whitespace removed). No format validation is
    /// performed.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The current address
    /// - `Err(Error::IpSource)`: Transport failure or non-success status
    async fn current(&self) -> Result<String, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
