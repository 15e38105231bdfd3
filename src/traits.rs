use async_trait::async_trait;

use crate::types::{Filing, Result, StablecoinRate};

/// Capability for listing currently published filings and resolving one
/// filing's detail link to its full document text.
#[async_trait]
pub trait FilingFeed: Send + Sync {
    /// Fetch the filings the feed currently exposes, in feed order.
    async fn latest_filings(&self) -> Result<Vec<Filing>>;

    /// Resolve a filing's detail link to the plain text of its primary
    /// document.
    async fn full_filing_text(&self, link: &str) -> Result<String>;
}

/// Capability for the daily stablecoin-rates side fetch.
#[async_trait]
pub trait RatesSource: Send + Sync {
    /// Descriptive source location, included in the rates alert.
    fn source_url(&self) -> &str;

    /// Fetch current rates. An empty vector means no data was discoverable;
    /// the caller retries on a later tick.
    async fn stablecoin_rates(&self) -> Result<Vec<StablecoinRate>>;
}
