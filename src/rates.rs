use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use tracing::debug;

use crate::traits::RatesSource;
use crate::types::{FetchConfig, Result, StablecoinRate};

const AAVE_APP_URL: &str = "https://app.aave.com/";

/// Stablecoins whose supply APY the daily digest reports.
const WATCHED_STABLECOINS: &[&str] = &["USDT", "USDC", "DAI"];

/// Scrapes stablecoin supply APY rates from the Aave app page.
pub struct AaveRatesClient {
    url: String,
    client: Client,
}

impl AaveRatesClient {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            url: AAVE_APP_URL.to_string(),
            client,
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }
}

#[async_trait]
impl RatesSource for AaveRatesClient {
    fn source_url(&self) -> &str {
        &self.url
    }

    async fn stablecoin_rates(&self) -> Result<Vec<StablecoinRate>> {
        debug!("Fetching stablecoin rates from {}", self.url);
        let page = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(extract_rates(&page))
    }
}

/// Find each watched symbol followed shortly by a percentage figure.
fn extract_rates(page: &str) -> Vec<StablecoinRate> {
    WATCHED_STABLECOINS
        .iter()
        .filter_map(|symbol| {
            let pattern = format!(r"\b{}\b\D{{0,120}}?(\d+\.\d+%)", symbol);
            let re = Regex::new(&pattern).expect("rate pattern is valid");
            re.captures(page).map(|captures| StablecoinRate {
                symbol: (*symbol).to_string(),
                apy: captures[1].to_string(),
            })
        })
        .collect()
}

/// Render the daily rates digest message. Symbols with no discoverable rate
/// show "N/A" so the digest always lists the full watched set.
pub fn format_rates_message(
    rates: &[StablecoinRate],
    source_url: &str,
    now: DateTime<Utc>,
) -> String {
    let mut lines = String::new();
    for symbol in WATCHED_STABLECOINS {
        let apy = rates
            .iter()
            .find(|rate| rate.symbol == *symbol)
            .map(|rate| rate.apy.as_str())
            .unwrap_or("N/A");
        lines.push_str(&format!("{}: {}\n", symbol, apy));
    }

    format!(
        "\u{1F4CA} *Daily Aave APY Rates* \u{1F4CA}\n\n{}\n{}\nRates as of {}",
        lines,
        source_url,
        now.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
