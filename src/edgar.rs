use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use chrono::Utc;
use feed_rs::parser;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::filings;
use crate::traits::FilingFeed;
use crate::types::{AlertError, FetchConfig, Filing, Result};

/// The EDGAR "current events" Atom feed: most recently accepted filings.
pub const EDGAR_CURRENT_FILINGS_URL: &str =
    "https://www.sec.gov/cgi-bin/browse-edgar?action=getcurrent&type=&company=&dateb=&owner=include&count=100&output=atom";

/// Client for the SEC EDGAR system: lists current filings and resolves a
/// filing's index page to the text of its primary document.
pub struct EdgarClient {
    client: Client,
    feed_url: String,
    config: FetchConfig,
}

impl EdgarClient {
    pub fn new(feed_url: String, config: FetchConfig) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&config.from_email) {
            headers.insert(HeaderName::from_static("from"), value);
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            feed_url,
            config,
        }
    }

    /// GET a page as text, retrying transient failures with exponential
    /// backoff.
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 32),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 60)),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => return Ok(body),
                            Err(e) => last_error = Some(AlertError::Http(e)),
                        }
                    } else {
                        last_error = Some(AlertError::General(format!(
                            "HTTP {}: {}",
                            status,
                            status.canonical_reason().unwrap_or("Unknown")
                        )));
                    }
                }
                Err(e) => last_error = Some(AlertError::Http(e)),
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AlertError::General("Unknown fetch error".to_string())))
    }
}

#[async_trait]
impl FilingFeed for EdgarClient {
    async fn latest_filings(&self) -> Result<Vec<Filing>> {
        debug!("Fetching current filings feed: {}", self.feed_url);
        let content = self.fetch_page(&self.feed_url).await?;

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| AlertError::Parse(format!("Failed to parse filings feed: {}", e)))?;

        let filings: Vec<Filing> = feed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let link = entry.links.first()?.href.clone();
                let title = entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| "Untitled".to_string());
                let published = entry.published.map(|dt| dt.with_timezone(&Utc));

                Some(Filing {
                    title,
                    link,
                    published,
                })
            })
            .collect();

        info!("Feed returned {} filings", filings.len());
        Ok(filings)
    }

    async fn full_filing_text(&self, link: &str) -> Result<String> {
        debug!("Resolving filing text from index page: {}", link);
        let index_page = self.fetch_page(link).await?;

        let doc_href = primary_document_href(&index_page).ok_or_else(|| {
            AlertError::Parse(format!("No primary document link found in {}", link))
        })?;
        let doc_url = Url::parse(link)?.join(&doc_href)?;

        let document = self.fetch_page(doc_url.as_str()).await?;
        Ok(filings::strip_html_tags(&document))
    }
}

static DOC_HREF_RE: OnceLock<Regex> = OnceLock::new();

/// First archived-document href on a filing index page.
fn primary_document_href(index_page: &str) -> Option<String> {
    let re = DOC_HREF_RE.get_or_init(|| {
        Regex::new(r#"href="(/Archives/[^"]+\.(?:html?|txt))""#).expect("href regex is valid")
    });

    re.captures(index_page)
        .map(|captures| captures[1].to_string())
}
