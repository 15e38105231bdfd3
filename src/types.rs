use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filings;

/// One entry from the EDGAR current-filings feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filing {
    /// Raw feed title, conventionally "<form type> - <company name>".
    pub title: String,
    /// URL of the filing's index page; source of the filing identifier.
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

/// Classifier output for one filing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub relevant: bool,
    pub summary: Option<String>,
}

impl Verdict {
    pub fn not_relevant() -> Self {
        Self {
            relevant: false,
            summary: None,
        }
    }
}

/// Everything the notifier needs to render one alert message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingAlert {
    pub company_name: String,
    pub form_type: String,
    pub filing_date: String,
    pub link: String,
    pub summary: String,
}

impl FilingAlert {
    /// Build the alert payload for a filing, truncating the summary for chat.
    pub fn from_filing(filing: &Filing, summary: &str) -> Self {
        let (form_type, company_name) = filings::parse_title(&filing.title);
        let filing_date = filing
            .published
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "N/A".to_string());

        Self {
            company_name,
            form_type,
            filing_date,
            link: filing.link.clone(),
            summary: filings::truncate_summary(summary, 200),
        }
    }
}

/// One stablecoin rate pulled by the side-alert fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StablecoinRate {
    pub symbol: String,
    pub apy: String,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// SEC requires a descriptive User-Agent on automated requests.
    pub user_agent: String,
    /// Contact address sent in the From header alongside the User-Agent.
    pub from_email: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "edgar-alerts/0.1 (admin@example.com)".to_string(),
            from_email: "admin@example.com".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            retry_delay_seconds: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AlertError>;
