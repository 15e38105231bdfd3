use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filings;
use crate::types::{AlertError, Result, Verdict};

/// Decides whether a filing's text is crypto-related and produces a short
/// summary when it is.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<Verdict>;
}

/// Crypto assets, protocols, and public figures watched for in filings.
const CRYPTO_KEYWORDS: &[&str] = &[
    "crypto",
    "cryptocurrency",
    "stablecoin",
    "blockchain",
    "digital assets",
    "tokens",
    "NFT",
    "Web3",
    "DLT",
    "cryptographic",
    "DeFi",
    "DAO",
    "Bitcoin",
    "BTC",
    "Ethereum",
    "ETH",
    "Tether",
    "USDT",
    "Ripple",
    "XRP",
    "Binance",
    "BNB",
    "Solana",
    "SOL",
    "USD Coin",
    "USDC",
    "Dogecoin",
    "DOGE",
    "TRON",
    "TRX",
    "Cardano",
    "ADA",
    "Hyperliquid",
    "HYPE",
    "Polkadot",
    "DOT",
    "Avalanche",
    "AVAX",
    "SUI",
    "Stellar",
    "XLM",
    "Chainlink",
    "LINK",
    "Uniswap",
    "UNI",
    "Curve",
    "CRV",
    "Hedera",
    "HBAR",
    "Litecoin",
    "LTC",
    "Toncoin",
    "TON",
    "Shiba Inu",
    "SHIB",
    "USDe",
    "Aave",
    "Ethena",
    "ENA",
    "Bittensor",
    "TAO",
    "Satoshi Nakamoto",
    "Vitalik Buterin",
    "Michael Saylor",
    "Brian Armstrong",
    "Changpeng Zhao",
];

/// Whole-word keyword scan. Cannot fail and needs no credentials; the
/// default classifier.
pub struct KeywordClassifier {
    patterns: Vec<(String, Regex)>,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::with_keywords(CRYPTO_KEYWORDS)
    }

    pub fn with_keywords(keywords: &[&str]) -> Self {
        let patterns = keywords
            .iter()
            .map(|keyword| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
                let re = Regex::new(&pattern).expect("keyword pattern is valid");
                ((*keyword).to_string(), re)
            })
            .collect();

        Self { patterns }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify(&self, text: &str) -> Result<Verdict> {
        let mut detected: Vec<&str> = Vec::new();
        let mut snippet_lines: Vec<String> = Vec::new();

        for line in text.lines() {
            for (keyword, re) in &self.patterns {
                if re.is_match(line) {
                    if !detected.contains(&keyword.as_str()) {
                        detected.push(keyword.as_str());
                    }
                    if snippet_lines.len() < 3 {
                        let cleaned = filings::strip_html_tags(line.trim());
                        let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
                        if !cleaned.is_empty() {
                            snippet_lines.push(cleaned);
                        }
                    }
                    // One hit per line is enough; move to the next line.
                    break;
                }
            }
        }

        if detected.is_empty() {
            return Ok(Verdict::not_relevant());
        }

        debug!("Keyword classifier matched: {}", detected.join(", "));

        let summary = format!(
            "Crypto keywords detected: {}. Snippet: {}...",
            detected.join(", "),
            snippet_lines.join(" ")
        );

        Ok(Verdict {
            relevant: true,
            summary: Some(summary),
        })
    }
}

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Sentinel the model is instructed to reply with when nothing
/// crypto-related is in the filing.
const NOT_RELEVANT_SENTINEL: &str = "NOT_RELEVANT";

/// Gemini caps useful context well above this; filings past the cap are
/// overwhelmingly boilerplate anyway.
const MAX_PROMPT_CHARS: usize = 20_000;

/// Remote language-model classifier backed by the Gemini API.
pub struct GeminiClassifier {
    api_key: String,
    model: String,
    http: Client,
    base_url: String,
}

impl GeminiClassifier {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            http: Client::new(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    fn build_prompt(filing_text: &str) -> String {
        let mut cut = MAX_PROMPT_CHARS.min(filing_text.len());
        while !filing_text.is_char_boundary(cut) {
            cut -= 1;
        }

        format!(
            "Analyze the following SEC filing text for crypto-related content \
             (cryptocurrencies, stablecoins, blockchain, digital assets, DeFi, NFTs).\n\
             If such content is found, reply with a concise summary (max 100 words) \
             of the relevant sections.\n\
             If none is found, reply with exactly '{}'.\n\n\
             Filing text: {}",
            NOT_RELEVANT_SENTINEL,
            &filing_text[..cut]
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[async_trait]
impl Classifier for GeminiClassifier {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn classify(&self, text: &str) -> Result<Verdict> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::build_prompt(text),
                }],
            }],
        };

        debug!(model = %self.model, "Gemini classify request");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(AlertError::Classifier(format!(
                "Gemini API error ({}): {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        let reply = parsed
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.trim().to_string())
            .ok_or_else(|| {
                AlertError::Classifier("Gemini response contained no candidates".to_string())
            })?;

        if reply.eq_ignore_ascii_case(NOT_RELEVANT_SENTINEL) {
            return Ok(Verdict::not_relevant());
        }

        Ok(Verdict {
            relevant: true,
            summary: Some(reply),
        })
    }
}
