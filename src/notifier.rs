use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::types::{AlertError, FilingAlert, Result};

/// Delivers alerts to the configured chat channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a filing alert.
    async fn send(&self, alert: &FilingAlert) -> Result<()>;

    /// Deliver a free-form informational message (the daily rates digest).
    async fn send_text(&self, text: &str) -> Result<()>;
}

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Notifier posting Markdown messages to a Telegram chat via the Bot API.
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: String,
    http: Client,
    base_url: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str) -> Self {
        Self {
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            http: Client::new(),
            base_url: TELEGRAM_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Render a filing alert as a Telegram Markdown message.
    pub fn format_message(alert: &FilingAlert) -> String {
        format!(
            "\u{1F6A8} *New Crypto Filing Alert* \u{1F6A8}\n\n\
             *Company*: {}\n\
             *Form*: {}\n\
             *Date*: {}\n\
             *Link*: [{}]({})\n\n\
             *Snippet*: {}",
            alert.company_name,
            alert.form_type,
            alert.filing_date,
            alert.link,
            alert.link,
            alert.summary
        )
    }

    async fn post_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AlertError::Notify(format!(
                "Telegram API error ({}): {}",
                status, detail
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, alert: &FilingAlert) -> Result<()> {
        self.post_message(&Self::format_message(alert)).await?;
        info!("Sent alert for {}", alert.company_name);
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.post_message(text).await
    }
}
