use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::sync::watch;
use tracing::{error, info};

use edgar_alerts::{
    AaveRatesClient, AlertPipeline, Classifier, EdgarClient, FetchConfig, GeminiClassifier,
    KeywordClassifier, PipelineConfig, ProcessedLedger, TelegramNotifier,
    EDGAR_CURRENT_FILINGS_URL,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ClassifierKind {
    /// Built-in whole-word keyword scan; no credentials required.
    Keyword,
    /// Remote Gemini classifier; requires GEMINI_API_KEY.
    Gemini,
}

#[derive(Parser)]
#[command(name = "edgar-alerts", about = "SEC EDGAR crypto filing alert service")]
struct Cli {
    /// Path of the processed-filings ledger database.
    #[arg(long, default_value = "processed_filings.db")]
    ledger_path: String,

    /// Seconds between filing polls.
    #[arg(long, default_value_t = 300)]
    poll_interval_secs: u64,

    /// Hours between stablecoin rates digests.
    #[arg(long, default_value_t = 24)]
    rates_interval_hours: i64,

    /// Content classifier implementation.
    #[arg(long, value_enum, default_value = "keyword")]
    classifier: ClassifierKind,

    /// Override the current-filings feed URL.
    #[arg(long, default_value = EDGAR_CURRENT_FILINGS_URL)]
    feed_url: String,

    /// Disable the daily rates digest.
    #[arg(long)]
    no_rates_digest: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    info!("Starting EDGAR crypto filing alert service");

    let mut fetch_config = FetchConfig::default();
    if let Ok(user_agent) = env::var("SEC_USER_AGENT") {
        fetch_config.user_agent = user_agent;
    }
    if let Ok(from_email) = env::var("SEC_FROM_EMAIL") {
        fetch_config.from_email = from_email;
    }

    // Mandatory collaborator credentials; absence is a startup failure.
    let bot_token = env::var("TELEGRAM_BOT_TOKEN")
        .context("TELEGRAM_BOT_TOKEN environment variable not set")?;
    let chat_id =
        env::var("TELEGRAM_CHAT_ID").context("TELEGRAM_CHAT_ID environment variable not set")?;

    let ledger = ProcessedLedger::open(&cli.ledger_path)
        .await
        .with_context(|| format!("failed to open ledger database at {}", cli.ledger_path))?;
    info!(
        "Ledger contains {} processed filings",
        ledger.count().await.unwrap_or(0)
    );

    let classifier: Arc<dyn Classifier> = match cli.classifier {
        ClassifierKind::Keyword => Arc::new(KeywordClassifier::new()),
        ClassifierKind::Gemini => {
            let api_key = env::var("GEMINI_API_KEY")
                .context("GEMINI_API_KEY environment variable not set")?;
            Arc::new(GeminiClassifier::new(&api_key))
        }
    };

    let feed = Arc::new(EdgarClient::new(cli.feed_url.clone(), fetch_config.clone()));
    let notifier = Arc::new(TelegramNotifier::new(&bot_token, &chat_id));

    let config = PipelineConfig {
        poll_interval: Duration::from_secs(cli.poll_interval_secs),
        rates_interval: chrono::Duration::hours(cli.rates_interval_hours),
    };

    let mut pipeline = AlertPipeline::new(feed, classifier, notifier, ledger, config);
    if !cli.no_rates_digest {
        pipeline = pipeline.with_rates_source(Arc::new(AaveRatesClient::new(&fetch_config)));
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        let _ = shutdown_tx.send(true);
    });

    pipeline.run(shutdown_rx).await;

    info!("Shut down cleanly");
    Ok(())
}
